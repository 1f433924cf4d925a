//! Scripted camera flight over the terrain.

use glam::{Vec2, Vec3};
use quadterra_config::CameraConfig;
use quadterra_lod::{CameraState, CoordinateMapper};

/// UV distance the camera looks ahead of its position.
const LOOK_AHEAD: f32 = 0.05;

/// A straight low-altitude pass across the terrain, followed by hovering at
/// the end point.
#[derive(Clone, Debug)]
pub struct Flight {
    start: Vec2,
    end: Vec2,
    frames: u32,
    camera: CameraConfig,
}

impl Flight {
    pub fn new(start: Vec2, end: Vec2, frames: u32, camera: CameraConfig) -> Self {
        Self {
            start,
            end,
            frames,
            camera,
        }
    }

    /// The default diagonal pass.
    pub fn diagonal(frames: u32, camera: CameraConfig) -> Self {
        Self::new(Vec2::new(0.1, 0.15), Vec2::new(0.85, 0.8), frames, camera)
    }

    /// Camera UV at `frame`; holds the end point once the flight is over.
    pub fn uv_at(&self, frame: u32) -> Vec2 {
        let t = if self.frames == 0 {
            1.0
        } else {
            (frame as f32 / self.frames as f32).min(1.0)
        };
        self.start.lerp(self.end, t)
    }

    /// Camera state at `frame`, flying `altitude` above the local surface and
    /// looking slightly down along the flight direction.
    pub fn camera_at(&self, frame: u32, mapper: &CoordinateMapper) -> CameraState {
        let uv = self.uv_at(frame);
        let direction = (self.end - self.start).normalize_or_zero();
        let ahead = (uv + direction * LOOK_AHEAD).clamp(Vec2::ZERO, Vec2::ONE);

        let ground = mapper.uv_to_world(uv.x, uv.y);
        let eye = ground + Vec3::Z * self.camera.altitude;
        let mut target = mapper.uv_to_world(ahead.x, ahead.y);
        if (target - eye).truncate().length_squared() < 1e-6 {
            // No horizontal heading: look ahead along +X instead of straight down.
            target = eye + Vec3::new(1.0, 0.0, -0.25);
        }

        CameraState::look_at(
            eye,
            target,
            Vec3::Z,
            self.camera.fov_y_degrees.to_radians(),
            self.camera.aspect_ratio(),
            self.camera.viewport_height as f32,
            self.camera.near,
            self.camera.far,
        )
    }
}
