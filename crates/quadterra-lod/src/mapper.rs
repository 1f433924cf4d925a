//! UV to world-space mapping over a heightfield.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use quadterra_heightfield::HeightfieldSource;

use crate::{Aabb, TerrainError, UvRect};

/// Placement of the terrain in world space (Z up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainTransform {
    /// World position of UV `(0, 0)` at height zero.
    pub origin: Vec3,
    /// Horizontal world extent covered by the UV square.
    pub size: Vec2,
    /// World height of a normalized sample of 1.0.
    pub height_scale: f32,
    /// Constant added to every height.
    pub height_offset: f32,
}

impl Default for TerrainTransform {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            size: Vec2::splat(1024.0),
            height_scale: 256.0,
            height_offset: 0.0,
        }
    }
}

impl TerrainTransform {
    pub(crate) fn validate(&self) -> Result<(), TerrainError> {
        let finite = self.origin.is_finite()
            && self.size.is_finite()
            && self.height_scale.is_finite()
            && self.height_offset.is_finite();
        if !finite || self.size.x <= 0.0 || self.size.y <= 0.0 {
            return Err(TerrainError::InvalidTerrainSize);
        }
        Ok(())
    }

    /// Lowest and highest world Z any sample can map to.
    pub fn height_range(&self) -> (f32, f32) {
        let base = self.origin.z + self.height_offset;
        let top = base + self.height_scale;
        (base.min(top), base.max(top))
    }
}

/// World-space evaluation of a chunk at its corners and centre.
#[derive(Clone, Copy, Debug)]
pub struct ChunkFootprint {
    /// Corners in `[NW, NE, SE, SW]` order followed by the centre.
    pub samples: [Vec3; 5],
    /// Bounding box of the five samples.
    pub sampled: Aabb,
    /// Conservative volume for culling: the chunk's horizontal extent over
    /// the full height range of the terrain.
    pub cull: Aabb,
}

impl ChunkFootprint {
    /// Largest horizontal edge of the chunk in world units.
    pub fn world_edge(&self) -> f32 {
        let extent = self.cull.max - self.cull.min;
        extent.x.max(extent.y)
    }
}

/// Converts UV coordinates into world positions using a heightfield.
///
/// UVs outside `[0, 1]` are clamped.
#[derive(Clone)]
pub struct CoordinateMapper {
    heightfield: Arc<dyn HeightfieldSource>,
    transform: TerrainTransform,
}

impl std::fmt::Debug for CoordinateMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinateMapper")
            .field("width", &self.heightfield.width())
            .field("height", &self.heightfield.height())
            .field("transform", &self.transform)
            .finish()
    }
}

impl CoordinateMapper {
    /// Create a mapper over the given heightfield.
    pub fn new(heightfield: Arc<dyn HeightfieldSource>, transform: TerrainTransform) -> Self {
        Self {
            heightfield,
            transform,
        }
    }

    /// The heightfield being sampled.
    pub fn heightfield(&self) -> &Arc<dyn HeightfieldSource> {
        &self.heightfield
    }

    /// The world placement.
    pub fn transform(&self) -> &TerrainTransform {
        &self.transform
    }

    /// World Z at `(u, v)`.
    pub fn height_at(&self, u: f32, v: f32) -> f32 {
        let h = self.heightfield.sample(u.clamp(0.0, 1.0), v.clamp(0.0, 1.0));
        self.transform.origin.z + h * self.transform.height_scale + self.transform.height_offset
    }

    /// World position at `(u, v)`.
    pub fn uv_to_world(&self, u: f32, v: f32) -> Vec3 {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let t = &self.transform;
        Vec3::new(
            t.origin.x + u * t.size.x,
            t.origin.y + v * t.size.y,
            self.height_at(u, v),
        )
    }

    /// Evaluate a chunk at its four corners and centre.
    ///
    /// Costs five samples regardless of chunk depth or heightfield size.
    pub fn footprint(&self, bounds: &UvRect) -> ChunkFootprint {
        let [nw, ne, se, sw] = bounds.corners();
        let center = bounds.center();
        let samples = [nw, ne, se, sw, center].map(|uv| self.uv_to_world(uv.x, uv.y));
        let sampled = Aabb::from_points(&samples);

        let (low, high) = self.transform.height_range();
        let cull = Aabb::new(
            Vec3::new(sampled.min.x, sampled.min.y, low.min(sampled.min.z)),
            Vec3::new(sampled.max.x, sampled.max.y, high.max(sampled.max.z)),
        );

        ChunkFootprint {
            samples,
            sampled,
            cull,
        }
    }
}
