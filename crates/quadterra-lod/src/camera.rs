//! Camera state consumed by the LOD pass, and frustum culling against
//! view-projection planes.

use glam::{Mat4, Vec3, Vec4};

/// Plane indices into the frustum planes array.
const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// An axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all points. `points` must not be empty.
    pub fn from_points(points: &[Vec3]) -> Self {
        let first = points.first().copied().unwrap_or(Vec3::ZERO);
        points.iter().fold(Self::new(first, first), |acc, &p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }

    /// Returns the center point of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half-extents (half-size along each axis).
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Euclidean distance from `p` to the closest point of the box (0 inside).
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        p.clamp(self.min, self.max).distance(p)
    }
}

/// A view frustum defined by six inward-pointing planes extracted from
/// a reverse-Z view-projection matrix.
#[derive(Clone, Debug)]
pub struct Frustum {
    /// Six planes: left, right, bottom, top, near, far.
    /// Each `Vec4(a, b, c, d)` where `(a,b,c)` is the normalized inward
    /// normal and `d` is the signed distance term.
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes using the Gribb-Hartmann method.
    ///
    /// Expects reverse-Z depth (near maps to z=1, far to z=0), as produced
    /// by [`CameraState::look_at`].
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[LEFT] = rows[3] + rows[0];
        planes[RIGHT] = rows[3] - rows[0];
        planes[BOTTOM] = rows[3] + rows[1];
        planes[TOP] = rows[3] - rows[1];
        // Reverse-Z: z <= w bounds the near side, z >= 0 the far side.
        planes[NEAR] = rows[3] - rows[2];
        planes[FAR] = rows[2];

        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Test whether an AABB is at least partially inside the frustum.
    ///
    /// Uses the p-vertex method: for each plane, take the corner furthest
    /// along the plane normal. If that corner is behind the plane, the whole
    /// box is outside. Conservative near frustum corners.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let p = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            normal.dot(p) + plane.w >= 0.0
        })
    }

    /// Test whether a point is inside all six planes.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(p) + plane.w >= 0.0)
    }
}

/// Everything the LOD pass needs to know about the viewer.
#[derive(Clone, Debug)]
pub struct CameraState {
    /// Eye position in world space.
    pub position: Vec3,
    /// Combined view-projection matrix (reverse-Z).
    pub view_projection: Mat4,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Height of the render target in pixels.
    pub viewport_height: f32,
    /// Near clip distance; also the minimum distance used for LOD.
    pub near: f32,
}

impl CameraState {
    /// Build a perspective camera looking from `eye` toward `target`.
    #[allow(clippy::too_many_arguments)]
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect_ratio: f32,
        viewport_height: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let view = Mat4::look_at_rh(eye, target, up);
        // Reverse-Z: far as "near" parameter, near as "far" parameter.
        let projection = Mat4::perspective_rh(fov_y, aspect_ratio, far, near);
        Self {
            position: eye,
            view_projection: projection * view,
            fov_y,
            viewport_height,
            near,
        }
    }

    /// Pixels covered by one world unit at distance 1 along the view axis.
    pub fn projection_scale(&self) -> f32 {
        self.viewport_height / (2.0 * (self.fov_y * 0.5).tan())
    }

    /// Frustum for this camera.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> CameraState {
        // Looking down -Y with Z up.
        CameraState::look_at(
            Vec3::ZERO,
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::Z,
            FRAC_PI_2,
            16.0 / 9.0,
            720.0,
            0.1,
            1000.0,
        )
    }

    #[test]
    fn test_box_in_front_visible() {
        let f = camera().frustum();
        let aabb = Aabb::new(Vec3::new(-1.0, -6.0, -1.0), Vec3::new(1.0, -4.0, 1.0));
        assert!(f.intersects_aabb(&aabb));
    }

    #[test]
    fn test_box_behind_camera_culled() {
        let f = camera().frustum();
        let aabb = Aabb::new(Vec3::new(-1.0, 4.0, -1.0), Vec3::new(1.0, 6.0, 1.0));
        assert!(!f.intersects_aabb(&aabb));
    }

    #[test]
    fn test_box_beyond_far_plane_culled() {
        let f = camera().frustum();
        let aabb = Aabb::new(Vec3::new(-1.0, -2000.0, -1.0), Vec3::new(1.0, -1500.0, 1.0));
        assert!(!f.intersects_aabb(&aabb));
    }

    #[test]
    fn test_box_far_to_the_side_culled() {
        let f = camera().frustum();
        let left = Aabb::new(Vec3::new(-1000.0, -6.0, 0.0), Vec3::new(-999.0, -4.0, 1.0));
        let above = Aabb::new(Vec3::new(0.0, -6.0, 999.0), Vec3::new(1.0, -4.0, 1000.0));
        assert!(!f.intersects_aabb(&left));
        assert!(!f.intersects_aabb(&above));
    }

    #[test]
    fn test_straddling_box_visible() {
        let f = camera().frustum();
        let aabb = Aabb::new(Vec3::new(-100.0, -10.0, -1.0), Vec3::new(100.0, 10.0, 1.0));
        assert!(f.intersects_aabb(&aabb));
    }

    #[test]
    fn test_contains_point() {
        let f = camera().frustum();
        assert!(f.contains_point(Vec3::new(0.0, -10.0, 0.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 10.0, 0.0)));
    }

    #[test]
    fn test_projection_scale_for_90_degree_fov() {
        // tan(45°) = 1, so one unit at distance one spans half the viewport.
        assert!((camera().projection_scale() - 360.0).abs() < 1e-3);
    }

    #[test]
    fn test_aabb_distance() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        assert_eq!(aabb.distance_to_point(Vec3::splat(5.0)), 0.0);
        assert!((aabb.distance_to_point(Vec3::new(13.0, 14.0, 5.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(&[Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 4.0, 0.0)]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 3.0));
        assert_eq!(aabb.center(), Vec3::new(0.0, 1.0, 1.5));
    }
}
