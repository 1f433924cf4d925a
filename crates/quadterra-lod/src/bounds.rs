//! UV-space chunk bounds and quadrant subdivision.

use glam::Vec2;

/// Child position inside a parent chunk.
///
/// `u` grows east and `v` grows south, so `NorthWest` holds the parent's origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// All quadrants in traversal order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Offset of this quadrant's origin in units of the child size.
    fn offset(self) -> Vec2 {
        match self {
            Quadrant::NorthWest => Vec2::new(0.0, 0.0),
            Quadrant::NorthEast => Vec2::new(1.0, 0.0),
            Quadrant::SouthWest => Vec2::new(0.0, 1.0),
            Quadrant::SouthEast => Vec2::new(1.0, 1.0),
        }
    }
}

/// An axis-aligned square in UV space.
///
/// Sizes are always `2^-depth`, which is exact in binary floating point, so
/// children tile their parent with no gap or overlap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    /// Minimum corner (north-west).
    pub origin: Vec2,
    /// Edge length.
    pub size: f32,
}

impl UvRect {
    /// The full `[0, 1]²` domain.
    pub const UNIT: Self = Self {
        origin: Vec2::ZERO,
        size: 1.0,
    };

    /// Create a square from its origin and edge length.
    pub fn new(origin: Vec2, size: f32) -> Self {
        Self { origin, size }
    }

    /// Maximum corner (south-east).
    pub fn max(&self) -> Vec2 {
        self.origin + Vec2::splat(self.size)
    }

    /// Centre point.
    pub fn center(&self) -> Vec2 {
        self.origin + Vec2::splat(self.size * 0.5)
    }

    /// Area in UV units.
    pub fn area(&self) -> f32 {
        self.size * self.size
    }

    /// Corners in `[NW, NE, SE, SW]` order.
    pub fn corners(&self) -> [Vec2; 4] {
        let max = self.max();
        [
            self.origin,
            Vec2::new(max.x, self.origin.y),
            max,
            Vec2::new(self.origin.x, max.y),
        ]
    }

    /// Bounds of one quadrant.
    pub fn quadrant(&self, quadrant: Quadrant) -> UvRect {
        let half = self.size * 0.5;
        UvRect::new(self.origin + quadrant.offset() * half, half)
    }

    /// All four quadrants in traversal order.
    pub fn quadrants(&self) -> [UvRect; 4] {
        Quadrant::ALL.map(|q| self.quadrant(q))
    }

    /// Half-open containment: the south and east edges belong to the neighbour,
    /// except on the domain boundary.
    pub fn contains(&self, uv: Vec2) -> bool {
        let max = self.max();
        let in_u = uv.x >= self.origin.x && (uv.x < max.x || (max.x >= 1.0 && uv.x <= max.x));
        let in_v = uv.y >= self.origin.y && (uv.y < max.y || (max.y >= 1.0 && uv.y <= max.y));
        in_u && in_v
    }

    /// True if the interiors of the two squares overlap.
    pub fn overlaps(&self, other: &UvRect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.origin.x < b_max.x
            && other.origin.x < a_max.x
            && self.origin.y < b_max.y
            && other.origin.y < a_max.y
    }

    /// Quadrant of this square that contains `uv` (south/east on the midlines).
    pub fn quadrant_of(&self, uv: Vec2) -> Quadrant {
        let mid = self.center();
        match (uv.x >= mid.x, uv.y >= mid.y) {
            (false, false) => Quadrant::NorthWest,
            (true, false) => Quadrant::NorthEast,
            (false, true) => Quadrant::SouthWest,
            (true, true) => Quadrant::SouthEast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrants_tile_parent() {
        let parent = UvRect::new(Vec2::new(0.25, 0.5), 0.25);
        let children = parent.quadrants();

        let area: f32 = children.iter().map(UvRect::area).sum();
        assert_eq!(area, parent.area());

        for (i, a) in children.iter().enumerate() {
            for b in &children[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
        assert_eq!(children[0].origin, parent.origin);
        assert_eq!(children[3].max(), parent.max());
    }

    #[test]
    fn test_quadrant_order_is_nw_ne_sw_se() {
        let children = UvRect::UNIT.quadrants();
        assert_eq!(children[0].origin, Vec2::new(0.0, 0.0));
        assert_eq!(children[1].origin, Vec2::new(0.5, 0.0));
        assert_eq!(children[2].origin, Vec2::new(0.0, 0.5));
        assert_eq!(children[3].origin, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_quadrant_of_matches_quadrant_bounds() {
        let rect = UvRect::UNIT;
        for q in Quadrant::ALL {
            let center = rect.quadrant(q).center();
            assert_eq!(rect.quadrant_of(center), q);
        }
    }

    #[test]
    fn test_contains_is_half_open_inside_domain() {
        let nw = UvRect::UNIT.quadrant(Quadrant::NorthWest);
        let ne = UvRect::UNIT.quadrant(Quadrant::NorthEast);
        let edge = Vec2::new(0.5, 0.25);
        assert!(!nw.contains(edge));
        assert!(ne.contains(edge));
        // The domain boundary is closed.
        assert!(ne.contains(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_corners_order() {
        let c = UvRect::UNIT.corners();
        assert_eq!(c, [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);
    }
}
