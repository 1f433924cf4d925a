//! Screen-space LOD selection: split/merge thresholds with hysteresis and the
//! per-frame top-down pass over the chunk tree.

use std::sync::Arc;

use glam::Vec3;

use crate::{
    CameraState, Chunk, ChunkFootprint, CoordinateMapper, Frustum, GeometryGenerator,
    TerrainError, UpdateStats, UvRect,
};

/// Result of evaluating a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LodAction {
    /// Keep the chunk as-is.
    Keep,
    /// Split the leaf into four children (increase detail).
    Split,
    /// Collapse the subtree into a single leaf (decrease detail).
    Merge,
}

/// Split and merge thresholds on projected triangle width, in pixels.
///
/// Leaves split above `target`; subtrees merge below `target * merge_ratio`.
/// Widths inside the band between the two leave the tree untouched, which
/// keeps chunks near the boundary from splitting and merging every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodThresholds {
    target: f32,
    merge_ratio: f32,
}

impl LodThresholds {
    /// Default ratio between the merge and split thresholds.
    pub const DEFAULT_MERGE_RATIO: f32 = 0.5;

    /// Create thresholds, validating both parameters.
    pub fn new(target: f32, merge_ratio: f32) -> Result<Self, TerrainError> {
        if !(target.is_finite() && target > 0.0) {
            return Err(TerrainError::InvalidTargetTriangleWidth(target));
        }
        if !(merge_ratio > 0.0 && merge_ratio < 1.0) {
            return Err(TerrainError::InvalidMergeRatio(merge_ratio));
        }
        Ok(Self {
            target,
            merge_ratio,
        })
    }

    /// Target triangle width in pixels.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Ratio between the merge and split thresholds.
    pub fn merge_ratio(&self) -> f32 {
        self.merge_ratio
    }

    /// Leaves wider than this split.
    pub fn split_above(&self) -> f32 {
        self.target
    }

    /// Internal chunks narrower than this merge.
    pub fn merge_below(&self) -> f32 {
        self.target * self.merge_ratio
    }

    /// Decide what to do with a chunk whose own triangle width is `width`.
    ///
    /// For an internal chunk, `width` is what every descendant leaf would
    /// project to after merging into this chunk.
    pub fn decide(&self, is_leaf: bool, can_split: bool, width: f32) -> LodAction {
        if is_leaf {
            if can_split && width > self.split_above() {
                LodAction::Split
            } else {
                LodAction::Keep
            }
        } else if width < self.merge_below() {
            LodAction::Merge
        } else {
            LodAction::Keep
        }
    }
}

/// On-screen width in pixels of a triangle edge of `edge_world` world units
/// seen from `distance`, given the camera's pixels-per-unit at distance one.
pub fn triangle_width(edge_world: f32, distance: f32, projection_scale: f32) -> f32 {
    edge_world / distance * projection_scale
}

/// One LOD pass over a chunk tree for a fixed camera.
pub struct LodSelector<'a> {
    mapper: &'a CoordinateMapper,
    generator: GeometryGenerator,
    thresholds: LodThresholds,
    max_depth: u32,
    segments: u32,
    frustum: Frustum,
    eye: Vec3,
    near: f32,
    projection_scale: f32,
}

impl<'a> LodSelector<'a> {
    /// Prepare a pass.
    ///
    /// `chunk_size` is the finest-chunk texel size; together with the
    /// generator it determines how many segments a chunk edge renders with.
    pub fn new(
        mapper: &'a CoordinateMapper,
        generator: GeometryGenerator,
        thresholds: LodThresholds,
        max_depth: u32,
        chunk_size: u32,
        camera: &CameraState,
    ) -> Self {
        Self {
            mapper,
            generator,
            thresholds,
            max_depth,
            segments: generator.rendered_segments(chunk_size).max(1),
            frustum: camera.frustum(),
            eye: camera.position,
            near: camera.near.max(f32::EPSILON),
            projection_scale: camera.projection_scale(),
        }
    }

    /// Projected triangle width of a chunk footprint.
    pub fn footprint_width(&self, footprint: &ChunkFootprint) -> f32 {
        let distance = footprint.sampled.distance_to_point(self.eye).max(self.near);
        let edge = footprint.world_edge() / self.segments as f32;
        triangle_width(edge, distance, self.projection_scale)
    }

    /// Projected triangle width of a chunk, or `None` if it is outside the frustum.
    pub fn measure(&self, bounds: &UvRect) -> Option<f32> {
        let footprint = self.mapper.footprint(bounds);
        self.frustum
            .intersects_aabb(&footprint.cull)
            .then(|| self.footprint_width(&footprint))
    }

    /// Run the pass over `root`, mutating structure and geometry.
    pub fn run(&self, root: &mut Chunk) -> UpdateStats {
        let mut stats = UpdateStats::default();
        self.evaluate(root, &mut stats);
        stats
    }

    fn evaluate(&self, chunk: &mut Chunk, stats: &mut UpdateStats) {
        stats.visited += 1;

        let Some(width) = self.measure(&chunk.bounds()) else {
            // Culled subtrees are skipped as they are; only leaves release geometry.
            chunk.set_visible(false);
            chunk.clear_geometry();
            stats.culled += 1;
            return;
        };
        chunk.set_visible(true);
        chunk.set_last_triangle_width(width);

        let can_split = chunk.depth() < self.max_depth;
        match self.thresholds.decide(chunk.is_leaf(), can_split, width) {
            LodAction::Split => {
                chunk.split();
                stats.splits += 1;
                self.evaluate_children(chunk, stats);
            }
            LodAction::Merge => {
                stats.removed += chunk.merge();
                stats.merges += 1;
                self.ensure_geometry(chunk, stats);
            }
            LodAction::Keep if chunk.is_leaf() => self.ensure_geometry(chunk, stats),
            LodAction::Keep => self.evaluate_children(chunk, stats),
        }
    }

    fn evaluate_children(&self, chunk: &mut Chunk, stats: &mut UpdateStats) {
        if let Some(children) = chunk.children_mut() {
            for child in children.iter_mut() {
                self.evaluate(child, stats);
            }
        }
    }

    fn ensure_geometry(&self, chunk: &mut Chunk, stats: &mut UpdateStats) {
        let current = chunk
            .geometry()
            .is_some_and(|geometry| self.generator.matches(geometry));
        if !current {
            let geometry = self.generator.generate(chunk.bounds(), chunk.depth());
            chunk.set_geometry(Arc::new(geometry));
            stats.generated += 1;
        }
    }
}
