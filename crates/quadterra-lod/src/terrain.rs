//! The terrain controller: configuration, tree ownership, and the per-frame
//! update entry point.

use std::sync::Arc;

use glam::Vec3;
use quadterra_heightfield::{HeightFormat, HeightfieldSource, MIN_RESOLUTION};

use crate::{
    CameraState, Chunk, ChunkGeometry, CoordinateMapper, GeometryGenerator, LodSelector,
    LodThresholds, MAX_GRID_RESOLUTION, PrimitiveMode, TerrainError, TerrainTransform, UvRect,
};

/// Counters describing one `update()` pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Chunks evaluated.
    pub visited: usize,
    /// Leaves split into four children.
    pub splits: usize,
    /// Subtrees collapsed into a leaf.
    pub merges: usize,
    /// Chunks destroyed by merges.
    pub removed: usize,
    /// Chunks rejected by the frustum test.
    pub culled: usize,
    /// Leaf geometry batches built.
    pub generated: usize,
    /// Leaves handed to rendering after the pass.
    pub visible: usize,
}

impl UpdateStats {
    /// True if the pass split or merged anything.
    pub fn is_structural_change(&self) -> bool {
        self.splits + self.merges > 0
    }
}

/// A leaf chunk ready for rendering.
#[derive(Clone, Debug)]
pub struct VisibleChunk {
    /// UV bounds.
    pub bounds: UvRect,
    /// Depth in the tree.
    pub depth: u32,
    /// Primitive mode of the geometry.
    pub mode: PrimitiveMode,
    /// Projected triangle width measured this pass.
    pub triangle_width: f32,
    /// Shared geometry batch.
    pub geometry: Arc<ChunkGeometry>,
}

/// State produced by a successful `generate()`.
#[derive(Debug)]
struct BuiltTerrain {
    root: Chunk,
    mapper: CoordinateMapper,
    chunk_size: u32,
    max_depth: u32,
    thresholds: LodThresholds,
    grid_resolution: u32,
}

/// Heightmap terrain with a view-dependent quadtree LOD.
///
/// Configuration is staged through setters and validated by [`generate`],
/// which (re)builds the tree as a single root leaf. Each frame, [`update`]
/// refines or coarsens the tree for the given camera and rebuilds the visible
/// leaf set returned by [`visible_chunks`].
///
/// [`generate`]: Terrain::generate
/// [`update`]: Terrain::update
/// [`visible_chunks`]: Terrain::visible_chunks
pub struct Terrain {
    heightfield: Option<Arc<dyn HeightfieldSource>>,
    chunk_size: u32,
    target_triangle_width: f32,
    merge_ratio: f32,
    grid_resolution: u32,
    generate_patches: bool,
    update_enabled: bool,
    transform: TerrainTransform,
    built: Option<BuiltTerrain>,
    visible: Vec<VisibleChunk>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self {
            heightfield: None,
            chunk_size: 32,
            target_triangle_width: 10.0,
            merge_ratio: LodThresholds::DEFAULT_MERGE_RATIO,
            grid_resolution: 8,
            generate_patches: false,
            update_enabled: true,
            transform: TerrainTransform::default(),
            built: None,
            visible: Vec::new(),
        }
    }
}

impl std::fmt::Debug for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terrain")
            .field("has_heightfield", &self.heightfield.is_some())
            .field("chunk_size", &self.chunk_size)
            .field("target_triangle_width", &self.target_triangle_width)
            .field("merge_ratio", &self.merge_ratio)
            .field("generate_patches", &self.generate_patches)
            .field("update_enabled", &self.update_enabled)
            .field("generated", &self.built.is_some())
            .field("visible", &self.visible.len())
            .finish()
    }
}

impl Terrain {
    /// Create an unconfigured terrain with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_heightfield(&mut self, heightfield: Arc<dyn HeightfieldSource>) {
        self.heightfield = Some(heightfield);
    }

    pub fn heightfield(&self) -> Option<&Arc<dyn HeightfieldSource>> {
        self.heightfield.as_ref()
    }

    /// Texel size of a finest-level chunk. Validated by `generate()`.
    pub fn set_chunk_size(&mut self, chunk_size: u32) {
        self.chunk_size = chunk_size;
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Desired on-screen triangle edge length in pixels.
    pub fn set_target_triangle_width(&mut self, width: f32) {
        self.target_triangle_width = width;
    }

    pub fn target_triangle_width(&self) -> f32 {
        self.target_triangle_width
    }

    /// Merge threshold as a fraction of the target width, in (0, 1).
    pub fn set_merge_ratio(&mut self, ratio: f32) {
        self.merge_ratio = ratio;
    }

    pub fn merge_ratio(&self) -> f32 {
        self.merge_ratio
    }

    /// Cells per edge of triangle-mode leaf geometry.
    pub fn set_grid_resolution(&mut self, resolution: u32) {
        self.grid_resolution = resolution;
    }

    pub fn grid_resolution(&self) -> u32 {
        self.grid_resolution
    }

    /// Emit one tessellation patch per leaf instead of a triangle grid.
    pub fn set_generate_patches(&mut self, enabled: bool) {
        self.generate_patches = enabled;
    }

    pub fn generate_patches(&self) -> bool {
        self.generate_patches
    }

    /// When disabled, `update()` leaves the tree and visible set untouched.
    pub fn set_update_enabled(&mut self, enabled: bool) {
        self.update_enabled = enabled;
    }

    pub fn update_enabled(&self) -> bool {
        self.update_enabled
    }

    pub fn set_transform(&mut self, transform: TerrainTransform) {
        self.transform = transform;
    }

    pub fn transform(&self) -> &TerrainTransform {
        &self.transform
    }

    /// Root of the generated tree.
    pub fn root(&self) -> Option<&Chunk> {
        self.built.as_ref().map(|built| &built.root)
    }

    #[cfg(test)]
    pub(crate) fn root_mut(&mut self) -> Option<&mut Chunk> {
        self.built.as_mut().map(|built| &mut built.root)
    }

    /// Maximum split depth of the generated tree.
    pub fn max_depth(&self) -> Option<u32> {
        self.built.as_ref().map(|built| built.max_depth)
    }

    /// Leaves produced by the last completed `update()`.
    pub fn visible_chunks(&self) -> &[VisibleChunk] {
        &self.visible
    }

    /// Validate the configuration and rebuild the tree as a single root leaf.
    ///
    /// On error the previous tree, if any, is kept unchanged. The new root has
    /// no geometry until the first `update()`.
    pub fn generate(&mut self) -> Result<(), TerrainError> {
        let built = self.build().inspect_err(|err| {
            tracing::warn!(error = %err, "Terrain configuration rejected");
        })?;

        tracing::info!(
            chunk_size = built.chunk_size,
            max_depth = built.max_depth,
            target_triangle_width = self.target_triangle_width,
            patches = self.generate_patches,
            "Generated terrain"
        );
        self.built = Some(built);
        self.visible.clear();
        Ok(())
    }

    fn build(&self) -> Result<BuiltTerrain, TerrainError> {
        let heightfield = self
            .heightfield
            .clone()
            .ok_or(TerrainError::MissingHeightfield)?;

        let format = heightfield.format();
        if format != HeightFormat::R16 {
            return Err(TerrainError::UnsupportedHeightFormat {
                channels: format.channels,
                bit_depth: format.bit_depth,
            });
        }

        let (width, height) = (heightfield.width(), heightfield.height());
        if !width.is_power_of_two() || !height.is_power_of_two() {
            return Err(TerrainError::HeightfieldNotPowerOfTwo { width, height });
        }
        if width < MIN_RESOLUTION || height < MIN_RESOLUTION {
            return Err(TerrainError::HeightfieldTooSmall {
                width,
                height,
                min: MIN_RESOLUTION,
            });
        }

        let resolution = width.min(height);
        if !self.chunk_size.is_power_of_two() {
            return Err(TerrainError::ChunkSizeNotPowerOfTwo(self.chunk_size));
        }
        if self.chunk_size > resolution {
            return Err(TerrainError::ChunkSizeExceedsHeightfield {
                chunk_size: self.chunk_size,
                resolution,
            });
        }

        let thresholds = LodThresholds::new(self.target_triangle_width, self.merge_ratio)?;
        if !(1..=MAX_GRID_RESOLUTION).contains(&self.grid_resolution) {
            return Err(TerrainError::InvalidGridResolution(self.grid_resolution));
        }
        self.transform.validate()?;

        Ok(BuiltTerrain {
            root: Chunk::root(),
            mapper: CoordinateMapper::new(heightfield, self.transform),
            chunk_size: self.chunk_size,
            max_depth: (resolution / self.chunk_size).ilog2(),
            thresholds,
            grid_resolution: self.grid_resolution,
        })
    }

    /// Run one LOD pass for `camera`.
    ///
    /// No-op when updates are disabled or the terrain has not been generated.
    /// Threshold, grid and patch settings changed since `generate()` apply
    /// here; invalid ones fall back to the values validated by `generate()`.
    pub fn update(&mut self, camera: &CameraState) -> UpdateStats {
        if !self.update_enabled {
            return UpdateStats::default();
        }
        let Some(built) = self.built.as_mut() else {
            tracing::debug!("Terrain update skipped: not generated");
            return UpdateStats::default();
        };

        let thresholds = LodThresholds::new(self.target_triangle_width, self.merge_ratio)
            .unwrap_or(built.thresholds);
        let grid_resolution = if (1..=MAX_GRID_RESOLUTION).contains(&self.grid_resolution) {
            self.grid_resolution
        } else {
            built.grid_resolution
        };
        let mode = if self.generate_patches {
            PrimitiveMode::Patch
        } else {
            PrimitiveMode::Triangles
        };

        let selector = LodSelector::new(
            &built.mapper,
            GeometryGenerator::new(mode, grid_resolution),
            thresholds,
            built.max_depth,
            built.chunk_size,
            camera,
        );
        let mut stats = selector.run(&mut built.root);

        // Publish the new visible set only once the pass has completed.
        let mut visible = Vec::with_capacity(self.visible.len());
        collect_visible(&built.root, &mut visible);
        stats.visible = visible.len();
        self.visible = visible;

        tracing::debug!(
            visited = stats.visited,
            splits = stats.splits,
            merges = stats.merges,
            culled = stats.culled,
            generated = stats.generated,
            visible = stats.visible,
            "Terrain LOD pass"
        );
        stats
    }

    /// World position at `(u, v)`, clamped to `[0, 1]²`.
    ///
    /// Uses the heightfield and transform captured by the last successful
    /// `generate()`, or the current settings before that. `None` without a
    /// heightfield.
    pub fn uv_to_world(&self, u: f32, v: f32) -> Option<Vec3> {
        match &self.built {
            Some(built) => Some(built.mapper.uv_to_world(u, v)),
            None => self
                .heightfield
                .as_ref()
                .map(|hf| CoordinateMapper::new(Arc::clone(hf), self.transform).uv_to_world(u, v)),
        }
    }

    /// World height at `(u, v)`; see [`Terrain::uv_to_world`].
    pub fn height_at(&self, u: f32, v: f32) -> Option<f32> {
        self.uv_to_world(u, v).map(|p| p.z)
    }
}

fn collect_visible(chunk: &Chunk, out: &mut Vec<VisibleChunk>) {
    if !chunk.is_visible() {
        return;
    }
    match chunk.children() {
        Some(children) => {
            for child in children.iter() {
                collect_visible(child, out);
            }
        }
        None => {
            if let Some(geometry) = chunk.geometry() {
                out.push(VisibleChunk {
                    bounds: chunk.bounds(),
                    depth: chunk.depth(),
                    mode: geometry.mode,
                    triangle_width: chunk.last_triangle_width(),
                    geometry: Arc::clone(geometry),
                });
            }
        }
    }
}
