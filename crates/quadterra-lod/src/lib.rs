//! View-dependent quadtree level-of-detail for heightmap terrain.
//!
//! A [`Terrain`] owns a quadtree of [`Chunk`]s spanning the unit UV square.
//! Every frame, [`Terrain::update`] walks the tree top-down and splits leaves
//! whose projected triangle width exceeds the target, merges subtrees that
//! have fallen below `target * merge_ratio`, and culls chunks outside the view
//! frustum. Leaf geometry is a fixed-topology patch or triangle grid in UV
//! space: the heightfield is never resampled to build it.

mod bounds;
mod camera;
mod chunk;
mod error;
mod geometry;
mod mapper;
mod selector;
mod shared;
mod terrain;


pub use bounds::{Quadrant, UvRect};
pub use camera::{Aabb, CameraState, Frustum};
pub use chunk::{Chunk, ChunkState};
pub use error::TerrainError;
pub use geometry::{
    ChunkGeometry, GeometryGenerator, MAX_GRID_RESOLUTION, MAX_PATCH_TESSELLATION, PrimitiveMode,
    TerrainVertex, Topology,
};
pub use mapper::{ChunkFootprint, CoordinateMapper, TerrainTransform};
pub use selector::{LodAction, LodSelector, LodThresholds, triangle_width};
pub use shared::SharedTerrain;
pub use terrain::{Terrain, UpdateStats, VisibleChunk};
