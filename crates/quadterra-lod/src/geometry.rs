//! Fixed-topology leaf geometry in UV space.
//!
//! Vertices carry terrain UV and chunk-local coordinates only. Height
//! displacement happens in the rendering stage, so building a chunk costs
//! the same at every depth and for every heightfield size.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

use crate::UvRect;

/// Largest accepted triangle grid resolution per chunk edge.
pub const MAX_GRID_RESOLUTION: u32 = 64;

/// Tessellation level cap applied to patch primitives.
pub const MAX_PATCH_TESSELLATION: u32 = 64;

/// A single terrain vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    /// Position in terrain UV space, `[0, 1]²`.
    pub uv: [f32; 2],
    /// Position inside the chunk, `[0, 1]²`.
    pub local: [f32; 2],
}

const_assert_eq!(std::mem::size_of::<TerrainVertex>(), 16);

/// Which primitive a leaf is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    /// One four-point patch per chunk for a tessellation stage.
    Patch,
    /// A pre-subdivided triangle grid.
    Triangles,
}

/// Index buffer interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    /// Patches of `control_points` indices each.
    PatchList { control_points: u32 },
    /// Independent triangles, three indices each.
    TriangleList,
}

/// Renderable batch for one leaf chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkGeometry {
    /// UV bounds of the chunk.
    pub bounds: UvRect,
    /// Depth of the chunk in the quadtree.
    pub depth: u32,
    /// Primitive mode the batch was built with.
    pub mode: PrimitiveMode,
    /// Grid cells per edge (1 for patches).
    pub resolution: u32,
    /// How to interpret `indices`.
    pub topology: Topology,
    /// Vertex buffer.
    pub vertices: Vec<TerrainVertex>,
    /// Index buffer.
    pub indices: Vec<u32>,
}

impl ChunkGeometry {
    /// Number of primitives (patches or triangles).
    pub fn primitive_count(&self) -> usize {
        match self.topology {
            Topology::PatchList { control_points } => self.indices.len() / control_points as usize,
            Topology::TriangleList => self.indices.len() / 3,
        }
    }

    /// Vertex data as bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as bytes for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Builds leaf geometry for one primitive mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeometryGenerator {
    mode: PrimitiveMode,
    grid_resolution: u32,
}

impl GeometryGenerator {
    /// Create a generator. `grid_resolution` is only used in triangle mode
    /// and is clamped to `1..=MAX_GRID_RESOLUTION`.
    pub fn new(mode: PrimitiveMode, grid_resolution: u32) -> Self {
        Self {
            mode,
            grid_resolution: grid_resolution.clamp(1, MAX_GRID_RESOLUTION),
        }
    }

    /// The primitive mode.
    pub fn mode(&self) -> PrimitiveMode {
        self.mode
    }

    /// Cells per chunk edge of the generated batch.
    pub fn resolution(&self) -> u32 {
        match self.mode {
            PrimitiveMode::Patch => 1,
            PrimitiveMode::Triangles => self.grid_resolution,
        }
    }

    /// Edge subdivisions the chunk is finally rendered with.
    ///
    /// Patches are tessellated down to one segment per heightfield texel of
    /// a finest-level chunk, capped at the hardware tessellation limit.
    pub fn rendered_segments(&self, chunk_size: u32) -> u32 {
        match self.mode {
            PrimitiveMode::Patch => chunk_size.clamp(1, MAX_PATCH_TESSELLATION),
            PrimitiveMode::Triangles => self.grid_resolution,
        }
    }

    /// True if `geometry` was built by an identically configured generator.
    pub fn matches(&self, geometry: &ChunkGeometry) -> bool {
        geometry.mode == self.mode && geometry.resolution == self.resolution()
    }

    /// Build the batch for a chunk.
    pub fn generate(&self, bounds: UvRect, depth: u32) -> ChunkGeometry {
        match self.mode {
            PrimitiveMode::Patch => self.patch(bounds, depth),
            PrimitiveMode::Triangles => self.grid(bounds, depth),
        }
    }

    fn patch(&self, bounds: UvRect, depth: u32) -> ChunkGeometry {
        const LOCAL: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let vertices = bounds
            .corners()
            .iter()
            .zip(LOCAL)
            .map(|(uv, local)| TerrainVertex {
                uv: uv.to_array(),
                local,
            })
            .collect();

        ChunkGeometry {
            bounds,
            depth,
            mode: PrimitiveMode::Patch,
            resolution: 1,
            topology: Topology::PatchList { control_points: 4 },
            vertices,
            indices: vec![0, 1, 2, 3],
        }
    }

    fn grid(&self, bounds: UvRect, depth: u32) -> ChunkGeometry {
        let n = self.grid_resolution;
        let row = n + 1;
        let step = 1.0 / n as f32;

        let mut vertices = Vec::with_capacity((row * row) as usize);
        for y in 0..row {
            for x in 0..row {
                let local = [x as f32 * step, y as f32 * step];
                let uv = [
                    bounds.origin.x + local[0] * bounds.size,
                    bounds.origin.y + local[1] * bounds.size,
                ];
                vertices.push(TerrainVertex { uv, local });
            }
        }

        let mut indices = Vec::with_capacity((n * n * 6) as usize);
        for y in 0..n {
            for x in 0..n {
                let nw = y * row + x;
                let ne = nw + 1;
                let sw = nw + row;
                let se = sw + 1;
                // Counter-clockwise in UV space.
                indices.extend_from_slice(&[nw, ne, se, nw, se, sw]);
            }
        }

        ChunkGeometry {
            bounds,
            depth,
            mode: PrimitiveMode::Triangles,
            resolution: n,
            topology: Topology::TriangleList,
            vertices,
            indices,
        }
    }
}
