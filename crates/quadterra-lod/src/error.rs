//! Terrain configuration errors.

/// Errors reported by [`Terrain::generate`](crate::Terrain::generate).
///
/// All variants are configuration problems: fix the setting and call
/// `generate()` again. `update()` never fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// No heightfield has been assigned.
    #[error("no heightfield assigned")]
    MissingHeightfield,

    /// The heightfield is not single-channel 16-bit.
    #[error("heightfield must be single-channel 16-bit, got {channels} channel(s) at {bit_depth} bits")]
    UnsupportedHeightFormat { channels: u8, bit_depth: u8 },

    /// Width or height is not a power of two.
    #[error("heightfield dimensions {width}x{height} are not powers of two")]
    HeightfieldNotPowerOfTwo { width: u32, height: u32 },

    /// Width or height is below the minimum resolution.
    #[error("heightfield dimensions {width}x{height} are below the minimum of {min}")]
    HeightfieldTooSmall { width: u32, height: u32, min: u32 },

    /// The chunk size is zero or not a power of two.
    #[error("chunk size {0} is not a power of two")]
    ChunkSizeNotPowerOfTwo(u32),

    /// The chunk size is larger than the heightfield.
    #[error("chunk size {chunk_size} exceeds heightfield resolution {resolution}")]
    ChunkSizeExceedsHeightfield { chunk_size: u32, resolution: u32 },

    /// The target triangle width is not a positive finite number.
    #[error("target triangle width {0} must be positive and finite")]
    InvalidTargetTriangleWidth(f32),

    /// The merge ratio is outside the open interval (0, 1).
    #[error("merge ratio {0} must lie strictly between 0 and 1")]
    InvalidMergeRatio(f32),

    /// The triangle grid resolution is outside `1..=MAX_GRID_RESOLUTION`.
    #[error("grid resolution {0} is out of range")]
    InvalidGridResolution(u32),

    /// The terrain transform has a non-positive or non-finite size or scale.
    #[error("terrain size and height scale must be finite, and size must be positive")]
    InvalidTerrainSize,
}

impl TerrainError {
    /// Every terrain error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        true
    }
}
