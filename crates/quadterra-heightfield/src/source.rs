//! The contract every heightfield source fulfils.

/// Smallest width/height a heightfield may have to drive a terrain.
pub const MIN_RESOLUTION: u32 = 32;

/// Storage format reported by a heightfield source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeightFormat {
    /// Number of channels per texel.
    pub channels: u8,
    /// Bits per channel.
    pub bit_depth: u8,
}

impl HeightFormat {
    /// Single-channel, 16-bit: the only format the terrain accepts.
    pub const R16: Self = Self {
        channels: 1,
        bit_depth: 16,
    };
}

/// A read-only height sampler addressed by normalized UV.
///
/// Sampling is synchronous and must never read out of bounds: coordinates
/// outside `[0, 1]` are clamped to the edge.
pub trait HeightfieldSource: Send + Sync {
    /// Width in texels.
    fn width(&self) -> u32;

    /// Height in texels.
    fn height(&self) -> u32;

    /// Texel storage format.
    fn format(&self) -> HeightFormat;

    /// Normalized height in `[0, 1]` at `(u, v)`.
    fn sample(&self, u: f32, v: f32) -> f32;
}
