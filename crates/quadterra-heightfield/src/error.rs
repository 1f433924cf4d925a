//! Heightfield construction and loading errors.

/// Errors that can occur while building or loading a heightfield.
#[derive(Debug, thiserror::Error)]
pub enum HeightfieldError {
    /// The image file could not be opened or decoded.
    #[error("failed to load heightfield image: {0}")]
    Image(#[from] image::ImageError),

    /// The image is not a single-channel 16-bit grayscale image.
    #[error("unsupported heightfield pixel format {0:?}, expected 16-bit grayscale")]
    UnsupportedPixelFormat(image::ColorType),

    /// The sample buffer length does not match `width * height`.
    #[error("heightfield data has {actual} samples, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Width or height is zero.
    #[error("heightfield dimensions must be non-zero")]
    EmptyDimensions,
}
