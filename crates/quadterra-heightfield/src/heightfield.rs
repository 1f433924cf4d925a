//! In-memory 16-bit heightfield with bilinear, clamp-to-edge sampling.

use std::path::Path;

use image::DynamicImage;

use crate::{HeightFormat, HeightfieldError, HeightfieldSource};

/// A single-channel 16-bit heightfield stored row-major.
///
/// Texel `(x, y)` lives at `data[y * width + x]`. UV `(0, 0)` is the centre
/// of texel `(0, 0)` after clamping, `(1, 1)` the centre of the last texel.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    width: u32,
    height: u32,
    data: Vec<u16>,
}

impl Heightfield {
    /// Build a heightfield from raw row-major samples.
    pub fn new(width: u32, height: u32, data: Vec<u16>) -> Result<Self, HeightfieldError> {
        if width == 0 || height == 0 {
            return Err(HeightfieldError::EmptyDimensions);
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(HeightfieldError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a heightfield by evaluating `f(x, y)` for every texel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> u16,
    ) -> Result<Self, HeightfieldError> {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    /// A heightfield where every texel has the same raw value.
    pub fn flat(width: u32, height: u32, value: u16) -> Result<Self, HeightfieldError> {
        Self::from_fn(width, height, |_, _| value)
    }

    /// Convert a decoded image. Only 16-bit grayscale images are accepted.
    pub fn from_image(image: &DynamicImage) -> Result<Self, HeightfieldError> {
        match image {
            DynamicImage::ImageLuma16(buffer) => {
                let (width, height) = buffer.dimensions();
                Self::new(width, height, buffer.as_raw().clone())
            }
            other => Err(HeightfieldError::UnsupportedPixelFormat(other.color())),
        }
    }

    /// Load a 16-bit grayscale image (typically PNG) from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HeightfieldError> {
        let path = path.as_ref();
        let image = image::open(path)?;
        let heightfield = Self::from_image(&image)?;
        tracing::info!(
            path = %path.display(),
            width = heightfield.width,
            height = heightfield.height,
            "Loaded heightfield"
        );
        Ok(heightfield)
    }

    /// Raw sample at texel `(x, y)`, clamped to the edge.
    pub fn texel(&self, x: u32, y: u32) -> u16 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.data[y * self.width as usize + x]
    }

    /// Raw row-major samples.
    pub fn as_raw(&self) -> &[u16] {
        &self.data
    }

    fn texel_normalized(&self, x: u32, y: u32) -> f32 {
        self.texel(x, y) as f32 / u16::MAX as f32
    }
}

impl HeightfieldSource for Heightfield {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> HeightFormat {
        HeightFormat::R16
    }

    fn sample(&self, u: f32, v: f32) -> f32 {
        // Texel-centre addressing: texel i covers [i, i + 1) and is sampled at i + 0.5.
        let x = (u.clamp(0.0, 1.0) * self.width as f32 - 0.5).clamp(0.0, (self.width - 1) as f32);
        let y = (v.clamp(0.0, 1.0) * self.height as f32 - 0.5).clamp(0.0, (self.height - 1) as f32);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let h00 = self.texel_normalized(x0, y0);
        let h10 = self.texel_normalized(x0 + 1, y0);
        let h01 = self.texel_normalized(x0, y0 + 1);
        let h11 = self.texel_normalized(x0 + 1, y0 + 1);

        let top = h00 + (h10 - h00) * fx;
        let bottom = h01 + (h11 - h01) * fx;
        top + (bottom - top) * fy
    }
}
