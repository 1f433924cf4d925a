//! Heightfield sources for the terrain LOD engine: the sampling contract,
//! a 16-bit in-memory heightfield, image loading, and procedural generation.

mod error;
mod heightfield;
mod procedural;
mod source;

pub use error::HeightfieldError;
pub use heightfield::Heightfield;
pub use procedural::FbmParams;
pub use source::{HeightFormat, HeightfieldSource, MIN_RESOLUTION};
