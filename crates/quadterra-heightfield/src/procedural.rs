//! Procedural heightfields from multi-octave fractal Brownian motion.

use noise::{NoiseFn, Simplex};

use crate::{Heightfield, HeightfieldError};

/// Parameters for fBm over simplex noise.
///
/// Frequencies are expressed per unit of UV, so the same parameters produce
/// the same landscape at any resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct FbmParams {
    /// Seed for deterministic generation.
    pub seed: u32,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency of the first octave, in cycles across the whole heightfield.
    pub base_frequency: f64,
}

impl Default for FbmParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 4.0,
        }
    }
}

impl FbmParams {
    /// Sum of all octave amplitudes (first octave has amplitude 1).
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        for _ in 0..self.octaves {
            sum += amp;
            amp *= self.persistence;
        }
        sum
    }

    fn sample(&self, noise: &Simplex, u: f64, v: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.base_frequency;
        let mut amplitude = 1.0;

        for _ in 0..self.octaves {
            total += noise.get([u * frequency, v * frequency]) * amplitude;
            frequency *= self.lacunarity;
            amplitude *= self.persistence;
        }

        total
    }
}

impl Heightfield {
    /// Generate a square `resolution`² heightfield from fBm noise,
    /// remapped from `[-max_amplitude, max_amplitude]` onto the full 16-bit range.
    pub fn procedural(resolution: u32, params: &FbmParams) -> Result<Self, HeightfieldError> {
        let noise = Simplex::new(params.seed);
        let max_amp = params.max_amplitude().max(f64::EPSILON);
        let scale = resolution.max(1) as f64;

        let heightfield = Self::from_fn(resolution, resolution, |x, y| {
            let u = (x as f64 + 0.5) / scale;
            let v = (y as f64 + 0.5) / scale;
            let h = params.sample(&noise, u, v) / max_amp;
            (((h + 1.0) * 0.5).clamp(0.0, 1.0) * u16::MAX as f64).round() as u16
        })?;

        tracing::debug!(
            resolution,
            seed = params.seed,
            octaves = params.octaves,
            "Generated procedural heightfield"
        );
        Ok(heightfield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeightfieldSource;

    #[test]
    fn test_same_seed_is_deterministic() {
        let params = FbmParams {
            seed: 42,
            ..Default::default()
        };
        let a = Heightfield::procedural(64, &params).unwrap();
        let b = Heightfield::procedural(64, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = Heightfield::procedural(64, &FbmParams::default()).unwrap();
        let b = Heightfield::procedural(
            64,
            &FbmParams {
                seed: 999,
                ..Default::default()
            },
        )
        .unwrap();
        assert_ne!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_procedural_is_not_flat() {
        let hf = Heightfield::procedural(64, &FbmParams::default()).unwrap();
        let min = hf.as_raw().iter().copied().min().unwrap();
        let max = hf.as_raw().iter().copied().max().unwrap();
        assert!(max - min > 1000, "expected relief, got range {min}..{max}");
        assert_eq!(hf.width(), 64);
        assert_eq!(hf.height(), 64);
    }

    #[test]
    fn test_max_amplitude_calculation() {
        let params = FbmParams {
            octaves: 4,
            persistence: 0.5,
            ..Default::default()
        };
        assert!((params.max_amplitude() - 1.875).abs() < 1e-12);
    }
}
