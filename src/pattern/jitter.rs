//! Reproducible per-line height jitter.
//!
//! The value is derived from a trigonometric hash of the line index and a process-wide seed, never
//! from an entropy source, so every renderer and every redraw of a frame sees the same multiplier.

use crate::foundation::math::fract01;

/// Lower bound of [`jitter`].
pub const JITTER_MIN: f64 = 0.92;
/// Upper bound of [`jitter`] (exclusive).
pub const JITTER_MAX: f64 = 1.04;

/// Seed used by the reference configuration.
pub const DEFAULT_SEED: f64 = 1337.0;

/// Hash `n` into `[0, 1)` as `fract(sin(n * 999 + seed) * 10000)`.
pub fn hash01(n: f64, seed: f64) -> f64 {
    let x = (n * 999.0 + seed).sin() * 10_000.0;
    fract01(x)
}

/// Height multiplier for band `index`, in `[0.92, 1.04)`.
///
/// Total over all real inputs; non-finite inputs collapse onto [`JITTER_MIN`].
pub fn jitter(index: f64, seed: f64) -> f64 {
    let h = hash01(index * 0.2, seed);
    if !h.is_finite() {
        return JITTER_MIN;
    }
    JITTER_MIN + h * (JITTER_MAX - JITTER_MIN)
}

/// Seeded jitter source handed to the band generator.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Jitter {
    /// Process-wide seed.
    pub seed: f64,
}

impl Jitter {
    pub fn new(seed: f64) -> Self {
        Self { seed }
    }

    /// Multiplier for band `index`.
    pub fn for_line(self, index: i64) -> f64 {
        jitter(index as f64, self.seed)
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/jitter.rs"]
mod tests;
