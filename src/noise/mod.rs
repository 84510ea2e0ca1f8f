//! Seeded gradient noise.
//!
//! Three-dimensional Perlin noise from the `noise` crate. Two fields built
//! from the same seed agree bit for bit on every input.

use ::noise::{NoiseFn, Perlin};

/// Seeded 3D noise field.
///
/// Sampling is pure: the only state is the generator's permutation table,
/// built once from the seed.
#[derive(Clone)]
pub struct NoiseField {
    seed: u64,
    perlin: Perlin,
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            perlin: Perlin::new(fold_seed(seed)),
        }
    }

    /// Seed this field was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sample the field at `(x, y, z)`.
    ///
    /// Returns a value in `[-1, 1]`, exactly `0.0` on integer lattice points.
    /// Non-finite inputs produce NaN.
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return f32::NAN;
        }
        let value = self.perlin.get([x as f64, y as f64, z as f64]);
        (value as f32).clamp(-1.0, 1.0)
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

/// `Perlin` takes a 32-bit seed; keep the high half of ours in play.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// One-shot sample for a seed.
///
/// Rebuilds the permutation table on every call; hot loops should hold a
/// [`NoiseField`] instead.
pub fn sample(seed: u64, x: f32, y: f32, z: f32) -> f32 {
    NoiseField::new(seed).sample(x, y, z)
}
