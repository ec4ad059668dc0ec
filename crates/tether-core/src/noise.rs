use crate::F;
use nalgebra::Vector2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, StandardNormal};
use std::f64::consts::TAU;

/// Random source for a single bridge.
///
/// Every draw made while building a trajectory goes through this handle; there
/// is no process-wide generator. Two generators built with the same seed
/// produce identical draw sequences, so a seeded run reproduces bit-for-bit.
#[derive(Clone)]
pub struct NoiseGenerator {
    rng: ChaCha20Rng,
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Seeds from operating-system entropy. Runs driven by this generator are
    /// not reproducible.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn from_path_id(global_seed: u64, path_id: u64) -> Self {
        Self::new(Self::derive_seed(global_seed, path_id))
    }

    /// Seed used by [`NoiseGenerator::from_path_id`]. Callers that must record
    /// the effective seed (manifests, batch rows) resolve it with this.
    pub fn derive_seed(global_seed: u64, path_id: u64) -> u64 {
        global_seed.wrapping_add(path_id.wrapping_mul(0x9e3779b97f4a7c15))
    }

    /// Angle drawn uniformly from `[0, 2π)`.
    pub fn angle(&mut self) -> F {
        self.rng.gen_range(0.0..TAU)
    }

    /// Uniformly distributed point on the unit circle.
    pub fn unit_vector(&mut self) -> Vector2<F> {
        let theta = self.angle();
        Vector2::new(theta.cos(), theta.sin())
    }

    /// Isotropic Gaussian vector with per-axis standard deviation `sigma`.
    pub fn gaussian_vector(&mut self, sigma: F) -> Vector2<F> {
        let gx: f64 = StandardNormal.sample(&mut self.rng);
        let gy: f64 = StandardNormal.sample(&mut self.rng);
        Vector2::new(gx * sigma, gy * sigma)
    }
}
