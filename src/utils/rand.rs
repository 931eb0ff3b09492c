use crate::coding::Gf256;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random number generator wrapper for network coding
///
/// Backs both the coding coefficients and the relay suppression draw. The
/// seeded constructor makes every protocol decision reproducible in tests.
pub struct CodingRng {
    rng: ChaCha8Rng,
}

impl CodingRng {
    /// Create a new RNG with a random seed
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Create a new RNG with a specific seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: ChaCha8Rng::from_seed(seed),
        }
    }

    /// Generate random coefficients for network coding
    pub fn coefficients(&mut self, count: usize) -> Vec<Gf256> {
        (0..count).map(|_| self.coefficient()).collect()
    }

    /// Generate a single random coefficient
    pub fn coefficient(&mut self) -> Gf256 {
        Gf256(self.rng.gen::<u8>())
    }

    /// Uniform draw in `1..=100` for the relay suppression decision
    pub fn roll_percent(&mut self) -> u8 {
        self.rng.gen_range(1..=100)
    }
}

impl Default for CodingRng {
    fn default() -> Self {
        Self::new()
    }
}
