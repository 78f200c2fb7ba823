//! Seeded random number generator backed by ChaCha8
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Debugging (reproduce an exact simulation run)
//! - Testing (verify behavior against known timelines)
//! - Scenario replay (two runs with the same seed are byte-identical)
//!
//! ChaCha8 is a counter-based stream cipher RNG with a stable output
//! sequence across platforms, which makes replays portable.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic random number generator for simulation runs
///
/// # Example
/// ```
/// use twin_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next_f64();
/// assert!(value >= 0.0 && value < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct RngManager {
    /// Seed the generator was constructed with
    seed: u64,
    /// Underlying ChaCha8 stream
    rng: ChaCha8Rng,
}

impl RngManager {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed this generator was constructed with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random f64 in `[0.0, 1.0)`
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Generate a random f64 in `[min, max)`
    ///
    /// # Panics
    /// Panics if `min >= max`
    ///
    /// # Example
    /// ```
    /// use twin_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// let factor = rng.range_f64(0.95, 1.05);
    /// assert!(factor >= 0.95 && factor < 1.05);
    /// ```
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        assert!(min < max, "min must be less than max");
        self.rng.gen_range(min..max)
    }

    /// Generate a random usize in `[0, bound)`
    ///
    /// # Panics
    /// Panics if `bound` is zero
    pub fn index(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "bound must be positive");
        self.rng.gen_range(0..bound)
    }

    /// Bernoulli trial: returns true with the given probability
    ///
    /// Probabilities outside `[0.0, 1.0]` are treated as never/always.
    pub fn chance(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.next_f64() < probability
    }
}
