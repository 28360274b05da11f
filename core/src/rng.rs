//! Deterministic random number generation.
//!
//! RULE: Nothing in the pipeline may call any platform RNG.
//! All randomness flows through `IterationRng` instances derived from the
//! configured `random_state`, one stream per Monte Carlo iteration, so a
//! given iteration's split is reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG for a single Monte Carlo iteration.
pub struct IterationRng {
    pub iteration: u32,
    inner: Pcg64Mcg,
}

impl IterationRng {
    pub fn new(random_state: u64, iteration: u32) -> Self {
        let derived_seed =
            random_state.wrapping_add(iteration as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            iteration,
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// In-place Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_u64_below(i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }
}
