//! Seeded simulation RNG
//!
//! Every random draw in the simulation goes through [`SimRng`] so a run is
//! fully reproducible from its seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in [0, 1)
    pub fn unit(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Uniform integer in [min, max] (inclusive); returns `min` if the range is empty
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..=max)
    }

    /// Uniform float in [min, max)
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..max)
    }

    /// Index in [0, len); `len` must be non-zero
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.inner.random_range(0..len)
    }

    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Pick from `(item, weight)` pairs proportionally to weight
    pub fn weighted<T: Copy>(&mut self, table: &[(T, u32)]) -> Option<T> {
        // Summed wide so content weights near u32::MAX cannot wrap
        let total: u64 = table.iter().map(|(_, w)| u64::from(*w)).sum();
        if total == 0 {
            return None;
        }
        let mut roll = self.inner.random_range(0..total);
        for &(item, weight) in table {
            let weight = u64::from(weight);
            if roll < weight {
                return Some(item);
            }
            roll -= weight;
        }
        None
    }
}
