// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Random travel times and site choices (conc.sim opaque random sources).
//!
//! Wrapped behind a trait so tests can inject a seeded, deterministic
//! source instead of the default `SystemRandom`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::bike::SiteId;

/// A source of the two random quantities the simulation needs. `Send +
/// Sync` because it's shared across every person thread and the van.
pub trait RandomSource: Send + Sync {
    /// Non-negative travel time in milliseconds.
    fn travel_time_ms(&self) -> u64;

    /// A uniform index in `[0, bound)`. Used directly for picking a
    /// person's preferred bike type; `site_except` builds on it.
    fn uniform_index(&self, bound: usize) -> usize;

    /// A site in `[0, num_sites)` different from `from`. Requires
    /// `num_sites >= 2`.
    fn site_except(&self, num_sites: usize, from: SiteId) -> SiteId {
        assert!(num_sites >= 2, "site_except requires at least 2 sites");
        loop {
            let candidate = SiteId(self.uniform_index(num_sites));
            if candidate != from {
                return candidate;
            }
        }
    }
}

/// Default `RandomSource`, backed by `rand`'s thread-local generator —
/// each call grabs `rand::rng()`, so no locking is needed here.
#[derive(Debug, Default)]
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for SystemRandom {
    fn travel_time_ms(&self) -> u64 {
        rand::rng().random_range(0..=500)
    }

    fn uniform_index(&self, bound: usize) -> usize {
        rand::rng().random_range(0..bound)
    }
}

/// Seeded, deterministic `RandomSource` for tests. Guarded by a mutex
/// since `SmallRng` needs `&mut self` while the trait takes `&self`.
pub struct SeededRandom {
    rng: Mutex<SmallRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn travel_time_ms(&self) -> u64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random_range(0..=500)
    }

    fn uniform_index(&self, bound: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random_range(0..bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_except_never_returns_from() {
        let rng = SeededRandom::new(42);
        for _ in 0..200 {
            let picked = rng.site_except(3, SiteId(1));
            assert_ne!(picked, SiteId(1));
        }
    }

    #[test]
    fn seeded_is_reproducible() {
        let a = SeededRandom::new(7);
        let b = SeededRandom::new(7);
        let seq_a: Vec<u64> = (0..20).map(|_| a.travel_time_ms()).collect();
        let seq_b: Vec<u64> = (0..20).map(|_| b.travel_time_ms()).collect();
        assert_eq!(seq_a, seq_b);
    }
}
