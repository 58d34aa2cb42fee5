//! Candidate selection: the only source of randomness in reviewer assignment.
//!
//! Services hold an `Arc<dyn CandidateSelector>` so tests and reproducible
//! deployments can swap the thread RNG for a seeded one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::models::User;

/// Picks reviewers out of an eligible pool.
pub trait CandidateSelector: Send + Sync {
    /// Return a uniformly random `count`-subset of `pool` in random order.
    ///
    /// `count == 0` or an empty pool yields nothing; `count >= pool.len()`
    /// yields the whole pool.
    fn select(&self, pool: Vec<User>, count: usize) -> Vec<User>;
}

/// Partial Fisher-Yates shuffle: the first `count` slots end up holding a
/// uniform random sample without replacement.
pub fn select_random<T, R: Rng + ?Sized>(mut pool: Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    let len = pool.len();
    let count = count.min(len);

    for i in 0..count {
        let j = rng.gen_range(i..len);
        pool.swap(i, j);
    }

    pool.truncate(count);
    pool
}

/// Production selector backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl CandidateSelector for RandomSelector {
    fn select(&self, pool: Vec<User>, count: usize) -> Vec<User> {
        select_random(pool, count, &mut rand::thread_rng())
    }
}

/// Reproducible selector: the same seed and call sequence give the same picks.
pub struct SeededSelector {
    rng: Mutex<StdRng>,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CandidateSelector for SeededSelector {
    fn select(&self, pool: Vec<User>, count: usize) -> Vec<User> {
        // A poisoned lock still holds a usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        select_random(pool, count, &mut *rng)
    }
}
