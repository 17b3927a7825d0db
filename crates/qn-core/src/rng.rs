//! Deterministic simulation-level RNG.
//!
//! The scheduler is single-threaded and deterministic, so a single seeded
//! `SmallRng` is shared by everything that needs randomness: the default
//! uniform router's `desired_destination` pick, and any station factory
//! that layers randomness on top of externally supplied arrival/service
//! functions. The same seed always reproduces the same run.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant, used when a caller wants to
/// derive a reproducible child seed from an index (e.g. one RNG stream per
/// station) without it correlating with the root stream.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Simulation-level RNG for routing and other global random choices.
#[derive(Clone)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` deterministically from `offset` (e.g. a
    /// station index) without consuming from `self`.
    pub fn derive(seed: u64, offset: u64) -> SimRng {
        let child_seed = seed ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Pick an index in `0..len` uniformly at random. Used by
    /// `desired_destination` when no routing table has been set.
    ///
    /// # Panics
    /// Panics if `len == 0` — callers must check for dead-end vertices first.
    #[inline]
    pub fn gen_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}
