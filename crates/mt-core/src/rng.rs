//! Deterministic simulation-level RNG wrapper.
//!
//! # Determinism strategy
//!
//! There is exactly one random-number stream per run.  It is owned by the
//! timestep loop and threaded explicitly (as `&mut SimRng`) into every
//! finder and every sampling routine, so a run is fully reproducible from
//! its seed and tests can inject their own seeded stream.
//!
//! Derived streams (e.g. for an independent initial-condition sampler) are
//! created with [`SimRng::child`], which mixes an offset into a fresh draw:
//!
//!   child_seed = parent.next_u64() XOR (offset * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive offsets uniformly across the seed space.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::constants::REALLY_SMALL;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Simulation-level RNG.
///
/// Used only in single-threaded contexts.  If you need parallel randomness,
/// give each worker thread its own `SimRng` derived with [`child`](Self::child).
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent stream from the next draw of this one, mixed
    /// with `offset`.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    // ── Sampling helpers ──────────────────────────────────────────────────

    /// Uniform draw in `[0, 1)`.
    #[inline]
    pub fn canonical(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// Uniform draw between `a` and `b`.  Unlike `gen_range`, the bounds may
    /// be given in either order and may coincide.
    #[inline]
    pub fn uniform(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.canonical()
    }

    /// Draw `x ∈ [x1, x2]` from the density `exp(a·x)`.
    ///
    /// `a` must be non-zero.
    pub fn expo(&mut self, a: f64, x1: f64, x2: f64) -> f64 {
        let r1 = (a * x1).exp();
        let r2 = (a * x2).exp();
        self.uniform(r1, r2).ln() / a
    }

    /// Draw `x ∈ [x1, x2]` from the density `x^n`, with `0 < x1, x2`.
    pub fn power(&mut self, n: f64, x1: f64, x2: f64) -> f64 {
        let n1 = n + 1.0;
        if n1.abs() < REALLY_SMALL {
            return x1 * (x2 / x1).powf(self.canonical());
        }
        self.uniform(x1.powf(n1), x2.powf(n1)).powf(1.0 / n1)
    }
}
