//! Simulation time model.
//!
//! # Design
//!
//! The canonical time unit is an integer timestep counter.  The mapping to
//! simulated time (fm/c) is held in `Clock`:
//!
//!   time = start_time + tick * delta_time
//!
//! Deriving the time from an integer tick instead of accumulating
//! `time += delta_time` means long runs do not drift, and "has the clock
//! passed the end time?" is answered identically on every platform.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Clock ─────────────────────────────────────────────────────────────────────

/// The lab-frame simulation clock.
///
/// `Clock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clock {
    /// Simulated time of tick 0 (fm/c).
    pub start_time: f64,
    /// Length of one timestep (fm/c).
    pub delta_time: f64,
    /// Number of completed timesteps.
    pub tick: u64,
}

impl Clock {
    pub fn new(start_time: f64, delta_time: f64) -> Self {
        Self { start_time, delta_time, tick: 0 }
    }

    /// Current simulated time.
    #[inline]
    pub fn current_time(&self) -> f64 {
        self.time_at(self.tick)
    }

    /// Simulated time at the end of the current timestep.
    #[inline]
    pub fn next_time(&self) -> f64 {
        self.time_at(self.tick + 1)
    }

    #[inline]
    fn time_at(&self, tick: u64) -> f64 {
        self.start_time + tick as f64 * self.delta_time
    }

    /// Length of one timestep.
    #[inline]
    pub fn timestep_duration(&self) -> f64 {
        self.delta_time
    }

    /// Advance the clock by one timestep and return the new time.
    #[inline]
    pub fn advance(&mut self) -> f64 {
        self.tick += 1;
        self.current_time()
    }

    /// `true` if the step ending at [`next_time`](Self::next_time) crosses a
    /// multiple of `interval` (measured from `start_time`).
    ///
    /// A non-positive `interval` never triggers.
    pub fn crosses_multiple_of(&self, interval: f64) -> bool {
        if interval <= 0.0 {
            return false;
        }
        let before = ((self.current_time() - self.start_time) / interval).floor();
        let after = ((self.next_time() - self.start_time) / interval).floor();
        after > before
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3} fm (step {})", self.current_time(), self.tick)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulated time at which the event starts (fm/c).
    pub start_time: f64,

    /// The run stops once the clock would pass this time (fm/c).
    pub end_time: f64,

    /// Timestep length (fm/c).  Default: 0.1.
    pub delta_time: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Intermediate output every this many fm/c.  `0.0` disables it.
    pub output_interval: f64,

    /// Compare conserved quantities against the initial snapshot every N
    /// timesteps.  `0` only checks at event end.
    pub conservation_check_interval: u64,

    /// Absolute tolerance on energy/momentum drift (GeV).
    pub conservation_tolerance: f64,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_time:                  0.0,
            end_time:                    10.0,
            delta_time:                  0.1,
            seed:                        1,
            output_interval:             1.0,
            conservation_check_interval: 1,
            conservation_tolerance:      1e-6,
            num_threads:                 None,
        }
    }
}

impl SimConfig {
    /// Construct a `Clock` pre-configured for this run.
    pub fn make_clock(&self) -> Clock {
        Clock::new(self.start_time, self.delta_time)
    }

    /// Reject configurations the timestep loop cannot run.
    pub fn validate(&self) -> CoreResult<()> {
        if self.delta_time.is_nan() || self.delta_time <= 0.0 {
            return Err(CoreError::Config(format!(
                "delta_time must be positive, got {}",
                self.delta_time
            )));
        }
        if self.end_time < self.start_time {
            return Err(CoreError::Config(format!(
                "end_time {} precedes start_time {}",
                self.end_time, self.start_time
            )));
        }
        if self.conservation_tolerance.is_nan() || self.conservation_tolerance < 0.0 {
            return Err(CoreError::Config(format!(
                "conservation_tolerance must be non-negative, got {}",
                self.conservation_tolerance
            )));
        }
        Ok(())
    }
}
