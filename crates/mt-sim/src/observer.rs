//! Simulation observer trait for progress reporting and data collection.

use mt_action::ProcessType;
use mt_core::Clock;
use mt_particles::{ParticleData, Particles};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// timestep loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Output writers (binary, text, ...) live
/// outside this crate and hook in here.
///
/// # Example — interaction counter
///
/// ```rust,ignore
/// struct Counter { elastic: usize }
///
/// impl SimObserver for Counter {
///     fn at_interaction(&mut self, _in: &[ParticleData], _out: &[ParticleData], process: ProcessType) {
///         if process == ProcessType::Elastic {
///             self.elastic += 1;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once before the first timestep, with the initial particles.
    fn at_event_start(&mut self, _event: u32, _particles: &Particles) {}

    /// Called after every executed action.
    ///
    /// `incoming` are the records as they were before the action;
    /// `outgoing` are the live records it inserted.
    fn at_interaction(
        &mut self,
        _incoming: &[ParticleData],
        _outgoing: &[ParticleData],
        _process:  ProcessType,
    ) {}

    /// Called whenever a timestep crosses a multiple of
    /// `config.output_interval`, after propagation.
    fn at_intermediate_time(&mut self, _particles: &Particles, _clock: &Clock) {}

    /// Called once after the final timestep.
    fn at_event_end(&mut self, _event: u32, _particles: &Particles) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
