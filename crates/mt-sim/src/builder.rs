//! Fluent builder for constructing a [`Sim`].

use std::time::Instant;

use mt_action::{InteractionCounters, NoStringProcess, StringProcess};
use mt_core::{SimConfig, SimRng};
use mt_particles::{Particles, QuantumNumbers};

use crate::{ActionFinder, Propagator, Sim, SimError, SimResult};

/// Fluent builder for [`Sim<P>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — times, seed, tolerances, …
/// - [`Particles`] — the initial state, positioned no later than
///   `config.start_time`
/// - `P: Propagator` — e.g. [`FreeStreaming`][crate::FreeStreaming]
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                                  |
/// |------------------------|------------------------------------------|
/// | `.finder(f)`           | none; the event only propagates          |
/// | `.string_process(s)`   | [`NoStringProcess`] (always elastic)     |
/// | `.event(n)`            | `0`                                      |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, particles, FreeStreaming)
///     .finder(DecayFinder::new().with_mode(delta, branch))
///     .finder(ScatterFinder::new(ElasticOnly { cross_section_mb: 40.0 }))
///     .build()?;
/// let summary = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<P: Propagator> {
    config:         SimConfig,
    particles:      Particles,
    propagator:     P,
    finders:        Vec<Box<dyn ActionFinder>>,
    string_process: Option<Box<dyn StringProcess>>,
    event:          u32,
}

impl<P: Propagator> SimBuilder<P> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, particles: Particles, propagator: P) -> Self {
        Self {
            config,
            particles,
            propagator,
            finders:        Vec::new(),
            string_process: None,
            event:          0,
        }
    }

    /// Append a finder.  Finders run in insertion order, which decides the
    /// order of equal-time actions.
    pub fn finder(mut self, finder: impl ActionFinder + 'static) -> Self {
        self.finders.push(Box::new(finder));
        self
    }

    /// Supply the string-fragmentation session.
    pub fn string_process(mut self, session: impl StringProcess + 'static) -> Self {
        self.string_process = Some(Box::new(session));
        self
    }

    pub fn event(mut self, event: u32) -> Self {
        self.event = event;
        self
    }

    /// Validate inputs, snapshot the conserved quantities, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<P>> {
        self.config.validate()?;

        if self.config.output_interval.is_nan() || self.config.output_interval < 0.0 {
            return Err(SimError::Config(format!(
                "output_interval must be non-negative, got {}",
                self.config.output_interval
            )));
        }
        let start = self.config.start_time;
        if let Some(p) = self.particles.iter().find(|p| p.position.x0 > start + f64::EPSILON) {
            return Err(SimError::Config(format!(
                "particle {} is positioned at t={} after start_time {start}",
                p.id(),
                p.position.x0,
            )));
        }

        #[cfg(feature = "parallel")]
        if let Some(n) = self.config.num_threads {
            // Rayon's global pool can be configured only once per process.
            if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
                tracing::debug!(threads = n, %e, "rayon pool already configured");
            }
        }

        Ok(Sim {
            clock:             self.config.make_clock(),
            rng:               SimRng::new(self.config.seed),
            conserved_initial: QuantumNumbers::from_particles(&self.particles),
            config:            self.config,
            particles:         self.particles,
            finders:           self.finders,
            propagator:        self.propagator,
            string_process:    self.string_process.unwrap_or_else(|| Box::new(NoStringProcess)),
            counters:          InteractionCounters::default(),
            event:             self.event,
            wall_start:        Instant::now(),
        })
    }
}
