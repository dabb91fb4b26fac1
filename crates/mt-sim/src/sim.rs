//! The `Sim` struct and its timestep loop.

use std::time::Instant;

use mt_action::{Action, ActionContext, InteractionCounters, StringProcess};
use mt_core::constants::REALLY_SMALL;
use mt_core::{Clock, SimConfig, SimRng};
use mt_particles::{Particles, QuantumNumbers};
use tracing::{error, info, trace};

use crate::{ActionFinder, Propagator, SimObserver, SimResult};

// ── RunSummary ────────────────────────────────────────────────────────────────

/// Totals reported by [`Sim::run`] and [`Sim::run_timesteps`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub event:        u32,
    /// Timesteps completed by this call.
    pub timesteps:    u64,
    /// Clock time when the call returned (fm/c).
    pub end_time:     f64,
    /// Interactions executed since the sim was built.
    pub interactions: u32,
    /// Proposed actions dropped because an incoming particle was gone.
    pub rejected:     u32,
    pub particles:    usize,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<P>` holds all event state and drives the timestep loop:
///
/// 1. **Find**: every [`ActionFinder`] proposes actions for
///    `[t, t + Δt)`.
/// 2. **Order**: stable sort by execution time; ties keep proposal order.
/// 3. **Execute**: each action is re-validated immediately before it runs.
///    An action whose incoming particle was consumed by an earlier one is
///    dropped.  Executed actions are reported via
///    [`SimObserver::at_interaction`].
/// 4. **Propagate**: the [`Propagator`] moves everything to `t + Δt`.
/// 5. **Output / check**: intermediate output when a multiple of
///    `output_interval` was crossed, conservation check on the configured
///    cadence.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<P: Propagator> {
    /// Global configuration (times, seed, tolerances, …).
    pub config: SimConfig,

    /// Lab-frame clock; `clock.tick` counts completed timesteps.
    pub clock: Clock,

    /// The particle store.  Only actions and the propagator mutate it.
    pub particles: Particles,

    /// The one random stream of the event, threaded into finders and actions.
    pub rng: SimRng,

    /// Finders queried once per timestep, in order.
    pub finders: Vec<Box<dyn ActionFinder>>,

    pub propagator: P,

    /// String-fragmentation session used by string-excitation branches.
    pub string_process: Box<dyn StringProcess>,

    /// Conserved quantities at event start.
    pub conserved_initial: QuantumNumbers,

    pub counters: InteractionCounters,

    /// Event number passed to the observer.
    pub event: u32,

    pub(crate) wall_start: Instant,
}

impl<P: Propagator> Sim<P> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run one event: start hooks, timesteps until the clock would pass
    /// `config.end_time`, a final conservation check, end hooks.
    ///
    /// # Errors
    ///
    /// The first action failure or conservation violation aborts the run.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        self.start_event(observer);
        let start_tick = self.clock.tick;
        let mut previous = self.counters.interactions_total;

        while self.has_next_timestep() {
            self.timestep(observer, start_tick, &mut previous)?;
        }

        self.check_conservation()?;
        self.end_event(observer);
        Ok(self.summary(start_tick))
    }

    /// Run exactly `n` timesteps from the current position (ignores
    /// `end_time` and the event hooks).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_timesteps<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<RunSummary> {
        let start_tick = self.clock.tick;
        let mut previous = self.counters.interactions_total;
        for _ in 0..n {
            self.timestep(observer, start_tick, &mut previous)?;
        }
        Ok(self.summary(start_tick))
    }

    /// Compare the store against the event-start snapshot.
    pub fn check_conservation(&self) -> SimResult<()> {
        if let Err(violation) = self.conserved_initial.check(&self.particles, self.config.conservation_tolerance) {
            error!(time = self.clock.current_time(), %violation, "conserved quantities drifted");
            return Err(violation.into());
        }
        Ok(())
    }

    // ── Event boundaries ──────────────────────────────────────────────────

    fn start_event<O: SimObserver>(&mut self, observer: &mut O) {
        self.conserved_initial = QuantumNumbers::from_particles(&self.particles);
        self.wall_start = Instant::now();
        info!(
            event = self.event,
            seed = self.config.seed,
            particles = self.particles.len(),
            start = self.config.start_time,
            end = self.config.end_time,
            dt = self.config.delta_time,
            "event start",
        );
        self.log_measurements(0);
        observer.at_event_start(self.event, &self.particles);
    }

    fn end_event<O: SimObserver>(&mut self, observer: &mut O) {
        let time = self.clock.current_time();
        let n = self.particles.len();
        let rate = if n == 0 || time <= 0.0 {
            0.0
        } else {
            f64::from(self.counters.interactions_total) * 2.0 / (time * n as f64)
        };
        info!(
            event = self.event,
            wall = ?self.wall_start.elapsed(),
            interactions = self.counters.interactions_total,
            rejected = self.counters.rejected_total,
            scatter_rate = rate,
            "event end",
        );
        observer.at_event_end(self.event, &self.particles);
    }

    // ── Core timestep processing ──────────────────────────────────────────

    /// `true` while the step ending at `clock.next_time()` stays within
    /// `end_time` (up to rounding).
    fn has_next_timestep(&self) -> bool {
        self.clock.next_time() <= self.config.end_time + REALLY_SMALL
    }

    fn timestep<O: SimObserver>(&mut self, observer: &mut O, start_tick: u64, previous: &mut u32) -> SimResult<()> {
        self.perform_actions(observer)?;
        self.propagator.propagate(&mut self.particles, self.clock.next_time());

        let output_due = self.clock.crosses_multiple_of(self.config.output_interval);
        self.clock.advance();

        if output_due {
            let this_interval = self.counters.interactions_total - *previous;
            *previous = self.counters.interactions_total;
            self.log_measurements(this_interval);
            observer.at_intermediate_time(&self.particles, &self.clock);
        }

        let cadence = self.config.conservation_check_interval;
        if cadence > 0 && (self.clock.tick - start_tick).is_multiple_of(cadence) {
            self.check_conservation()?;
        }
        Ok(())
    }

    /// Find, order and execute this timestep's actions.
    fn perform_actions<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let mut actions: Vec<Action> = Vec::new();
        for finder in &self.finders {
            actions.extend(finder.find_possible_actions(&self.particles, &self.clock, &mut self.rng));
        }
        // Stable: equal times keep finder order.
        actions.sort_by(Action::cmp_time);

        let mut ctx = ActionContext { rng: &mut self.rng, string_process: self.string_process.as_mut() };
        for mut action in actions {
            if !action.validate(&self.particles) {
                self.counters.rejected_total += 1;
                trace!(%action, "dropped, incoming particle already consumed");
                continue;
            }
            action.perform(&mut self.particles, &mut self.counters, &mut ctx)?;
            observer.at_interaction(action.incoming(), action.outgoing(), action.process_type());
        }
        Ok(())
    }

    // ── Reporting ─────────────────────────────────────────────────────────

    /// One measurement line: drift of energy and momentum against the
    /// event start, scattering rate, and interaction count.
    fn log_measurements(&self, this_interval: u32) {
        let time = self.clock.current_time();
        let n = self.particles.len();
        let drift = self.conserved_initial.momentum - QuantumNumbers::from_particles(&self.particles).momentum;
        let rate = if n == 0 || time <= 0.0 {
            0.0
        } else {
            f64::from(self.counters.interactions_total) * 2.0 / (n as f64 * time)
        };
        info!(
            time,
            energy_drift = drift.x0,
            momentum_drift = drift.abs3(),
            scatter_rate = rate,
            interactions = this_interval,
            particles = n,
            wall = ?self.wall_start.elapsed(),
            "measurement",
        );
    }

    fn summary(&self, start_tick: u64) -> RunSummary {
        RunSummary {
            event:        self.event,
            timesteps:    self.clock.tick - start_tick,
            end_time:     self.clock.current_time(),
            interactions: self.counters.interactions_total,
            rejected:     self.counters.rejected_total,
            particles:    self.particles.len(),
        }
    }
}
