//! Reference action finders.
//!
//! | Finder           | Proposes                                                  |
//! |------------------|-----------------------------------------------------------|
//! | `ScatterFinder`  | pairs whose closest approach falls inside the timestep    |
//! |                  | and whose transverse distance is below `√(σ/π)`           |
//! | `DecayFinder`    | unstable particles whose sampled lifetime ends in the step |

use std::f64::consts::PI;

use mt_action::{Action, CrossSectionModel, DecayAction, ProcessBranch, ScatterAction};
use mt_core::constants::{FM2_MB, HBARC, REALLY_SMALL};
use mt_core::{Clock, PdgCode, ProcessId, SimRng, ThreeVector};
use mt_particles::{ParticleData, Particles};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ActionFinder;

/// Position of `p` at `time` on a straight line.
fn stream_to(p: &ParticleData, time: f64) -> ThreeVector {
    p.position.threevec() + p.velocity() * (time - p.position.x0)
}

// ── Collisions ────────────────────────────────────────────────────────────────

/// Geometric collision criterion over all pairs, with branches from a
/// [`CrossSectionModel`].
pub struct ScatterFinder<C: CrossSectionModel> {
    model:     C,
    isotropic: bool,
}

impl<C: CrossSectionModel> ScatterFinder<C> {
    pub fn new(model: C) -> Self {
        Self { model, isotropic: false }
    }

    /// Force isotropic final states for every proposed collision.
    pub fn isotropic(mut self, isotropic: bool) -> Self {
        self.isotropic = isotropic;
        self
    }

    pub fn model(&self) -> &C {
        &self.model
    }

    /// A collision of `a` and `b` inside `[t0, t1)`, if they get close
    /// enough.
    ///
    /// The execution time is the lab-frame time of closest approach.  Each
    /// particle's cross-section scaling factor at that time multiplies the
    /// total cross section, so unformed particles interact less.  Two
    /// particles that left the same interaction are not paired again.
    pub fn check_pair(&self, a: &ParticleData, b: &ParticleData, t0: f64, t1: f64) -> Option<ScatterAction> {
        if a.id_process() == b.id_process() && a.id_process() != ProcessId::INITIAL {
            return None;
        }

        let dv = a.velocity() - b.velocity();
        let dv2 = dv.sqr();
        if dv2 < REALLY_SMALL {
            return None;
        }
        let dx = stream_to(a, t0) - stream_to(b, t0);
        let time = t0 - dx.dot(dv) / dv2;
        if !(t0..t1).contains(&time) {
            return None;
        }

        let mut action = ScatterAction::new(a.clone(), b.clone(), time, self.isotropic);
        action.add_all_scatterings(&self.model);
        let sigma = action.core().total_weight() * a.xsec_scaling_factor(time) * b.xsec_scaling_factor(time);
        if sigma <= 0.0 {
            return None;
        }
        if action.transverse_distance_sqr() >= sigma * FM2_MB / PI {
            return None;
        }
        Some(action)
    }
}

impl<C: CrossSectionModel> ActionFinder for ScatterFinder<C> {
    fn find_possible_actions(&self, particles: &Particles, clock: &Clock, _rng: &mut SimRng) -> Vec<Action> {
        let (t0, t1) = (clock.current_time(), clock.next_time());
        let live: Vec<&ParticleData> = particles.iter().collect();
        let mut actions = Vec::new();
        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                if let Some(action) = self.check_pair(a, b, t0, t1) {
                    actions.push(action.into());
                }
            }
        }
        trace!(t0, found = actions.len(), "collision candidates");
        actions
    }
}

// ── Decays ────────────────────────────────────────────────────────────────────

/// Decay table keyed by the parent's PDG code, with exponential lifetime
/// sampling.
///
/// Branch weights are partial widths in GeV; their sum is the total width.
#[derive(Default)]
pub struct DecayFinder {
    table: FxHashMap<PdgCode, Vec<ProcessBranch>>,
}

impl DecayFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one decay mode of `parent`.
    pub fn add_mode(&mut self, parent: PdgCode, branch: ProcessBranch) {
        self.table.entry(parent).or_default().push(branch);
    }

    pub fn with_mode(mut self, parent: PdgCode, branch: ProcessBranch) -> Self {
        self.add_mode(parent, branch);
        self
    }

    /// Registered modes of `parent`; empty for stable species.
    pub fn decay_modes(&self, parent: PdgCode) -> &[ProcessBranch] {
        self.table.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of the partial widths of `parent`.
    pub fn total_width(&self, parent: PdgCode) -> f64 {
        self.decay_modes(parent).iter().map(ProcessBranch::weight).sum()
    }
}

impl ActionFinder for DecayFinder {
    /// The decay rate in the computational frame is `Γ / (γ ħc)` per fm.
    /// A lifetime is sampled afresh each step for every unstable particle,
    /// counted from the start of the step or the particle's creation,
    /// whichever is later.
    fn find_possible_actions(&self, particles: &Particles, clock: &Clock, rng: &mut SimRng) -> Vec<Action> {
        let (t0, t1) = (clock.current_time(), clock.next_time());
        let mut actions = Vec::new();
        for p in particles {
            let modes = self.decay_modes(p.pdgcode());
            let width: f64 = modes.iter().map(ProcessBranch::weight).sum();
            let mass = p.effective_mass();
            if width <= 0.0 || mass <= 0.0 {
                continue;
            }
            let gamma = p.momentum.x0 / mass;
            let rate = width / (gamma * HBARC);
            let lifetime = -(1.0 - rng.canonical()).ln() / rate;
            let time = p.position.x0.max(t0) + lifetime;
            if time >= t1 {
                continue;
            }
            let mut action = DecayAction::new(p.clone(), time);
            action.add_decays(modes.iter().cloned());
            actions.push(action.into());
        }
        trace!(t0, found = actions.len(), "decay candidates");
        actions
    }
}
