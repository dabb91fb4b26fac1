//! The `Action` enum and the state shared by all its variants.

use std::cmp::Ordering;
use std::fmt;

use mt_core::{FourVector, ProcessId, SimRng, ThreeVector};
use mt_particles::{ParticleData, Particles};
use tracing::debug;

use crate::{
    ActionError, ActionResult, DecayAction, ProcessBranch, ProcessType, ScatterAction, StringProcess,
};

// ── ActionState ───────────────────────────────────────────────────────────────

/// Lifecycle of an action within one timestep.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionState {
    #[default]
    Proposed,
    Validated,
    Executed,
    Rejected,
}

// ── InteractionCounters ───────────────────────────────────────────────────────

/// Running totals owned by the timestep loop.
///
/// `interactions_total` doubles as the source of `ProcessId`s: the n-th
/// executed action stamps its products with `ProcessId(n)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionCounters {
    pub interactions_total: u32,
    pub rejected_total:     u32,
}

// ── ActionContext ─────────────────────────────────────────────────────────────

/// Mutable collaborators threaded into [`Action::perform`].
pub struct ActionContext<'a> {
    pub rng:            &'a mut SimRng,
    pub string_process: &'a mut dyn StringProcess,
}

// ── ActionCore ────────────────────────────────────────────────────────────────

/// Incoming handles, timing, candidate branches and the realized outcome.
#[derive(Clone, Debug)]
pub struct ActionCore {
    pub(crate) incoming:       Vec<ParticleData>,
    pub(crate) outgoing:       Vec<ParticleData>,
    pub(crate) time:           f64,
    pub(crate) process_type:   ProcessType,
    pub(crate) branches:       Vec<ProcessBranch>,
    pub(crate) total_weight:   f64,
    pub(crate) partial_weight: f64,
    pub(crate) state:          ActionState,
}

impl ActionCore {
    pub(crate) fn new(incoming: Vec<ParticleData>, time: f64) -> Self {
        Self {
            incoming,
            outgoing: Vec::new(),
            time,
            process_type: ProcessType::None,
            branches: Vec::new(),
            total_weight: 0.0,
            partial_weight: 0.0,
            state: ActionState::Proposed,
        }
    }

    /// Add a candidate.  Non-positive weights are dropped.
    pub(crate) fn add_branch(&mut self, branch: ProcessBranch) {
        if branch.weight() > 0.0 {
            self.total_weight += branch.weight();
            self.branches.push(branch);
        }
    }

    /// Pick a branch by weight and record it as the outcome.  Returns the
    /// chosen branch's process type.
    pub(crate) fn select_branch(&mut self, rng: &mut SimRng) -> ActionResult<ProcessType> {
        let branch = crate::choose_channel(&self.branches, self.total_weight, rng)
            .ok_or(ActionError::NoChannels)?;
        self.process_type = branch.process_type();
        self.partial_weight = branch.weight();
        self.outgoing = branch.particle_list();
        debug!(
            process = %self.process_type,
            weight = self.partial_weight,
            total = self.total_weight,
            products = self.outgoing.len(),
            "chosen channel",
        );
        Ok(self.process_type)
    }

    #[inline]
    pub fn incoming(&self) -> &[ParticleData] {
        &self.incoming
    }

    #[inline]
    pub fn outgoing(&self) -> &[ParticleData] {
        &self.outgoing
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn process_type(&self) -> ProcessType {
        self.process_type
    }

    #[inline]
    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn branches(&self) -> &[ProcessBranch] {
        &self.branches
    }

    /// Sum of all candidate weights.
    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Weight of the chosen branch (zero before execution).
    #[inline]
    pub fn partial_weight(&self) -> f64 {
        self.partial_weight
    }

    // ── Derived kinematics ────────────────────────────────────────────────

    pub fn total_momentum(&self) -> FourVector {
        self.incoming.iter().map(|p| p.momentum).sum()
    }

    #[inline]
    pub fn mandelstam_s(&self) -> f64 {
        self.total_momentum().sqr()
    }

    #[inline]
    pub fn sqrt_s(&self) -> f64 {
        self.total_momentum().abs()
    }

    /// Velocity of the incoming center-of-momentum frame.
    #[inline]
    pub fn beta_cm(&self) -> ThreeVector {
        self.total_momentum().velocity()
    }

    /// Mean position of the incoming particles, each streamed freely to the
    /// execution time.
    pub fn interaction_point(&self) -> FourVector {
        let n = self.incoming.len().max(1) as f64;
        let sum = self
            .incoming
            .iter()
            .map(|p| position_at(p, self.time))
            .fold(ThreeVector::ZERO, |acc, x| acc + x);
        FourVector::from_parts(self.time, sum / n)
    }

    /// `true` iff every incoming handle still refers to the same particle.
    pub fn is_valid(&self, particles: &Particles) -> bool {
        self.incoming.iter().all(|p| particles.is_valid(p))
    }
}

/// Spatial position of `p` at `time`, assuming straight-line motion.
pub(crate) fn position_at(p: &ParticleData, time: f64) -> ThreeVector {
    p.position.threevec() + p.velocity() * (time - p.position.x0)
}

// ── Action ────────────────────────────────────────────────────────────────────

/// A candidate interaction: one incoming particle (decay) or two (scatter).
#[derive(Clone, Debug)]
pub enum Action {
    Decay(DecayAction),
    Scatter(ScatterAction),
}

impl From<DecayAction> for Action {
    fn from(a: DecayAction) -> Self {
        Action::Decay(a)
    }
}

impl From<ScatterAction> for Action {
    fn from(a: ScatterAction) -> Self {
        Action::Scatter(a)
    }
}

impl Action {
    pub fn core(&self) -> &ActionCore {
        match self {
            Action::Decay(a) => a.core(),
            Action::Scatter(a) => a.core(),
        }
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        match self {
            Action::Decay(a) => &mut a.core,
            Action::Scatter(a) => &mut a.core,
        }
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.core().time
    }

    #[inline]
    pub fn incoming(&self) -> &[ParticleData] {
        self.core().incoming()
    }

    #[inline]
    pub fn outgoing(&self) -> &[ParticleData] {
        self.core().outgoing()
    }

    #[inline]
    pub fn process_type(&self) -> ProcessType {
        self.core().process_type
    }

    #[inline]
    pub fn state(&self) -> ActionState {
        self.core().state
    }

    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.core().total_weight
    }

    #[inline]
    pub fn partial_weight(&self) -> f64 {
        self.core().partial_weight
    }

    /// Pure validity query: are all incoming handles still live?
    #[inline]
    pub fn is_valid(&self, particles: &Particles) -> bool {
        self.core().is_valid(particles)
    }

    /// Re-check the incoming handles and move to `Validated` or `Rejected`.
    ///
    /// Executed and rejected actions stay where they are and report `false`.
    pub fn validate(&mut self, particles: &Particles) -> bool {
        let core = self.core_mut();
        match core.state {
            ActionState::Proposed | ActionState::Validated => {
                let valid = core.is_valid(particles);
                core.state = if valid { ActionState::Validated } else { ActionState::Rejected };
                valid
            }
            ActionState::Executed | ActionState::Rejected => false,
        }
    }

    /// Resolve the final state and apply it to `particles`.
    ///
    /// Legal only from `Validated`.  On success the interaction counter is
    /// incremented, outgoing records carry the new `ProcessId`, the incoming
    /// particles are replaced in one step, and `outgoing()` holds the live
    /// handles.
    pub fn perform(
        &mut self,
        particles: &mut Particles,
        counters:  &mut InteractionCounters,
        ctx:       &mut ActionContext<'_>,
    ) -> ActionResult<()> {
        let state = self.state();
        if state != ActionState::Validated {
            return Err(ActionError::InvalidState { expected: ActionState::Validated, found: state });
        }

        match self {
            Action::Decay(a) => a.generate_final_state(ctx.rng)?,
            Action::Scatter(a) => a.generate_final_state(ctx)?,
        }

        let process = ProcessId(counters.interactions_total + 1);
        let core = self.core_mut();
        for p in &mut core.outgoing {
            p.set_id_process(process);
        }
        let outgoing = std::mem::take(&mut core.outgoing);
        core.outgoing = particles.replace(&core.incoming, outgoing)?;
        core.state = ActionState::Executed;
        counters.interactions_total += 1;
        Ok(())
    }

    /// Ascending execution time.  Pair with a stable sort so equal times keep
    /// their proposal order.
    #[inline]
    pub fn cmp_time(&self, other: &Action) -> Ordering {
        self.time().total_cmp(&other.time())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core();
        let kind = match self {
            Action::Decay(_) => "Decay",
            Action::Scatter(_) => "Scatter",
        };
        write!(f, "{kind} at t={:.4} of [", core.time)?;
        for (i, p) in core.incoming.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p.id())?;
        }
        f.write_str("]")?;
        if core.state == ActionState::Executed {
            write!(f, " → {} ({})", core.outgoing.len(), core.process_type)?;
        }
        Ok(())
    }
}
