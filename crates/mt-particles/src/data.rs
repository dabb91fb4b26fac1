//! `ParticleData` — one particle's full state.
//!
//! The same value type is used for the record stored in a slot and for the
//! snapshots ("handles") handed out to actions.  A snapshot carries the
//! `SlotIndex` it was read from so the store can check it later.

use std::fmt;
use std::sync::Arc;

use mt_core::{FourVector, ParticleId, ParticleType, PdgCode, ProcessId, SlotIndex, ThreeVector};

#[derive(Clone, Debug)]
pub struct ParticleData {
    id:         ParticleId,
    id_process: ProcessId,
    slot:       SlotIndex,
    /// Set only on store-internal records whose slot is logically empty.
    pub(crate) hole: bool,
    ptype:      Arc<ParticleType>,

    /// Four-momentum `(E; p⃗)` in GeV, computational frame.
    pub momentum: FourVector,
    /// Four-position `(t; x⃗)` in fm.
    pub position: FourVector,

    formation_time:              f64,
    begin_formation_time:        f64,
    initial_xsec_scaling_factor: f64,
}

impl ParticleData {
    /// A fresh particle of `ptype` at rest at the origin with its pole mass.
    ///
    /// The identity is `INVALID` until the record is inserted into a store.
    pub fn new(ptype: Arc<ParticleType>) -> Self {
        let mass = ptype.mass();
        Self {
            id:                          ParticleId::INVALID,
            id_process:                  ProcessId::INITIAL,
            slot:                        SlotIndex::INVALID,
            hole:                        false,
            ptype,
            momentum:                    FourVector::new(mass, 0.0, 0.0, 0.0),
            position:                    FourVector::ZERO,
            formation_time:              0.0,
            begin_formation_time:        0.0,
            initial_xsec_scaling_factor: 1.0,
        }
    }

    // ── Identity ──────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> ParticleId {
        self.id
    }

    /// The action that created this particle.
    #[inline]
    pub fn id_process(&self) -> ProcessId {
        self.id_process
    }

    /// Stamp the creating action.  Only meaningful before insertion.
    pub fn set_id_process(&mut self, process: ProcessId) {
        self.id_process = process;
    }

    /// The slot this snapshot was read from (`INVALID` for detached records).
    #[inline]
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Generation token: a slot is still "the same particle" while both
    /// halves match.
    #[inline]
    pub fn token(&self) -> (ParticleId, ProcessId) {
        (self.id, self.id_process)
    }

    pub(crate) fn assign(&mut self, id: ParticleId, slot: SlotIndex) {
        self.id = id;
        self.slot = slot;
        self.hole = false;
    }

    // ── Species ───────────────────────────────────────────────────────────

    #[inline]
    pub fn ptype(&self) -> &Arc<ParticleType> {
        &self.ptype
    }

    #[inline]
    pub fn pdgcode(&self) -> PdgCode {
        self.ptype.pdgcode()
    }

    #[inline]
    pub fn pole_mass(&self) -> f64 {
        self.ptype.mass()
    }

    /// Invariant mass of the current four-momentum.  Differs from the pole
    /// mass for off-shell resonances.
    #[inline]
    pub fn effective_mass(&self) -> f64 {
        self.momentum.abs()
    }

    // ── Kinematics ────────────────────────────────────────────────────────

    /// Set an on-shell four-momentum from `mass` and a three-momentum.
    pub fn set_4momentum(&mut self, mass: f64, p: ThreeVector) {
        self.momentum = FourVector::from_parts((mass * mass + p.sqr()).sqrt(), p);
    }

    /// Replace the three-momentum, keeping the current invariant mass.
    pub fn set_3momentum(&mut self, p: ThreeVector) {
        let mass = self.effective_mass();
        self.set_4momentum(mass, p);
    }

    /// Boost the momentum into the frame moving with velocity `v`.
    pub fn boost_momentum(&mut self, v: ThreeVector) {
        self.momentum = self.momentum.lorentz_boost(v);
    }

    #[inline]
    pub fn velocity(&self) -> ThreeVector {
        self.momentum.velocity()
    }

    // ── Formation ─────────────────────────────────────────────────────────

    /// Time (fm) at which the particle is fully formed.
    #[inline]
    pub fn formation_time(&self) -> f64 {
        self.formation_time
    }

    /// Start of the formation interval.
    #[inline]
    pub fn begin_formation_time(&self) -> f64 {
        self.begin_formation_time
    }

    /// Cross-section scaling factor while the particle is still forming.
    #[inline]
    pub fn initial_xsec_scaling_factor(&self) -> f64 {
        self.initial_xsec_scaling_factor
    }

    /// Formed at `time`; the formation interval starts at the current
    /// position time.
    pub fn set_formation_time(&mut self, time: f64) {
        self.formation_time = time;
        self.begin_formation_time = self.position.x0;
    }

    /// Still forming over `[begin, form]`.
    pub fn set_slow_formation_times(&mut self, begin: f64, form: f64) {
        self.begin_formation_time = begin;
        self.formation_time = form;
    }

    pub fn set_cross_section_scaling_factor(&mut self, factor: f64) {
        self.initial_xsec_scaling_factor = factor;
    }

    /// Effective cross-section scaling at `time`: the initial factor before
    /// the formation time, `1.0` afterwards.
    #[inline]
    pub fn xsec_scaling_factor(&self, time: f64) -> f64 {
        if time < self.formation_time { self.initial_xsec_scaling_factor } else { 1.0 }
    }

    /// `true` once `time` has reached the formation time.
    #[inline]
    pub fn is_formed(&self, time: f64) -> bool {
        time >= self.formation_time
    }
}

impl fmt::Display for ParticleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] p={} x={}",
            self.id,
            self.ptype.name(),
            self.id_process,
            self.momentum,
            self.position,
        )
    }
}
