//! `ScatterAction` — a binary collision and its final-state realization.
//!
//! # Resolution
//!
//! 1. Pick one branch with probability proportional to its weight.
//! 2. Realize it:
//!
//!    | Process      | Final state                                              |
//!    |--------------|----------------------------------------------------------|
//!    | Elastic      | copies of the incoming pair, momenta resampled           |
//!    | 2 → 1        | one resonance at rest in the CM frame with mass √s       |
//!    | 2 → 2        | two-body phase space with pole masses                    |
//!    | String(kind) | fragments from the [`crate::StringProcess`] session      |
//!
//! 3. Boost everything from the CM frame back to the computational frame and
//!    place non-elastic products at the interaction point.
//! 4. Apply formation-time inheritance (see [`crate::formation`]).
//!
//! A string session that fails [`STRING_RETRY_LIMIT`] times in a row is not
//! an error: the collision is realized as elastic instead.

use mt_core::constants::{NUCLEON_MASS, REALLY_SMALL};
use mt_core::kinematics::{p_cm, p_cm_from_s, plab_from_s, t_range};
use mt_core::{SimRng, ThreeVector};
use mt_particles::ParticleData;
use tracing::{debug, warn};

use crate::angular::AngularDistribution;
use crate::formation::{inherit_formation, inherit_string_formation};
use crate::{
    ActionContext, ActionCore, ActionError, ActionResult, CrossSectionModel, ProcessBranch, ProcessType,
    STRING_RETRY_LIMIT, StringProcessKind,
};

/// Collision of two particles.  Branch weights are partial cross sections (mb).
#[derive(Clone, Debug)]
pub struct ScatterAction {
    pub(crate) core: ActionCore,
    isotropic:       bool,
}

impl ScatterAction {
    /// `isotropic` forces flat angular distributions for every channel.
    pub fn new(a: ParticleData, b: ParticleData, time: f64, isotropic: bool) -> Self {
        Self { core: ActionCore::new(vec![a, b], time), isotropic }
    }

    #[inline]
    pub fn core(&self) -> &ActionCore {
        &self.core
    }

    #[inline]
    pub fn is_isotropic(&self) -> bool {
        self.isotropic
    }

    pub fn add_collision(&mut self, branch: ProcessBranch) {
        self.core.add_branch(branch);
    }

    pub fn add_collisions(&mut self, branches: impl IntoIterator<Item = ProcessBranch>) {
        for branch in branches {
            self.core.add_branch(branch);
        }
    }

    /// Attach every branch `model` offers for this pair at its current √s.
    pub fn add_all_scatterings(&mut self, model: &dyn CrossSectionModel) {
        let sqrt_s = self.core.sqrt_s();
        let branches = model.collision_branches(&self.core.incoming[0], &self.core.incoming[1], sqrt_s);
        self.add_collisions(branches);
    }

    // ── Kinematics ────────────────────────────────────────────────────────

    /// Incoming momentum magnitude in the CM frame.
    pub fn cm_momentum(&self) -> f64 {
        let [a, b] = self.pair();
        p_cm(self.core.sqrt_s(), a.effective_mass(), b.effective_mass())
    }

    /// Squared transverse distance of closest approach in the CM frame:
    ///
    /// ```text
    ///   d⊥² = Δx² − (Δx · Δp)² / Δp²
    /// ```
    ///
    /// For vanishing relative momentum this is the plain distance squared.
    pub fn transverse_distance_sqr(&self) -> f64 {
        let beta = self.core.beta_cm();
        let [a, b] = self.pair();
        let dx = a.position.lorentz_boost(beta).threevec() - b.position.lorentz_boost(beta).threevec();
        let dp = a.momentum.lorentz_boost(beta).threevec() - b.momentum.lorentz_boost(beta).threevec();
        let dp2 = dp.sqr();
        let dr2 = dx.sqr();
        if dp2 < REALLY_SMALL {
            return dr2;
        }
        let dpdr = dx.dot(dp);
        dr2 - dpdr * dpdr / dp2
    }

    fn pair(&self) -> [&ParticleData; 2] {
        [&self.core.incoming[0], &self.core.incoming[1]]
    }

    // ── Resolution ────────────────────────────────────────────────────────

    pub(crate) fn generate_final_state(&mut self, ctx: &mut ActionContext<'_>) -> ActionResult<()> {
        let chosen = self.core.select_branch(ctx.rng)?;
        let middle = self.core.interaction_point();

        match chosen {
            ProcessType::Elastic => self.elastic_scattering(ctx.rng)?,
            ProcessType::TwoToOne => self.resonance_formation()?,
            ProcessType::TwoToTwo => self.inelastic_scattering(ctx.rng)?,
            ProcessType::String(kind) => self.string_excitation(kind, ctx)?,
            ProcessType::None | ProcessType::Decay => {
                let [a, b] = self.pair();
                return Err(ActionError::InvalidScatterAction(format!(
                    "process {chosen} requested for {} + {}",
                    a.pdgcode(),
                    b.pdgcode(),
                )));
            }
        }

        let beta = self.core.beta_cm();
        let elastic = self.core.process_type == ProcessType::Elastic;
        for p in &mut self.core.outgoing {
            p.boost_momentum(-beta);
            if !elastic {
                p.position = middle;
            }
        }

        let time = self.core.time;
        match self.core.process_type {
            ProcessType::TwoToOne | ProcessType::TwoToTwo => {
                inherit_formation(&self.core.incoming, time, &mut self.core.outgoing);
            }
            ProcessType::String(_) => {
                inherit_string_formation(&self.core.incoming, time, &mut self.core.outgoing);
            }
            _ => {}
        }
        Ok(())
    }

    /// Copies of the incoming pair with resampled momenta.
    fn elastic_scattering(&mut self, rng: &mut SimRng) -> ActionResult<()> {
        self.core.outgoing = self.core.incoming.clone();
        let masses = (self.core.incoming[0].effective_mass(), self.core.incoming[1].effective_mass());
        self.sample_angles(masses, rng)
    }

    fn resonance_formation(&mut self) -> ActionResult<()> {
        if self.core.outgoing.len() != 1 {
            let [a, b] = self.pair();
            return Err(ActionError::InvalidResonanceFormation(format!(
                "{} particles in final state of {} + {}",
                self.core.outgoing.len(),
                a.pdgcode(),
                b.pdgcode(),
            )));
        }
        let sqrt_s = self.core.sqrt_s();
        self.core.outgoing[0].set_4momentum(sqrt_s, ThreeVector::ZERO);
        Ok(())
    }

    fn inelastic_scattering(&mut self, rng: &mut SimRng) -> ActionResult<()> {
        if self.core.outgoing.len() != 2 {
            return Err(ActionError::InvalidScatterAction(format!(
                "2→2 channel with {} products",
                self.core.outgoing.len(),
            )));
        }
        let sqrt_s = self.core.sqrt_s();
        let masses = (self.core.outgoing[0].pole_mass(), self.core.outgoing[1].pole_mass());
        if masses.0 + masses.1 > sqrt_s {
            return Err(ActionError::BelowThreshold { sqrt_s, mass_sum: masses.0 + masses.1 });
        }
        self.sample_angles(masses, rng)
    }

    fn string_excitation(&mut self, kind: StringProcessKind, ctx: &mut ActionContext<'_>) -> ActionResult<()> {
        ctx.string_process.init(&self.core.incoming, self.core.time);

        let mut success = false;
        let mut tries = 0;
        while !success && tries < STRING_RETRY_LIMIT {
            tries += 1;
            success = ctx.string_process.attempt(kind);
        }

        if !success {
            warn!(
                process = ?kind,
                sqrt_s = self.core.sqrt_s(),
                tries,
                "string excitation failed, falling back to elastic scattering",
            );
            self.core.process_type = ProcessType::Elastic;
            return self.elastic_scattering(ctx.rng);
        }

        self.core.outgoing = ctx.string_process.final_state();
        debug!(
            tries,
            fragments = self.core.outgoing.len(),
            "string excitation succeeded",
        );
        Ok(())
    }

    /// Choose the momentum-transfer distribution for the current two-body
    /// outcome.
    pub(crate) fn angular_distribution(&self, mass_a: f64) -> AngularDistribution {
        if self.isotropic {
            return AngularDistribution::Isotropic;
        }
        let [in_a, in_b] = self.pair();
        let (out_a, out_b) = (&self.core.outgoing[0], &self.core.outgoing[1]);
        let nn = in_a.ptype().is_nucleon() && in_b.ptype().is_nucleon();
        let same_sign = out_a.pdgcode().antiparticle_sign() == out_b.pdgcode().antiparticle_sign();

        if self.core.process_type == ProcessType::Elastic {
            let s = if nn {
                self.core.mandelstam_s()
            } else {
                // Lab momentum of a nucleon pair with the same CM momentum.
                let p = p_cm_from_s(self.core.mandelstam_s(), in_a.effective_mass(), in_b.effective_mass());
                4.0 * (p * p + NUCLEON_MASS * NUCLEON_MASS)
            };
            let plab = plab_from_s(s, NUCLEON_MASS);
            let np_like = nn && same_sign && (out_a.ptype().charge() + out_b.ptype().charge()).abs() == 1;
            return AngularDistribution::elastic(plab, np_like);
        }

        if nn && out_a.pdgcode().is_delta() && out_b.pdgcode().is_nucleon() && same_sign {
            let plab = plab_from_s(self.core.mandelstam_s(), NUCLEON_MASS);
            return AngularDistribution::nucleon_delta(plab);
        }

        let excited = out_a.ptype().is_nstar() || out_a.ptype().is_deltastar();
        if nn && out_b.pdgcode().is_nucleon() && excited {
            return AngularDistribution::nucleon_resonance(mass_a);
        }

        AngularDistribution::Isotropic
    }

    /// Assign back-to-back CM momenta of the given masses to the two
    /// outgoing particles.  The direction is sampled relative to incoming
    /// particle 0's CM momentum.
    fn sample_angles(&mut self, masses: (f64, f64), rng: &mut SimRng) -> ActionResult<()> {
        if self.core.outgoing.len() != 2 {
            return Err(ActionError::InvalidScatterAction(format!(
                "two-body angles requested for {} products",
                self.core.outgoing.len(),
            )));
        }
        let (mass_a, mass_b) = masses;
        let sqrt_s = self.core.sqrt_s();
        let [in_a, in_b] = self.pair();
        let range = t_range(sqrt_s, in_a.effective_mass(), in_b.effective_mass(), mass_a, mass_b);
        let axis = in_a.momentum.lorentz_boost(self.core.beta_cm()).threevec();

        let angles = self.angular_distribution(mass_a).sample(range, rng);
        let direction = angles.threevec().rotate_z_axis_to(axis);

        let p_f = p_cm(sqrt_s, mass_a, mass_b);
        if p_f <= 0.0 {
            warn!(sqrt_s, mass_a, mass_b, "no phase space for outgoing pair");
        }
        self.core.outgoing[0].set_4momentum(mass_a, direction * p_f);
        self.core.outgoing[1].set_4momentum(mass_b, -direction * p_f);
        Ok(())
    }
}
