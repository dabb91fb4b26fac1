//! `DecayAction` — a single unstable particle decaying into two products.

use mt_core::kinematics::p_cm;
use mt_core::{Angles, FourVector, SimRng};
use mt_particles::ParticleData;

use crate::action::position_at;
use crate::formation::inherit_formation;
use crate::{ActionCore, ActionError, ActionResult, ProcessBranch, ProcessType};

/// Decay of one parent particle.  Branch weights are partial widths (GeV).
#[derive(Clone, Debug)]
pub struct DecayAction {
    pub(crate) core: ActionCore,
}

impl DecayAction {
    pub fn new(parent: ParticleData, time: f64) -> Self {
        Self { core: ActionCore::new(vec![parent], time) }
    }

    #[inline]
    pub fn core(&self) -> &ActionCore {
        &self.core
    }

    pub fn add_decay(&mut self, branch: ProcessBranch) {
        self.core.add_branch(branch);
    }

    pub fn add_decays(&mut self, branches: impl IntoIterator<Item = ProcessBranch>) {
        for branch in branches {
            self.core.add_branch(branch);
        }
    }

    /// Choose a channel and realize an isotropic two-body decay in the
    /// parent's rest frame, then boost to the computational frame.
    pub(crate) fn generate_final_state(&mut self, rng: &mut SimRng) -> ActionResult<()> {
        self.core.select_branch(rng)?;
        self.core.process_type = ProcessType::Decay;

        let n = self.core.outgoing.len();
        if n != 2 {
            return Err(ActionError::UnsupportedDecay(n));
        }

        let parent = &self.core.incoming[0];
        let srts = parent.effective_mass();
        let m_a = self.core.outgoing[0].pole_mass();
        let m_b = self.core.outgoing[1].pole_mass();
        if m_a + m_b > srts {
            return Err(ActionError::BelowThreshold { sqrt_s: srts, mass_sum: m_a + m_b });
        }

        let direction = Angles::isotropic(rng).threevec();
        let p = p_cm(srts, m_a, m_b);
        let beta = parent.velocity();
        let origin = position_at(parent, self.core.time);

        self.core.outgoing[0].set_4momentum(m_a, direction * p);
        self.core.outgoing[1].set_4momentum(m_b, -direction * p);
        for product in &mut self.core.outgoing {
            product.boost_momentum(-beta);
            product.position = FourVector::from_parts(self.core.time, origin);
        }
        inherit_formation(&self.core.incoming, self.core.time, &mut self.core.outgoing);
        Ok(())
    }
}
