//! The cross-section module interface.

use std::sync::Arc;

use mt_particles::ParticleData;

use crate::{ProcessBranch, ProcessType};

/// Produces weighted collision branches for a pair at CM energy `sqrt_s`.
///
/// Weights are partial cross sections in mb.  Implementations must be
/// `Send + Sync` so a finder holding one can be shared.
pub trait CrossSectionModel: Send + Sync {
    fn collision_branches(&self, a: &ParticleData, b: &ParticleData, sqrt_s: f64) -> Vec<ProcessBranch>;
}

/// Every pair scatters elastically with one constant cross section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticOnly {
    pub cross_section_mb: f64,
}

impl CrossSectionModel for ElasticOnly {
    fn collision_branches(&self, a: &ParticleData, b: &ParticleData, _sqrt_s: f64) -> Vec<ProcessBranch> {
        vec![ProcessBranch::new(
            ProcessType::Elastic,
            vec![Arc::clone(a.ptype()), Arc::clone(b.ptype())],
            self.cross_section_mb,
        )]
    }
}
