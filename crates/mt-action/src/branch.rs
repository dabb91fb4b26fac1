//! Weighted candidate outcomes and the sampler that picks one.

use std::sync::Arc;

use mt_core::{ParticleType, SimRng};
use mt_particles::ParticleData;

use crate::ProcessType;

/// One candidate outcome: a process tag, the outgoing species, and a weight
/// (partial cross section in mb, or partial width in GeV).
///
/// String branches carry no species; the string session decides them.
#[derive(Clone, Debug)]
pub struct ProcessBranch {
    process: ProcessType,
    types:   Vec<Arc<ParticleType>>,
    weight:  f64,
}

impl ProcessBranch {
    pub fn new(process: ProcessType, types: Vec<Arc<ParticleType>>, weight: f64) -> Self {
        Self { process, types, weight }
    }

    #[inline]
    pub fn process_type(&self) -> ProcessType {
        self.process
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn particle_types(&self) -> &[Arc<ParticleType>] {
        &self.types
    }

    /// Fresh outgoing records, at rest with their pole masses.
    pub fn particle_list(&self) -> Vec<ParticleData> {
        self.types.iter().map(|t| ParticleData::new(Arc::clone(t))).collect()
    }

    /// Sum of the outgoing pole masses.
    pub fn threshold(&self) -> f64 {
        self.types.iter().map(|t| t.mass()).sum()
    }
}

/// Pick a branch with probability `weight / total_weight`.
///
/// Returns the first branch whose running weight sum exceeds a uniform draw
/// in `[0, total_weight)`.  Rounding that exhausts the list yields the last
/// branch.  `None` only for an empty list.
pub fn choose_channel<'a>(
    branches:     &'a [ProcessBranch],
    total_weight: f64,
    rng:          &mut SimRng,
) -> Option<&'a ProcessBranch> {
    let r = total_weight * rng.canonical();
    let mut acc = 0.0;
    for branch in branches {
        acc += branch.weight;
        if acc > r {
            return Some(branch);
        }
    }
    branches.last()
}
