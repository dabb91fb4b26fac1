use mt_core::{ParticleId, SlotIndex};
use thiserror::Error;

use crate::Deviation;

#[derive(Debug, Error)]
pub enum ParticleError {
    #[error("stale or foreign handle: particle {id} at {slot}")]
    InvalidHandle { id: ParticleId, slot: SlotIndex },
}

pub type ParticleResult<T> = Result<T, ParticleError>;

/// One or more conserved quantities drifted beyond tolerance.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("conservation violated: {}", list(.deviations))]
pub struct ConservationViolation {
    pub deviations: Vec<Deviation>,
}

fn list(deviations: &[Deviation]) -> String {
    deviations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
