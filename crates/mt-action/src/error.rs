use mt_particles::ParticleError;
use thiserror::Error;

use crate::ActionState;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action is {found:?}, expected {expected:?}")]
    InvalidState { expected: ActionState, found: ActionState },

    #[error("invalid scatter action: {0}")]
    InvalidScatterAction(String),

    #[error("invalid resonance formation: {0}")]
    InvalidResonanceFormation(String),

    #[error("action has no channels to choose from")]
    NoChannels,

    #[error("only two-body decays are supported, got {0} products")]
    UnsupportedDecay(usize),

    #[error("channel closed: sqrt(s) = {sqrt_s} GeV below mass sum {mass_sum} GeV")]
    BelowThreshold { sqrt_s: f64, mass_sum: f64 },

    #[error(transparent)]
    Particle(#[from] ParticleError),
}

pub type ActionResult<T> = Result<T, ActionError>;
