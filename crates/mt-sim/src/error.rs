use mt_action::ActionError;
use mt_core::CoreError;
use mt_particles::{ConservationViolation, ParticleError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("action failed: {0}")]
    Action(#[from] ActionError),

    #[error("particle store error: {0}")]
    Particle(#[from] ParticleError),

    #[error(transparent)]
    Conservation(#[from] ConservationViolation),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
