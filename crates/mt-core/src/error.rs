//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via a `From` impl.

use thiserror::Error;

use crate::PdgCode;

/// The error type for `mt-core` lookups and configuration checks.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("particle type {0} not found")]
    ParticleTypeNotFound(PdgCode),

    #[error("particle type {0} registered twice")]
    DuplicateParticleType(PdgCode),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `mt-core`.
pub type CoreResult<T> = Result<T, CoreError>;
