//! `mt-core` — foundational types for the `rust_mt` transport framework.
//!
//! This crate is a dependency of every other `mt-*` crate.  It intentionally
//! has no `mt-*` dependencies and minimal external ones (`rand`, `rustc-hash`
//! and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module            | Contents                                              |
//! |-------------------|-------------------------------------------------------|
//! | [`ids`]           | `ParticleId`, `ProcessId`, `SlotIndex`                |
//! | [`constants`]     | `HBARC`, `FM2_MB`, `NUCLEON_MASS`, `REALLY_SMALL`     |
//! | [`kinematics`]    | `ThreeVector`, `FourVector`, `p_cm`, `t_range`, …     |
//! | [`angles`]        | `Angles` (azimuth + polar cosine)                     |
//! | [`particle_type`] | `PdgCode`, `ParticleType`, `ParticleTypes` registry   |
//! | [`time`]          | `Clock`, `SimConfig`                                  |
//! | [`rng`]           | `SimRng` (global, seeded)                             |
//! | [`error`]         | `CoreError`, `CoreResult`                             |
//!
//! # Units
//!
//! Energies, momenta and masses are in GeV; times and positions in fm (c = 1).
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to `SimConfig`, ids and vectors. |

pub mod angles;
pub mod constants;
pub mod error;
pub mod ids;
pub mod kinematics;
pub mod particle_type;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use angles::Angles;
pub use error::{CoreError, CoreResult};
pub use ids::{ParticleId, ProcessId, SlotIndex};
pub use kinematics::{FourVector, ThreeVector};
pub use particle_type::{ParticleType, ParticleTypes, PdgCode};
pub use rng::SimRng;
pub use time::{Clock, SimConfig};
