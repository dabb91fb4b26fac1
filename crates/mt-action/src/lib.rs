//! `mt-action` — interactions that turn incoming particles into outgoing ones.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | [`process`]       | `ProcessType`, `StringProcessKind`                        |
//! | [`branch`]        | `ProcessBranch`, weighted `choose_channel`                |
//! | [`action`]        | `Action` enum, `ActionCore`, `ActionState`, `ActionContext`, `InteractionCounters` |
//! | [`decay`]         | `DecayAction` — isotropic two-body decays                 |
//! | [`scatter`]       | `ScatterAction` — channel selection + final-state realization |
//! | [`angular`]       | Cugnon slopes and momentum-transfer sampling              |
//! | [`formation`]     | Formation-time inheritance rules                          |
//! | [`string`]        | `StringProcess` session trait, `NoStringProcess`          |
//! | [`cross_section`] | `CrossSectionModel` trait, `ElasticOnly`                  |
//! | [`error`]         | `ActionError`, `ActionResult<T>`                          |
//!
//! # Lifecycle
//!
//! ```text
//!  finder ──► Proposed ──validate()──► Validated ──perform()──► Executed
//!                 │
//!                 └── a handle went stale ──► Rejected (silently dropped)
//! ```
//!
//! `perform` mutates the particle store through exactly one
//! `Particles::replace`, so observers see every interaction as one step.

pub mod action;
pub mod angular;
pub mod branch;
pub mod cross_section;
pub mod decay;
pub mod error;
pub mod formation;
pub mod process;
pub mod scatter;
pub mod string;

#[cfg(test)]
mod tests;

pub use action::{Action, ActionContext, ActionCore, ActionState, InteractionCounters};
pub use branch::{ProcessBranch, choose_channel};
pub use cross_section::{CrossSectionModel, ElasticOnly};
pub use decay::DecayAction;
pub use error::{ActionError, ActionResult};
pub use process::{ProcessType, StringProcessKind};
pub use scatter::ScatterAction;
pub use string::{NoStringProcess, STRING_RETRY_LIMIT, StringProcess};
