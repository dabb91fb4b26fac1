//! `mt-sim` — timestep loop orchestrator for the rust_mt transport framework.
//!
//! # Timestep loop
//!
//! ```text
//! while clock.next_time() <= config.end_time:
//!   ① Find       — every ActionFinder proposes actions in [t, t + Δt).
//!   ② Order      — stable sort by execution time.
//!   ③ Execute    — for each action: validate against the store, skip if a
//!                  handle went stale, else perform and report at_interaction.
//!   ④ Propagate  — Propagator moves every particle to t + Δt.
//!   ⑤ Output     — at_intermediate_time when a multiple of output_interval
//!                  was crossed; conservation check on the configured cadence.
//! ```
//!
//! Conflicts between actions proposed in the same step are resolved by
//! time order alone: the earlier action consumes the shared particle and the
//! later one fails validation.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs free-streaming propagation on Rayon's thread pool, |
//! |            | sized from `SimConfig::num_threads`.                   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use mt_action::ElasticOnly;
//! use mt_core::SimConfig;
//! use mt_sim::{FreeStreaming, NoopObserver, ScatterFinder, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), particles, FreeStreaming)
//!     .finder(ScatterFinder::new(ElasticOnly { cross_section_mb: 40.0 }))
//!     .build()?;
//! let summary = sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod finder;
pub mod finders;
pub mod observer;
pub mod propagate;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use finder::ActionFinder;
pub use finders::{DecayFinder, ScatterFinder};
pub use observer::{NoopObserver, SimObserver};
pub use propagate::{FreeStreaming, Propagator};
pub use sim::{RunSummary, Sim};
