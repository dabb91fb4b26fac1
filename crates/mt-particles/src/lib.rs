//! `mt-particles` — particle records and the slot-arena particle store.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`data`]      | `ParticleData` (record and handle in one value type)        |
//! | [`store`]     | `Particles` (slot arena with hole reuse), `Iter`            |
//! | [`conserved`] | `QuantumNumbers`, `Deviation`, `Quantity`                   |
//! | [`error`]     | `ParticleError`, `ConservationViolation`                    |
//!
//! # Handles
//!
//! There is no separate handle type.  Every `ParticleData` read out of the
//! store remembers the slot it was copied from; the store considers it a
//! valid handle while that slot still holds a live record with the same
//! `(ParticleId, ProcessId)` generation token.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Adds `Particles::par_iter_mut` (Rayon).                   |
//! | `serde`    | Derives `Serialize`/`Deserialize` on `QuantumNumbers`.    |

pub mod conserved;
pub mod data;
pub mod error;
pub mod store;


pub use conserved::{Deviation, Quantity, QuantumNumbers};
pub use data::ParticleData;
pub use error::{ConservationViolation, ParticleError, ParticleResult};
pub use store::{Iter, Particles};
