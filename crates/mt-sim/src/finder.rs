//! The action-finder interface.

use mt_action::Action;
use mt_core::{Clock, SimRng};
use mt_particles::Particles;

/// Proposes candidate actions for the timestep starting at
/// `clock.current_time()`.
///
/// Called once per timestep per finder.  Returned actions must carry their
/// incoming records (read out of `particles`, so they are valid handles) and
/// an execution time inside `[clock.current_time(), clock.next_time())`.
/// Proposals may conflict with each other; the timestep loop resolves that.
pub trait ActionFinder {
    fn find_possible_actions(&self, particles: &Particles, clock: &Clock, rng: &mut SimRng) -> Vec<Action>;
}
