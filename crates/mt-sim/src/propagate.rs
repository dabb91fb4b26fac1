//! Propagation between interactions.

use mt_core::FourVector;
use mt_particles::{ParticleData, Particles};

/// Moves every particle to the end of the current timestep.
///
/// Particles do not share a position time: records created by an action sit
/// at the action's execution time.  Implementations advance each one from
/// its own `position.x0` to `to_time`.
pub trait Propagator {
    fn propagate(&self, particles: &mut Particles, to_time: f64);
}

/// Straight-line motion with constant velocity.
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeStreaming;

impl FreeStreaming {
    #[inline]
    fn stream(p: &mut ParticleData, to_time: f64) {
        let dt = to_time - p.position.x0;
        let x = p.position.threevec() + p.velocity() * dt;
        p.position = FourVector::from_parts(to_time, x);
    }
}

impl Propagator for FreeStreaming {
    #[cfg(not(feature = "parallel"))]
    fn propagate(&self, particles: &mut Particles, to_time: f64) {
        for p in particles.iter_mut() {
            Self::stream(p, to_time);
        }
    }

    #[cfg(feature = "parallel")]
    fn propagate(&self, particles: &mut Particles, to_time: f64) {
        use rayon::prelude::*;
        particles.par_iter_mut().for_each(|p| Self::stream(p, to_time));
    }
}
