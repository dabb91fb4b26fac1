//! Unit directions expressed as an azimuth and a polar cosine.

use crate::constants::TWO_PI;
use crate::{SimRng, ThreeVector};

/// A direction on the unit sphere.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Angles {
    phi:       f64,
    cos_theta: f64,
}

impl Default for Angles {
    /// The +z direction.
    fn default() -> Self {
        Self { phi: 0.0, cos_theta: 1.0 }
    }
}

impl Angles {
    /// Create from azimuth `phi` (radians) and polar cosine `cos_theta`.
    ///
    /// `cos_theta` is clamped to `[-1, 1]` to absorb rounding from the
    /// momentum-transfer conversion.
    pub fn new(phi: f64, cos_theta: f64) -> Self {
        Self { phi, cos_theta: cos_theta.clamp(-1.0, 1.0) }
    }

    /// Draw a direction uniformly on the unit sphere.
    pub fn isotropic(rng: &mut SimRng) -> Self {
        let phi = TWO_PI * rng.canonical();
        let cos_theta = rng.uniform(-1.0, 1.0);
        Self::new(phi, cos_theta)
    }

    #[inline]
    pub fn phi(&self) -> f64 {
        self.phi
    }

    #[inline]
    pub fn cos_theta(&self) -> f64 {
        self.cos_theta
    }

    #[inline]
    pub fn sin_theta(&self) -> f64 {
        (1.0 - self.cos_theta * self.cos_theta).max(0.0).sqrt()
    }

    /// The unit vector pointing in this direction.
    pub fn threevec(&self) -> ThreeVector {
        let sin_theta = self.sin_theta();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        ThreeVector::new(sin_theta * cos_phi, sin_theta * sin_phi, self.cos_theta)
    }
}
