//! Angular distributions for two-body final states.
//!
//! Anisotropic channels sample the Mandelstam momentum transfer `t` inside
//! the kinematic range `[t_min, t_max]` (both ≤ 0, `t_min` forward) and
//! convert it to a polar angle in the center-of-mass frame:
//!
//! ```text
//!   cos θ = 1 − 2 (t − t_min) / (t_max − t_min)
//! ```
//!
//! | Distribution  | Used for                         | `t` density        |
//! |---------------|----------------------------------|--------------------|
//! | `Exponential` | elastic, NN → NΔ                 | `exp(B·t)`         |
//! | `PowerLaw`    | NN → N N*, NN → N Δ*             | `|t|^(−a)`         |
//! | `Isotropic`   | everything else                  | flat in `cos θ`    |
//!
//! Slopes follow the Cugnon parametrization of elastic NN data.

use mt_core::constants::{REALLY_SMALL, TWO_PI};
use mt_core::{Angles, SimRng};

/// Largest useful power-law index.  Sharper distributions are replaced by
/// forward scattering (`t = t_min`).
pub const MAX_POWER_LAW_INDEX: f64 = 30.0;

/// Coefficients of the NN → NR power-law index as a cubic in the resonance
/// mass (GeV).
const NR_INDEX_COEFFS: [f64; 4] = [1.46434, 5.80311, -6.89358, 1.94302];

/// Cugnon slope `B` (GeV⁻²) for elastic pp scattering at lab momentum
/// `plab` (GeV).  Capped at 9 for high-energy compatibility.
pub fn cugnon_bpp(plab: f64) -> f64 {
    if plab < 2.0 {
        let p8 = plab.powi(8);
        5.5 * p8 / (7.7 + p8)
    } else {
        (5.334 + 0.67 * (plab - 2.0)).min(9.0)
    }
}

/// Cugnon slope `B` (GeV⁻²) for elastic np scattering.
pub fn cugnon_bnp(plab: f64) -> f64 {
    if plab < 0.225 {
        0.0
    } else if plab < 0.6 {
        16.53 * (plab - 0.225)
    } else if plab < 1.6 {
        -1.63 * plab + 7.16
    } else {
        cugnon_bpp(plab)
    }
}

/// Power-law index for NN → N R with resonance mass `mass`.
pub fn resonance_power_index(mass: f64) -> f64 {
    let [c0, c1, c2, c3] = NR_INDEX_COEFFS;
    c0 + mass * (c1 + mass * (c2 + mass * c3))
}

/// A momentum-transfer distribution for a two-body final state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AngularDistribution {
    Isotropic,
    /// `exp(slope·t)`, mirrored across the range when a uniform draw exceeds
    /// `1 / (1 + mirror_weight)`.
    Exponential { slope: f64, mirror_weight: f64 },
    /// `|t|^(−index)`, mirrored with probability ½.
    PowerLaw { index: f64 },
}

impl AngularDistribution {
    /// Elastic NN slope; the np curve applies when `np_like`.
    pub fn elastic(plab: f64, np_like: bool) -> Self {
        if np_like {
            AngularDistribution::Exponential {
                slope:         cugnon_bnp(plab).max(REALLY_SMALL),
                mirror_weight: if plab < 0.8 { 1.0 } else { 0.64 / (plab * plab) },
            }
        } else {
            AngularDistribution::Exponential {
                slope:         cugnon_bpp(plab).max(REALLY_SMALL),
                mirror_weight: 1.0,
            }
        }
    }

    /// NN → NΔ: elastic pp slope, symmetric mirroring.
    pub fn nucleon_delta(plab: f64) -> Self {
        AngularDistribution::Exponential {
            slope:         cugnon_bpp(plab).max(REALLY_SMALL),
            mirror_weight: 1.0,
        }
    }

    /// NN → N R for an N* or Δ* of mass `mass`.
    pub fn nucleon_resonance(mass: f64) -> Self {
        AngularDistribution::PowerLaw { index: resonance_power_index(mass) }
    }

    /// Draw a CM-frame direction.  `t_range` is `[t_min, t_max]`.
    pub fn sample(&self, t_range: [f64; 2], rng: &mut SimRng) -> Angles {
        let [t_min, t_max] = t_range;
        let t = match *self {
            AngularDistribution::Isotropic => return Angles::isotropic(rng),
            AngularDistribution::Exponential { slope, mirror_weight } => {
                let t = rng.expo(slope, t_min, t_max);
                if rng.canonical() > 1.0 / (1.0 + mirror_weight) {
                    t_min + t_max - t
                } else {
                    t
                }
            }
            AngularDistribution::PowerLaw { index } => {
                let t = if index < MAX_POWER_LAW_INDEX {
                    // Sampled on |t|; the lower bound is kept off zero.
                    -rng.power(-index, t_min.abs().max(REALLY_SMALL), t_max.abs())
                } else {
                    t_min
                };
                if rng.canonical() > 0.5 { t_min + t_max - t } else { t }
            }
        };
        let span = t_max - t_min;
        let cos_theta = if span.abs() < REALLY_SMALL { 1.0 } else { 1.0 - 2.0 * (t - t_min) / span };
        Angles::new(TWO_PI * rng.canonical(), cos_theta)
    }
}
