//! Three- and four-vectors plus the two-body kinematics helpers used by
//! the action resolution code.
//!
//! Four-vectors use the (+, −, −, −) metric: `p.sqr() = E² − |p⃗|²`.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

// ── ThreeVector ───────────────────────────────────────────────────────────────

/// A spatial vector (position, momentum or velocity).
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreeVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ThreeVector {
    pub const ZERO: ThreeVector = ThreeVector { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, other: ThreeVector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared Euclidean length.
    #[inline]
    pub fn sqr(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn abs(self) -> f64 {
        self.sqr().sqrt()
    }

    /// Rotate `self` so that the frame's z-axis ends up along `axis`.
    ///
    /// Equivalent to a rotation by the polar angle of `axis` about the y-axis
    /// followed by its azimuth about the z-axis.  A zero `axis` leaves `self`
    /// unchanged.
    pub fn rotate_z_axis_to(self, axis: ThreeVector) -> ThreeVector {
        let norm = axis.abs();
        if norm == 0.0 {
            return self;
        }
        let cos_theta = (axis.z / norm).clamp(-1.0, 1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let phi = axis.y.atan2(axis.x);
        let (sin_phi, cos_phi) = phi.sin_cos();

        // R_y(θ)
        let bx = cos_theta * self.x + sin_theta * self.z;
        let by = self.y;
        let bz = -sin_theta * self.x + cos_theta * self.z;
        // R_z(φ)
        ThreeVector {
            x: cos_phi * bx - sin_phi * by,
            y: sin_phi * bx + cos_phi * by,
            z: bz,
        }
    }
}

impl Add for ThreeVector {
    type Output = ThreeVector;
    #[inline]
    fn add(self, rhs: ThreeVector) -> ThreeVector {
        ThreeVector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for ThreeVector {
    #[inline]
    fn add_assign(&mut self, rhs: ThreeVector) {
        *self = *self + rhs;
    }
}

impl Sub for ThreeVector {
    type Output = ThreeVector;
    #[inline]
    fn sub(self, rhs: ThreeVector) -> ThreeVector {
        ThreeVector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for ThreeVector {
    type Output = ThreeVector;
    #[inline]
    fn neg(self) -> ThreeVector {
        ThreeVector::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for ThreeVector {
    type Output = ThreeVector;
    #[inline]
    fn mul(self, rhs: f64) -> ThreeVector {
        ThreeVector::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for ThreeVector {
    type Output = ThreeVector;
    #[inline]
    fn div(self, rhs: f64) -> ThreeVector {
        ThreeVector::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl fmt::Display for ThreeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}

// ── FourVector ────────────────────────────────────────────────────────────────

/// A Minkowski four-vector `(x0; x1, x2, x3)`.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FourVector {
    pub x0: f64,
    pub x1: f64,
    pub x2: f64,
    pub x3: f64,
}

impl FourVector {
    pub const ZERO: FourVector = FourVector { x0: 0.0, x1: 0.0, x2: 0.0, x3: 0.0 };

    #[inline]
    pub const fn new(x0: f64, x1: f64, x2: f64, x3: f64) -> Self {
        Self { x0, x1, x2, x3 }
    }

    /// Build from a time/energy component and a spatial part.
    #[inline]
    pub fn from_parts(x0: f64, v: ThreeVector) -> Self {
        Self::new(x0, v.x, v.y, v.z)
    }

    /// The spatial part.
    #[inline]
    pub fn threevec(self) -> ThreeVector {
        ThreeVector::new(self.x1, self.x2, self.x3)
    }

    /// Minkowski square `x0² − |x⃗|²`.
    #[inline]
    pub fn sqr(self) -> f64 {
        self.x0 * self.x0 - self.threevec().sqr()
    }

    /// Minkowski norm.  Space-like vectors return `−sqrt(|x²|)`.
    #[inline]
    pub fn abs(self) -> f64 {
        let s = self.sqr();
        if s < 0.0 { -(-s).sqrt() } else { s.sqrt() }
    }

    /// Length of the spatial part.
    #[inline]
    pub fn abs3(self) -> f64 {
        self.threevec().abs()
    }

    /// Velocity `x⃗ / x0` of a momentum four-vector.
    #[inline]
    pub fn velocity(self) -> ThreeVector {
        self.threevec() / self.x0
    }

    /// Boost into the frame moving with velocity `v` relative to the current
    /// frame.  Boosting a momentum by its own velocity yields `(m; 0⃗)`.
    pub fn lorentz_boost(self, v: ThreeVector) -> FourVector {
        let v2 = v.sqr();
        if v2 == 0.0 {
            return self;
        }
        let gamma = if v2 < 1.0 { 1.0 / (1.0 - v2).sqrt() } else { 0.0 };
        let x0_prime = gamma * (self.x0 - self.threevec().dot(v));
        let constant = gamma / (gamma + 1.0) * (x0_prime + self.x0);
        FourVector::from_parts(x0_prime, self.threevec() - v * constant)
    }
}

impl Add for FourVector {
    type Output = FourVector;
    #[inline]
    fn add(self, rhs: FourVector) -> FourVector {
        FourVector::new(self.x0 + rhs.x0, self.x1 + rhs.x1, self.x2 + rhs.x2, self.x3 + rhs.x3)
    }
}

impl AddAssign for FourVector {
    #[inline]
    fn add_assign(&mut self, rhs: FourVector) {
        *self = *self + rhs;
    }
}

impl Sub for FourVector {
    type Output = FourVector;
    #[inline]
    fn sub(self, rhs: FourVector) -> FourVector {
        FourVector::new(self.x0 - rhs.x0, self.x1 - rhs.x1, self.x2 - rhs.x2, self.x3 - rhs.x3)
    }
}

impl SubAssign for FourVector {
    #[inline]
    fn sub_assign(&mut self, rhs: FourVector) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for FourVector {
    type Output = FourVector;
    #[inline]
    fn mul(self, rhs: f64) -> FourVector {
        FourVector::new(self.x0 * rhs, self.x1 * rhs, self.x2 * rhs, self.x3 * rhs)
    }
}

impl Div<f64> for FourVector {
    type Output = FourVector;
    #[inline]
    fn div(self, rhs: f64) -> FourVector {
        FourVector::new(self.x0 / rhs, self.x1 / rhs, self.x2 / rhs, self.x3 / rhs)
    }
}

impl std::iter::Sum for FourVector {
    fn sum<I: Iterator<Item = FourVector>>(iter: I) -> FourVector {
        iter.fold(FourVector::ZERO, |acc, v| acc + v)
    }
}

impl fmt::Display for FourVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}; {:.6}, {:.6}, {:.6})", self.x0, self.x1, self.x2, self.x3)
    }
}

// ── Two-body kinematics ───────────────────────────────────────────────────────

/// Squared center-of-mass momentum of a two-body system with invariant
/// `mandelstam_s` and masses `m1`, `m2`.  Negative below threshold.
#[inline]
pub fn p_cm_sqr_from_s(mandelstam_s: f64, m1: f64, m2: f64) -> f64 {
    let sum = m1 + m2;
    let diff = m1 - m2;
    (mandelstam_s - sum * sum) * (mandelstam_s - diff * diff) / (4.0 * mandelstam_s)
}

/// Center-of-mass momentum for invariant `mandelstam_s`; `0.0` below threshold.
#[inline]
pub fn p_cm_from_s(mandelstam_s: f64, m1: f64, m2: f64) -> f64 {
    p_cm_sqr_from_s(mandelstam_s, m1, m2).max(0.0).sqrt()
}

/// Center-of-mass momentum for total CM energy `srts`; `0.0` below threshold.
#[inline]
pub fn p_cm(srts: f64, m1: f64, m2: f64) -> f64 {
    p_cm_from_s(srts * srts, m1, m2)
}

/// Lab-frame momentum of the projectile for two equal masses `m` colliding
/// with invariant `mandelstam_s` (target at rest).
#[inline]
pub fn plab_from_s(mandelstam_s: f64, m: f64) -> f64 {
    let radicand = mandelstam_s * (mandelstam_s - 4.0 * m * m);
    if radicand <= 0.0 { 0.0 } else { radicand.sqrt() / (2.0 * m) }
}

/// Kinematically allowed Mandelstam-t range for `1 + 2 → 3 + 4` at CM energy
/// `srts`.
///
/// Returns `[t_min, t_max]`; both are ≤ 0 with `t_min > t_max` (`t_min`
/// corresponds to forward scattering).
pub fn t_range(srts: f64, m1: f64, m2: f64, m3: f64, m4: f64) -> [f64; 2] {
    let p_i = p_cm(srts, m1, m2);
    let p_f = p_cm(srts, m3, m4);
    let sqrt_t0 = (m1 * m1 - m2 * m2 - m3 * m3 + m4 * m4) / (2.0 * srts);
    let t0 = sqrt_t0 * sqrt_t0;
    [t0 - (p_i - p_f) * (p_i - p_f), t0 - (p_i + p_f) * (p_i + p_f)]
}
