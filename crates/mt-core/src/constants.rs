//! Physical constants and numerical tolerances.

/// GeV ↔ fm conversion factor (ħc in GeV·fm).
pub const HBARC: f64 = 0.197_327_053;

/// mb ↔ fm² conversion factor.
pub const FM2_MB: f64 = 0.1;

/// Nucleon mass in GeV.
pub const NUCLEON_MASS: f64 = 0.938;

/// Numerical error tolerance.
pub const REALLY_SMALL: f64 = 1.0e-6;

/// 2π.
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;
