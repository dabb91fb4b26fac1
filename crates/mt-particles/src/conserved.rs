//! Conserved quantities of a particle population.
//!
//! The timestep loop snapshots [`QuantumNumbers`] at event start and compares
//! later snapshots against it.  Four-momentum components are compared with
//! an absolute tolerance; charge and baryon number must match exactly.

use std::fmt;

use mt_core::FourVector;

use crate::{ConservationViolation, ParticleData, Particles};

/// Which conserved quantity deviated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantity {
    Energy,
    MomentumX,
    MomentumY,
    MomentumZ,
    Charge,
    BaryonNumber,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quantity::Energy       => "energy",
            Quantity::MomentumX    => "px",
            Quantity::MomentumY    => "py",
            Quantity::MomentumZ    => "pz",
            Quantity::Charge       => "charge",
            Quantity::BaryonNumber => "baryon number",
        };
        f.write_str(name)
    }
}

/// One quantity that differs between two snapshots.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deviation {
    pub quantity: Quantity,
    pub initial:  f64,
    pub current:  f64,
}

impl Deviation {
    #[inline]
    pub fn difference(&self) -> f64 {
        self.current - self.initial
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: initial {:.9}, now {:.9} (Δ = {:+.3e})",
            self.quantity,
            self.initial,
            self.current,
            self.difference(),
        )
    }
}

/// Total four-momentum, charge and baryon number of a set of particles.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuantumNumbers {
    pub momentum:      FourVector,
    pub charge:        i32,
    pub baryon_number: i32,
}

impl QuantumNumbers {
    /// Sum over any sequence of particle records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ParticleData>) -> Self {
        records.into_iter().fold(Self::default(), |mut acc, p| {
            acc.momentum += p.momentum;
            acc.charge += p.ptype().charge();
            acc.baryon_number += p.ptype().baryon_number();
            acc
        })
    }

    /// Sum over every live particle in `particles`.
    pub fn from_particles(particles: &Particles) -> Self {
        Self::from_records(particles)
    }

    /// Every quantity in `current` that differs from `self` beyond
    /// `tolerance` (momentum) or at all (charges).
    pub fn deviations(&self, current: &QuantumNumbers, tolerance: f64) -> Vec<Deviation> {
        let momentum = [
            (Quantity::Energy,    self.momentum.x0, current.momentum.x0),
            (Quantity::MomentumX, self.momentum.x1, current.momentum.x1),
            (Quantity::MomentumY, self.momentum.x2, current.momentum.x2),
            (Quantity::MomentumZ, self.momentum.x3, current.momentum.x3),
        ];
        let mut out: Vec<Deviation> = momentum
            .into_iter()
            .filter(|(_, initial, now)| (now - initial).abs() > tolerance)
            .map(|(quantity, initial, current)| Deviation { quantity, initial, current })
            .collect();

        let charges = [
            (Quantity::Charge,       self.charge,        current.charge),
            (Quantity::BaryonNumber, self.baryon_number, current.baryon_number),
        ];
        for (quantity, initial, now) in charges {
            if initial != now {
                out.push(Deviation { quantity, initial: initial as f64, current: now as f64 });
            }
        }
        out
    }

    /// Compare the current content of `particles` against this snapshot.
    ///
    /// # Errors
    ///
    /// [`ConservationViolation`] listing every deviating quantity.
    pub fn check(&self, particles: &Particles, tolerance: f64) -> Result<(), ConservationViolation> {
        let deviations = self.deviations(&Self::from_particles(particles), tolerance);
        if deviations.is_empty() {
            Ok(())
        } else {
            Err(ConservationViolation { deviations })
        }
    }
}

impl fmt::Display for QuantumNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P={} Q={} B={}", self.momentum, self.charge, self.baryon_number)
    }
}
