//! Particle species: PDG codes, immutable type descriptors, and the
//! read-only registry that owns them.
//!
//! Type descriptors are shared as `Arc<ParticleType>`; particle records
//! hold a clone of the `Arc`, so copying a record never copies the
//! descriptor.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{CoreError, CoreResult};

// ── PdgCode ───────────────────────────────────────────────────────────────────

/// A Monte-Carlo particle numbering scheme code (PDG convention).
///
/// Hadron codes are read digit-wise: `…n_q1 n_q2 n_q3 n_J`, where the
/// `n_q` digits are quark flavours (1 = d, 2 = u, 3 = s, 4 = c, 5 = b,
/// 6 = t) and `n_J = 2J + 1`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdgCode(pub i32);

impl PdgCode {
    pub const PROTON:  PdgCode = PdgCode(2212);
    pub const NEUTRON: PdgCode = PdgCode(2112);
    pub const PI_PLUS: PdgCode = PdgCode(211);
    pub const PI_ZERO: PdgCode = PdgCode(111);
    pub const PI_MINUS: PdgCode = PdgCode(-211);

    #[inline]
    fn digit(self, n: u32) -> u32 {
        (self.0.unsigned_abs() / 10u32.pow(n)) % 10
    }

    /// The three quark digits `(n_q1, n_q2, n_q3)`.
    #[inline]
    pub fn quarks(self) -> (u32, u32, u32) {
        (self.digit(3), self.digit(2), self.digit(1))
    }

    /// `+1` for particles, `−1` for antiparticles.
    #[inline]
    pub fn antiparticle_sign(self) -> i32 {
        if self.0 < 0 { -1 } else { 1 }
    }

    #[inline]
    pub fn is_hadron(self) -> bool {
        let (_, q2, q3) = self.quarks();
        self.0.unsigned_abs() > 100 && q2 != 0 && q3 != 0
    }

    #[inline]
    pub fn is_baryon(self) -> bool {
        self.is_hadron() && self.quarks().0 != 0
    }

    #[inline]
    pub fn baryon_number(self) -> i32 {
        if self.is_baryon() { self.antiparticle_sign() } else { 0 }
    }

    /// Twice the spin, `2J = n_J − 1`.  Zero for codes without a spin digit.
    #[inline]
    pub fn spin(self) -> u32 {
        self.digit(0).saturating_sub(1)
    }

    #[inline]
    pub fn is_nucleon(self) -> bool {
        matches!(self.0.abs(), 2212 | 2112)
    }

    /// Ground-state Δ(1232).
    #[inline]
    pub fn is_delta(self) -> bool {
        matches!(self.0.abs(), 2224 | 2214 | 2114 | 1114)
    }

    /// `true` for baryons built only from u and d quarks.
    #[inline]
    pub fn is_nonstrange_baryon(self) -> bool {
        let (q1, q2, q3) = self.quarks();
        self.is_baryon() && [q1, q2, q3].iter().all(|&q| q == 1 || q == 2)
    }

    /// Electric charge in units of e.
    pub fn charge(self) -> i32 {
        if !self.is_hadron() {
            return match self.0.abs() {
                11 | 13 | 15 => -self.antiparticle_sign(),
                24 => self.antiparticle_sign(),
                _ => 0,
            };
        }
        // Quark charges in units of e/3.
        let q = |flavour: u32| -> i32 { if flavour % 2 == 0 { 2 } else { -1 } };
        let (q1, q2, q3) = self.quarks();
        let thirds = if q1 != 0 {
            q(q1) + q(q2) + q(q3)
        } else if q2 % 2 == 0 {
            // Heavier quark up-type: it is the quark, n_q3 the antiquark.
            q(q2) - q(q3)
        } else {
            q(q3) - q(q2)
        };
        self.antiparticle_sign() * thirds / 3
    }
}

impl fmt::Display for PdgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── ParticleType ──────────────────────────────────────────────────────────────

/// Immutable descriptor of one particle species.
///
/// Charge, spin and baryon number are derived from the PDG code; isospin is
/// given explicitly because it is not recoverable from the code alone.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleType {
    name:          String,
    mass:          f64,
    width:         f64,
    pdg:           PdgCode,
    /// Twice the total isospin.
    isospin:       u32,
    charge:        i32,
    baryon_number: i32,
}

impl ParticleType {
    /// Create a descriptor.  `mass` and `width` are pole values in GeV;
    /// `isospin` is twice the total isospin (1 for nucleons, 3 for Δ).
    pub fn new(name: impl Into<String>, mass: f64, width: f64, pdg: PdgCode, isospin: u32) -> Self {
        Self {
            name: name.into(),
            mass,
            width,
            pdg,
            isospin,
            charge: pdg.charge(),
            baryon_number: pdg.baryon_number(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pole mass in GeV.
    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Width at the pole in GeV.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn pdgcode(&self) -> PdgCode {
        self.pdg
    }

    #[inline]
    pub fn isospin(&self) -> u32 {
        self.isospin
    }

    #[inline]
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Twice the spin.
    #[inline]
    pub fn spin(&self) -> u32 {
        self.pdg.spin()
    }

    #[inline]
    pub fn baryon_number(&self) -> i32 {
        self.baryon_number
    }

    /// Stable if the on-shell width is below 10 keV.
    #[inline]
    pub fn is_stable(&self) -> bool {
        self.width < 1e-5
    }

    #[inline]
    pub fn is_nucleon(&self) -> bool {
        self.pdg.is_nucleon()
    }

    #[inline]
    pub fn is_delta(&self) -> bool {
        self.pdg.is_delta()
    }

    /// Excited nucleon: a non-strange isospin-½ baryon other than N(938).
    pub fn is_nstar(&self) -> bool {
        self.pdg.is_nonstrange_baryon() && self.isospin == 1 && !self.pdg.is_nucleon()
    }

    /// Excited Δ: a non-strange isospin-3/2 baryon other than Δ(1232).
    pub fn is_deltastar(&self) -> bool {
        self.pdg.is_nonstrange_baryon() && self.isospin == 3 && !self.pdg.is_delta()
    }
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.pdg)
    }
}

// ── ParticleTypes ─────────────────────────────────────────────────────────────

/// Read-only registry of particle species keyed by PDG code.
///
/// Built once at startup and shared; lookups are O(1).
#[derive(Default)]
pub struct ParticleTypes {
    types: Vec<Arc<ParticleType>>,
    index: FxHashMap<PdgCode, usize>,
}

impl ParticleTypes {
    /// Build the registry.  Fails if two descriptors share a PDG code.
    pub fn new(types: Vec<ParticleType>) -> CoreResult<Self> {
        let mut registry = Self::default();
        for ptype in types {
            let pdg = ptype.pdgcode();
            if registry.index.contains_key(&pdg) {
                return Err(CoreError::DuplicateParticleType(pdg));
            }
            registry.index.insert(pdg, registry.types.len());
            registry.types.push(Arc::new(ptype));
        }
        Ok(registry)
    }

    /// Shared handle to the descriptor for `pdg`.
    pub fn find(&self, pdg: PdgCode) -> CoreResult<Arc<ParticleType>> {
        self.index
            .get(&pdg)
            .map(|&i| Arc::clone(&self.types[i]))
            .ok_or(CoreError::ParticleTypeNotFound(pdg))
    }

    pub fn exists(&self, pdg: PdgCode) -> bool {
        self.index.contains_key(&pdg)
    }

    /// All descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ParticleType>> + '_ {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
