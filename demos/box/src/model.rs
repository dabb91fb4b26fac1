//! Species, decay table and cross sections of the box: nucleons, pions and
//! Δ(1232).

use std::sync::Arc;

use mt_action::{CrossSectionModel, ProcessBranch, ProcessType};
use mt_core::{CoreResult, ParticleType, ParticleTypes, PdgCode};
use mt_particles::ParticleData;
use mt_sim::DecayFinder;

const DELTA_PLUSPLUS: PdgCode = PdgCode(2224);
const DELTA_PLUS:     PdgCode = PdgCode(2214);
const DELTA_ZERO:     PdgCode = PdgCode(2114);
const DELTA_MINUS:    PdgCode = PdgCode(1114);

/// Total Δ(1232) width (GeV).
const DELTA_WIDTH: f64 = 0.117;

pub fn particle_table() -> CoreResult<ParticleTypes> {
    ParticleTypes::new(vec![
        ParticleType::new("p",   0.938, 0.0, PdgCode::PROTON,   1),
        ParticleType::new("n",   0.938, 0.0, PdgCode::NEUTRON,  1),
        ParticleType::new("π⁺",  0.138, 0.0, PdgCode::PI_PLUS,  2),
        ParticleType::new("π⁰",  0.138, 0.0, PdgCode::PI_ZERO,  2),
        ParticleType::new("π⁻",  0.138, 0.0, PdgCode::PI_MINUS, 2),
        ParticleType::new("Δ⁺⁺", 1.232, DELTA_WIDTH, DELTA_PLUSPLUS, 3),
        ParticleType::new("Δ⁺",  1.232, DELTA_WIDTH, DELTA_PLUS,     3),
        ParticleType::new("Δ⁰",  1.232, DELTA_WIDTH, DELTA_ZERO,     3),
        ParticleType::new("Δ⁻",  1.232, DELTA_WIDTH, DELTA_MINUS,    3),
    ])
}

/// Δ → Nπ with Clebsch-Gordan branching (1 or 2/3 + 1/3).
pub fn decay_table(types: &ParticleTypes) -> CoreResult<DecayFinder> {
    let modes = [
        (DELTA_PLUSPLUS, PdgCode::PROTON,  PdgCode::PI_PLUS,  1.0),
        (DELTA_PLUS,     PdgCode::PROTON,  PdgCode::PI_ZERO,  2.0 / 3.0),
        (DELTA_PLUS,     PdgCode::NEUTRON, PdgCode::PI_PLUS,  1.0 / 3.0),
        (DELTA_ZERO,     PdgCode::NEUTRON, PdgCode::PI_ZERO,  2.0 / 3.0),
        (DELTA_ZERO,     PdgCode::PROTON,  PdgCode::PI_MINUS, 1.0 / 3.0),
        (DELTA_MINUS,    PdgCode::NEUTRON, PdgCode::PI_MINUS, 1.0),
    ];
    let mut finder = DecayFinder::new();
    for &(parent, nucleon, pion, fraction) in &modes {
        let products = vec![types.find(nucleon)?, types.find(pion)?];
        finder.add_mode(parent, ProcessBranch::new(ProcessType::Decay, products, DELTA_WIDTH * fraction));
    }
    Ok(finder)
}

fn is_pion(pdg: PdgCode) -> bool {
    matches!(pdg, PdgCode::PI_PLUS | PdgCode::PI_ZERO | PdgCode::PI_MINUS)
}

/// Constant partial cross sections (mb):
///
/// | Pair | Channels                                   |
/// |------|--------------------------------------------|
/// | any  | elastic                                    |
/// | πN   | resonance formation πN → Δ                 |
/// | NN   | excitation NN → ΔN above threshold         |
pub struct BoxModel {
    proton:        Arc<ParticleType>,
    neutron:       Arc<ParticleType>,
    /// Indexed by charge + 1.
    deltas:        [Arc<ParticleType>; 4],
    elastic_mb:    f64,
    resonance_mb:  f64,
    excitation_mb: f64,
}

impl BoxModel {
    pub fn new(types: &ParticleTypes, elastic_mb: f64) -> CoreResult<Self> {
        Ok(Self {
            proton:        types.find(PdgCode::PROTON)?,
            neutron:       types.find(PdgCode::NEUTRON)?,
            deltas:        [
                types.find(DELTA_MINUS)?,
                types.find(DELTA_ZERO)?,
                types.find(DELTA_PLUS)?,
                types.find(DELTA_PLUSPLUS)?,
            ],
            elastic_mb,
            resonance_mb:  60.0,
            excitation_mb: 10.0,
        })
    }

    fn delta(&self, charge: i32) -> Option<&Arc<ParticleType>> {
        usize::try_from(charge + 1).ok().and_then(|i| self.deltas.get(i))
    }

    /// ΔN final states of an NN pair with total `charge`.
    fn excitations(&self, charge: i32) -> Vec<(&Arc<ParticleType>, &Arc<ParticleType>)> {
        let pairs = [(charge - 1, &self.proton), (charge, &self.neutron)];
        pairs
            .into_iter()
            .filter_map(|(delta_charge, nucleon)| self.delta(delta_charge).map(|d| (d, nucleon)))
            .collect()
    }
}

impl CrossSectionModel for BoxModel {
    fn collision_branches(&self, a: &ParticleData, b: &ParticleData, sqrt_s: f64) -> Vec<ProcessBranch> {
        let mut branches = vec![ProcessBranch::new(
            ProcessType::Elastic,
            vec![Arc::clone(a.ptype()), Arc::clone(b.ptype())],
            self.elastic_mb,
        )];
        let (pa, pb) = (a.pdgcode(), b.pdgcode());
        let charge = a.ptype().charge() + b.ptype().charge();

        if pa.is_nucleon() && pb.is_nucleon() {
            let channels = self.excitations(charge);
            let weight = self.excitation_mb / channels.len().max(1) as f64;
            for (delta, nucleon) in channels {
                let branch = ProcessBranch::new(ProcessType::TwoToTwo, vec![Arc::clone(delta), Arc::clone(nucleon)], weight);
                if branch.threshold() < sqrt_s {
                    branches.push(branch);
                }
            }
        } else if (is_pion(pa) && pb.is_nucleon()) || (pa.is_nucleon() && is_pion(pb)) {
            if let Some(delta) = self.delta(charge) {
                branches.push(ProcessBranch::new(ProcessType::TwoToOne, vec![Arc::clone(delta)], self.resonance_mb));
            }
        }
        branches
    }
}
