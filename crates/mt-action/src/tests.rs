//! Unit tests for mt-action.

use std::sync::Arc;

use mt_core::constants::{NUCLEON_MASS, REALLY_SMALL};
use mt_core::kinematics::{p_cm_from_s, plab_from_s};
use mt_core::{FourVector, ParticleType, PdgCode, ProcessId, SimRng, ThreeVector};
use mt_particles::{ParticleData, Particles};

use crate::angular::{AngularDistribution, cugnon_bnp, cugnon_bpp, resonance_power_index};
use crate::formation::{inherit_formation, inherit_string_formation};
use crate::{
    Action, ActionContext, ActionError, ActionResult, ActionState, CrossSectionModel, DecayAction,
    ElasticOnly, InteractionCounters, NoStringProcess, ProcessBranch, ProcessType, STRING_RETRY_LIMIT,
    ScatterAction, StringProcess, StringProcessKind, choose_channel,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn species(name: &str, mass: f64, width: f64, pdg: i32, isospin: u32) -> Arc<ParticleType> {
    Arc::new(ParticleType::new(name, mass, width, PdgCode(pdg), isospin))
}

fn proton() -> Arc<ParticleType> {
    species("p", 0.938, 0.0, 2212, 1)
}

fn neutron() -> Arc<ParticleType> {
    species("n", 0.938, 0.0, 2112, 1)
}

fn pi_zero() -> Arc<ParticleType> {
    species("π⁰", 0.138, 0.0, 111, 2)
}

fn pi_minus() -> Arc<ParticleType> {
    species("π⁻", 0.138, 0.0, -211, 2)
}

fn delta_plus() -> Arc<ParticleType> {
    species("Δ⁺", 1.232, 0.117, 2214, 3)
}

fn delta_plusplus() -> Arc<ParticleType> {
    species("Δ⁺⁺", 1.232, 0.117, 2224, 3)
}

fn n1440() -> Arc<ParticleType> {
    species("N(1440)⁺", 1.44, 0.35, 12212, 1)
}

/// On-shell particle with pole mass, momentum `p` and position `(0; x)`.
fn particle(ptype: &Arc<ParticleType>, p: ThreeVector, x: ThreeVector) -> ParticleData {
    let mut data = ParticleData::new(Arc::clone(ptype));
    data.set_4momentum(ptype.mass(), p);
    data.position = FourVector::from_parts(0.0, x);
    data
}

/// Head-on pair along z, inserted into a fresh store.
fn colliding_pair(a: &Arc<ParticleType>, b: &Arc<ParticleType>, pz: f64) -> (Particles, ParticleData, ParticleData) {
    let mut store = Particles::new();
    let ha = store.insert(particle(a, ThreeVector::new(0.0, 0.0, pz), ThreeVector::new(0.0, 0.0, -0.5)));
    let hb = store.insert(particle(b, ThreeVector::new(0.0, 0.0, -pz), ThreeVector::new(0.0, 0.0, 0.5)));
    (store, ha, hb)
}

/// Validate and perform `action` against `store`.
fn execute(
    action:  &mut Action,
    store:   &mut Particles,
    rng:     &mut SimRng,
    session: &mut dyn StringProcess,
) -> ActionResult<InteractionCounters> {
    let mut counters = InteractionCounters::default();
    assert!(action.validate(store));
    let mut ctx = ActionContext { rng, string_process: session };
    action.perform(store, &mut counters, &mut ctx)?;
    Ok(counters)
}

fn assert_close4(a: FourVector, b: FourVector, tol: f64) {
    let d = a - b;
    assert!(
        d.x0.abs() < tol && d.x1.abs() < tol && d.x2.abs() < tol && d.x3.abs() < tol,
        "{a} != {b}"
    );
}

fn total(particles: &[ParticleData]) -> FourVector {
    particles.iter().map(|p| p.momentum).sum()
}

/// String session that fails until attempt `succeed_on` (never if `None`).
struct ScriptedSession {
    inits:      usize,
    attempts:   usize,
    succeed_on: Option<usize>,
    fragments:  Vec<ParticleData>,
}

impl ScriptedSession {
    fn failing() -> Self {
        Self { inits: 0, attempts: 0, succeed_on: None, fragments: Vec::new() }
    }

    fn try_once(&mut self) -> bool {
        self.attempts += 1;
        self.succeed_on.is_some_and(|n| self.attempts >= n)
    }
}

impl StringProcess for ScriptedSession {
    fn init(&mut self, _incoming: &[ParticleData], _time: f64) {
        self.inits += 1;
    }

    fn next_sdiff(&mut self, _is_ax: bool) -> bool {
        self.try_once()
    }

    fn next_ddiff(&mut self) -> bool {
        self.try_once()
    }

    fn next_ndiff_soft(&mut self) -> bool {
        self.try_once()
    }

    fn next_bbbar_ann(&mut self) -> bool {
        self.try_once()
    }

    fn next_ndiff_hard(&mut self) -> bool {
        self.try_once()
    }

    fn final_state(&mut self) -> Vec<ParticleData> {
        self.fragments.clone()
    }
}

// ── Channel selection ─────────────────────────────────────────────────────────

#[cfg(test)]
mod channels {
    use super::*;

    #[test]
    fn frequencies_follow_weights() {
        let branches = vec![
            ProcessBranch::new(ProcessType::Elastic, vec![proton(), proton()], 1.0),
            ProcessBranch::new(ProcessType::TwoToTwo, vec![delta_plusplus(), neutron()], 3.0),
        ];
        let mut rng = SimRng::new(11);
        let n = 20_000;
        let elastic = (0..n)
            .filter(|_| {
                choose_channel(&branches, 4.0, &mut rng).unwrap().process_type() == ProcessType::Elastic
            })
            .count();
        let fraction = elastic as f64 / n as f64;
        assert!((fraction - 0.25).abs() < 0.02, "elastic fraction {fraction}");
    }

    #[test]
    fn empty_list_has_no_channel() {
        let mut rng = SimRng::new(1);
        assert!(choose_channel(&[], 0.0, &mut rng).is_none());
    }

    #[test]
    fn non_positive_weights_are_dropped() {
        let (_, a, b) = colliding_pair(&proton(), &proton(), 0.5);
        let mut action = ScatterAction::new(a, b, 0.0, false);
        action.add_collision(ProcessBranch::new(ProcessType::Elastic, vec![proton(), proton()], 0.0));
        action.add_collision(ProcessBranch::new(ProcessType::Elastic, vec![proton(), proton()], -1.0));
        action.add_collision(ProcessBranch::new(ProcessType::Elastic, vec![proton(), proton()], 2.5));
        assert_eq!(action.core().branches().len(), 1);
        assert_eq!(action.core().total_weight(), 2.5);
    }

    #[test]
    fn total_weight_is_sum_of_branches() {
        let (_, a, b) = colliding_pair(&proton(), &neutron(), 0.5);
        let mut action = ScatterAction::new(a, b, 0.0, false);
        action.add_collisions([
            ProcessBranch::new(ProcessType::Elastic, vec![proton(), neutron()], 20.0),
            ProcessBranch::new(ProcessType::TwoToOne, vec![delta_plus()], 5.0),
        ]);
        assert_eq!(Action::from(action).total_weight(), 25.0);
    }

    #[test]
    fn branch_threshold_and_products() {
        let branch = ProcessBranch::new(ProcessType::TwoToTwo, vec![delta_plusplus(), neutron()], 1.0);
        assert!((branch.threshold() - 2.17).abs() < 1e-12);
        let products = branch.particle_list();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].pdgcode(), PdgCode(2224));
    }

    #[test]
    fn elastic_only_model() {
        let (_, a, b) = colliding_pair(&proton(), &pi_minus(), 0.3);
        let model = ElasticOnly { cross_section_mb: 40.0 };
        let branches = model.collision_branches(&a, &b, 1.2);
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].process_type(), ProcessType::Elastic);
        assert_eq!(branches[0].weight(), 40.0);

        let mut action = ScatterAction::new(a, b, 0.0, false);
        action.add_all_scatterings(&model);
        assert_eq!(action.core().total_weight(), 40.0);
    }
}

// ── Angular distributions ─────────────────────────────────────────────────────

#[cfg(test)]
mod angular {
    use super::*;

    #[test]
    fn cugnon_pp_is_continuous_and_capped() {
        assert!((cugnon_bpp(2.0 - 1e-9) - cugnon_bpp(2.0)).abs() < 0.01);
        assert_eq!(cugnon_bpp(100.0), 9.0);
        assert_eq!(cugnon_bpp(0.0), 0.0);
    }

    #[test]
    fn cugnon_np_pieces() {
        assert_eq!(cugnon_bnp(0.1), 0.0);
        assert!((cugnon_bnp(0.5) - 16.53 * 0.275).abs() < 1e-12);
        assert!((cugnon_bnp(1.0) - 5.53).abs() < 1e-12);
        assert_eq!(cugnon_bnp(3.0), cugnon_bpp(3.0));
    }

    #[test]
    fn resonance_index_polynomial() {
        let m = 1.44;
        let expected = 1.46434 + 5.80311 * m - 6.89358 * m * m + 1.94302 * m * m * m;
        assert!((resonance_power_index(m) - expected).abs() < 1e-12);
    }

    #[test]
    fn steep_slope_is_forward_peaked() {
        let mut rng = SimRng::new(3);
        let dist = AngularDistribution::Exponential { slope: 9.0, mirror_weight: 0.0 };
        let n = 5_000;
        let mean: f64 = (0..n).map(|_| dist.sample([0.0, -2.0], &mut rng).cos_theta()).sum::<f64>() / n as f64;
        assert!(mean > 0.7, "mean cos θ = {mean}");
    }

    #[test]
    fn sharp_power_law_is_forward_or_backward() {
        let mut rng = SimRng::new(4);
        let dist = AngularDistribution::PowerLaw { index: 40.0 };
        for _ in 0..200 {
            let c = dist.sample([-0.01, -1.0], &mut rng).cos_theta();
            assert!((c.abs() - 1.0).abs() < 1e-12, "cos θ = {c}");
        }
    }

    #[test]
    fn power_law_stays_in_range() {
        let mut rng = SimRng::new(5);
        let dist = AngularDistribution::nucleon_resonance(1.44);
        for _ in 0..1_000 {
            let c = dist.sample([0.0, -1.5], &mut rng).cos_theta();
            assert!(c.abs() <= 1.0 + 1e-12, "cos θ = {c}");
        }
    }

    #[test]
    fn np_mirror_weight_drops_above_800_mev() {
        let weight = |plab: f64| match AngularDistribution::elastic(plab, true) {
            AngularDistribution::Exponential { mirror_weight, .. } => mirror_weight,
            other => panic!("expected exponential, got {other:?}"),
        };
        assert_eq!(weight(0.5), 1.0);
        assert_eq!(weight(0.79), 1.0);
        assert!((weight(1.0) - 0.64).abs() < 1e-12);
        assert!((weight(2.0) - 0.16).abs() < 1e-12);
    }

    #[test]
    fn pp_mirror_weight_is_symmetric() {
        for plab in [0.5, 1.0, 2.0, 5.0] {
            assert_eq!(
                AngularDistribution::elastic(plab, false),
                AngularDistribution::Exponential { slope: cugnon_bpp(plab).max(REALLY_SMALL), mirror_weight: 1.0 },
            );
        }
    }

    #[test]
    fn degenerate_range_points_forward() {
        let mut rng = SimRng::new(6);
        let dist = AngularDistribution::elastic(1.0, false);
        assert_eq!(dist.sample([0.0, 0.0], &mut rng).cos_theta(), 1.0);
    }
}

// ── Angular distribution choice ───────────────────────────────────────────────

/// Head-on `a + b` at `±pz` with `outgoing` already realized as `process`.
fn two_body_outcome(
    a:         &Arc<ParticleType>,
    b:         &Arc<ParticleType>,
    pz:        f64,
    process:   ProcessType,
    outgoing:  &[Arc<ParticleType>],
    isotropic: bool,
) -> ScatterAction {
    let (_, ha, hb) = colliding_pair(a, b, pz);
    let mut action = ScatterAction::new(ha, hb, 0.0, isotropic);
    action.core.process_type = process;
    action.core.outgoing = outgoing.iter().map(|t| ParticleData::new(Arc::clone(t))).collect();
    action
}

fn slope_and_mirror(dist: AngularDistribution) -> (f64, f64) {
    match dist {
        AngularDistribution::Exponential { slope, mirror_weight } => (slope, mirror_weight),
        other => panic!("expected exponential, got {other:?}"),
    }
}

#[cfg(test)]
mod angular_choice {
    use super::*;

    #[test]
    fn pp_elastic_uses_pp_slope() {
        let action = two_body_outcome(&proton(), &proton(), 1.5, ProcessType::Elastic, &[proton(), proton()], false);
        let plab = plab_from_s(action.core().mandelstam_s(), NUCLEON_MASS);
        let (slope, mirror) = slope_and_mirror(action.angular_distribution(0.938));
        assert!((slope - cugnon_bpp(plab)).abs() < 1e-12);
        assert_eq!(mirror, 1.0);
    }

    #[test]
    fn np_elastic_uses_np_slope() {
        let action = two_body_outcome(&proton(), &neutron(), 1.5, ProcessType::Elastic, &[proton(), neutron()], false);
        let plab = plab_from_s(action.core().mandelstam_s(), NUCLEON_MASS);
        assert!(plab > 0.8);
        let (slope, mirror) = slope_and_mirror(action.angular_distribution(0.938));
        assert!((slope - cugnon_bnp(plab).max(REALLY_SMALL)).abs() < 1e-12);
        assert!((mirror - 0.64 / (plab * plab)).abs() < 1e-12);
    }

    #[test]
    fn slow_np_elastic_mirrors_evenly() {
        let action = two_body_outcome(&proton(), &neutron(), 0.3, ProcessType::Elastic, &[proton(), neutron()], false);
        let plab = plab_from_s(action.core().mandelstam_s(), NUCLEON_MASS);
        assert!(plab < 0.8);
        let (_, mirror) = slope_and_mirror(action.angular_distribution(0.938));
        assert_eq!(mirror, 1.0);
    }

    #[test]
    fn nucleon_delta_uses_pp_slope_mirrored_evenly() {
        let action = two_body_outcome(
            &proton(),
            &proton(),
            1.5,
            ProcessType::TwoToTwo,
            &[delta_plusplus(), neutron()],
            false,
        );
        let plab = plab_from_s(action.core().mandelstam_s(), NUCLEON_MASS);
        let (slope, mirror) = slope_and_mirror(action.angular_distribution(1.232));
        assert!((slope - cugnon_bpp(plab).max(REALLY_SMALL)).abs() < 1e-12);
        assert_eq!(mirror, 1.0);
    }

    #[test]
    fn nucleon_nstar_uses_power_law() {
        let action = two_body_outcome(&proton(), &proton(), 1.5, ProcessType::TwoToTwo, &[n1440(), proton()], false);
        assert_eq!(
            action.angular_distribution(1.44),
            AngularDistribution::PowerLaw { index: resonance_power_index(1.44) },
        );
    }

    #[test]
    fn pion_nucleon_elastic_uses_nucleon_equivalent_momentum() {
        let action =
            two_body_outcome(&pi_minus(), &proton(), 0.6, ProcessType::Elastic, &[pi_minus(), proton()], false);
        let p = p_cm_from_s(action.core().mandelstam_s(), 0.138, 0.938);
        let plab = plab_from_s(4.0 * (p * p + NUCLEON_MASS * NUCLEON_MASS), NUCLEON_MASS);
        let (slope, mirror) = slope_and_mirror(action.angular_distribution(0.138));
        assert!((slope - cugnon_bpp(plab).max(REALLY_SMALL)).abs() < 1e-12);
        assert_eq!(mirror, 1.0);
    }

    #[test]
    fn pion_nucleon_inelastic_is_isotropic() {
        let action =
            two_body_outcome(&pi_minus(), &proton(), 0.6, ProcessType::TwoToTwo, &[pi_zero(), neutron()], false);
        assert_eq!(action.angular_distribution(0.138), AngularDistribution::Isotropic);
    }

    #[test]
    fn isotropic_flag_overrides_every_channel() {
        let cases = [
            (ProcessType::Elastic, vec![proton(), neutron()], 0.938),
            (ProcessType::TwoToTwo, vec![delta_plus(), proton()], 1.232),
            (ProcessType::TwoToTwo, vec![n1440(), neutron()], 1.44),
        ];
        for (process, outgoing, mass) in cases {
            let action = two_body_outcome(&proton(), &neutron(), 1.5, process, &outgoing, true);
            assert_eq!(action.angular_distribution(mass), AngularDistribution::Isotropic);
        }
    }
}

// ── Action lifecycle ──────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    fn elastic_action(a: ParticleData, b: ParticleData, time: f64) -> Action {
        let mut s = ScatterAction::new(a, b, time, false);
        s.add_collision(ProcessBranch::new(ProcessType::Elastic, vec![proton(), proton()], 10.0));
        s.into()
    }

    #[test]
    fn perform_requires_validation() {
        let (mut store, a, b) = colliding_pair(&proton(), &proton(), 0.5);
        let mut action = elastic_action(a, b, 0.0);
        let mut rng = SimRng::new(1);
        let mut strings = NoStringProcess;
        let mut counters = InteractionCounters::default();
        let mut ctx = ActionContext { rng: &mut rng, string_process: &mut strings };
        let err = action.perform(&mut store, &mut counters, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            ActionError::InvalidState { expected: ActionState::Validated, found: ActionState::Proposed }
        ));
        assert_eq!(counters.interactions_total, 0);
    }

    #[test]
    fn perform_twice_fails() {
        let (mut store, a, b) = colliding_pair(&proton(), &proton(), 0.5);
        let mut action = elastic_action(a, b, 0.0);
        let mut rng = SimRng::new(1);
        execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();
        assert_eq!(action.state(), ActionState::Executed);

        let mut counters = InteractionCounters::default();
        let mut strings = NoStringProcess;
        let mut ctx = ActionContext { rng: &mut rng, string_process: &mut strings };
        let err = action.perform(&mut store, &mut counters, &mut ctx).unwrap_err();
        assert!(matches!(err, ActionError::InvalidState { found: ActionState::Executed, .. }));
        assert!(!action.validate(&store));
    }

    #[test]
    fn perform_replaces_and_stamps() {
        let (mut store, a, b) = colliding_pair(&proton(), &proton(), 0.5);
        let mut action = elastic_action(a.clone(), b.clone(), 0.0);
        let mut rng = SimRng::new(2);
        let counters = execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();

        assert_eq!(counters.interactions_total, 1);
        assert_eq!(store.len(), 2);
        assert!(!store.is_valid(&a));
        assert!(!store.is_valid(&b));
        for p in action.outgoing() {
            assert!(store.is_valid(p));
            assert_eq!(p.id_process(), ProcessId(1));
            assert!(p.id() != a.id() && p.id() != b.id());
        }
        assert_eq!(action.process_type(), ProcessType::Elastic);
        assert_eq!(action.partial_weight(), 10.0);
    }

    #[test]
    fn shared_particle_conflict() {
        let mut store = Particles::new();
        let p = proton();
        let a = store.insert(particle(&p, ThreeVector::new(0.0, 0.0, 0.4), ThreeVector::ZERO));
        let b = store.insert(particle(&p, ThreeVector::new(0.0, 0.0, -0.4), ThreeVector::ZERO));
        let c = store.insert(particle(&p, ThreeVector::new(0.3, 0.0, 0.0), ThreeVector::ZERO));

        let mut actions = [elastic_action(b.clone(), c, 0.2), elastic_action(a, b, 0.1)];
        actions.sort_by(Action::cmp_time);
        assert_eq!(actions[0].time(), 0.1);

        let mut rng = SimRng::new(3);
        execute(&mut actions[0], &mut store, &mut rng, &mut NoStringProcess).unwrap();
        assert!(!actions[1].is_valid(&store));
        assert!(!actions[1].validate(&store));
        assert_eq!(actions[1].state(), ActionState::Rejected);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn stable_sort_keeps_equal_times_in_order() {
        let (_, a, b) = colliding_pair(&proton(), &proton(), 0.5);
        let mut actions = vec![
            elastic_action(a.clone(), b.clone(), 0.3),
            Action::from(DecayAction::new(a.clone(), 0.1)),
            elastic_action(b, a, 0.1),
        ];
        actions.sort_by(Action::cmp_time);
        assert!(matches!(actions[0], Action::Decay(_)));
        assert!(matches!(actions[1], Action::Scatter(_)));
        assert_eq!(actions[2].time(), 0.3);
    }

    #[test]
    fn no_channels_is_an_error() {
        let (mut store, a, b) = colliding_pair(&proton(), &proton(), 0.5);
        let mut action: Action = ScatterAction::new(a, b, 0.0, false).into();
        let mut rng = SimRng::new(1);
        let err = execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap_err();
        assert!(matches!(err, ActionError::NoChannels));
        assert_eq!(store.len(), 2);
    }
}

// ── Scatter resolution ────────────────────────────────────────────────────────

#[cfg(test)]
mod scatter {
    use super::*;

    fn with_branch(a: ParticleData, b: ParticleData, time: f64, branch: ProcessBranch) -> Action {
        let mut s = ScatterAction::new(a, b, time, false);
        s.add_collision(branch);
        s.into()
    }

    #[test]
    fn elastic_conserves_four_momentum() {
        let mut rng = SimRng::new(2024);
        let mut store = Particles::new();
        let (p, n, pi) = (proton(), neutron(), pi_minus());
        let draw = |rng: &mut SimRng| {
            ThreeVector::new(rng.uniform(-2.0, 2.0), rng.uniform(-2.0, 2.0), rng.uniform(-2.0, 2.0))
        };

        for i in 0..10_000 {
            store.reset();
            let partner = match i % 3 {
                0 => &p,
                1 => &n,
                _ => &pi,
            };
            let pa = draw(&mut rng);
            let pb = draw(&mut rng);
            let xa = draw(&mut rng);
            let xb = draw(&mut rng);
            let a = store.insert(particle(&p, pa, xa));
            let b = store.insert(particle(partner, pb, xb));
            let before = a.momentum + b.momentum;

            let branch = ProcessBranch::new(
                ProcessType::Elastic,
                vec![Arc::clone(a.ptype()), Arc::clone(b.ptype())],
                1.0,
            );
            let mut action = with_branch(a, b, rng.uniform(0.0, 1.0), branch);
            execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();

            assert_eq!(action.outgoing().len(), 2);
            assert_close4(total(action.outgoing()), before, 1e-9);
            for out in action.outgoing() {
                assert!((out.effective_mass() - out.pole_mass()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn elastic_keeps_positions_and_species() {
        let (mut store, a, b) = colliding_pair(&proton(), &neutron(), 0.8);
        let mut action = with_branch(
            a.clone(),
            b.clone(),
            0.5,
            ProcessBranch::new(ProcessType::Elastic, vec![proton(), neutron()], 1.0),
        );
        let mut rng = SimRng::new(8);
        execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();
        let out = action.outgoing();
        assert_eq!(out[0].pdgcode(), a.pdgcode());
        assert_eq!(out[1].pdgcode(), b.pdgcode());
        assert_eq!(out[0].position, a.position);
        assert_eq!(out[1].position, b.position);
    }

    #[test]
    fn isotropic_flag_still_conserves() {
        let (mut store, a, b) = colliding_pair(&proton(), &proton(), 1.5);
        let before = a.momentum + b.momentum;
        let mut s = ScatterAction::new(a, b, 0.0, true);
        assert!(s.is_isotropic());
        s.add_collision(ProcessBranch::new(ProcessType::Elastic, vec![proton(), proton()], 1.0));
        let mut action: Action = s.into();
        let mut rng = SimRng::new(9);
        execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();
        assert_close4(total(action.outgoing()), before, 1e-9);
    }

    #[test]
    fn resonance_formation_with_two_products_fails() {
        let (mut store, a, b) = colliding_pair(&proton(), &pi_zero(), 0.3);
        let mut action = with_branch(
            a.clone(),
            b.clone(),
            0.0,
            ProcessBranch::new(ProcessType::TwoToOne, vec![proton(), pi_zero()], 1.0),
        );
        let mut rng = SimRng::new(1);
        let err = execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap_err();
        assert!(matches!(err, ActionError::InvalidResonanceFormation(_)));
        assert!(store.is_valid(&a));
        assert!(store.is_valid(&b));
    }

    #[test]
    fn resonance_formation_carries_total_momentum() {
        let mut store = Particles::new();
        let a = store.insert(particle(&proton(), ThreeVector::new(0.1, 0.0, 0.3), ThreeVector::new(-0.2, 0.0, 0.0)));
        let b = store.insert(particle(&pi_zero(), ThreeVector::new(0.0, 0.2, -0.1), ThreeVector::new(0.2, 0.0, 0.0)));
        let before = a.momentum + b.momentum;
        let time = 0.25;
        let expected_point = {
            let xa = a.position.threevec() + a.velocity() * time;
            let xb = b.position.threevec() + b.velocity() * time;
            (xa + xb) / 2.0
        };
        let mut action = with_branch(a, b, time, ProcessBranch::new(ProcessType::TwoToOne, vec![delta_plus()], 1.0));
        let mut rng = SimRng::new(1);
        execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();

        let out = &action.outgoing()[0];
        assert_close4(out.momentum, before, 1e-9);
        assert!((out.effective_mass() - before.abs()).abs() < 1e-9);
        assert_eq!(out.position.x0, time);
        assert!((out.position.threevec() - expected_point).abs() < 1e-12);
        assert_eq!(action.process_type(), ProcessType::TwoToOne);
        assert_eq!(out.formation_time(), time);
    }

    #[test]
    fn nucleon_delta_conserves_momentum() {
        let mut rng = SimRng::new(77);
        for _ in 0..200 {
            let (mut store, a, b) = colliding_pair(&proton(), &proton(), 2.0);
            let before = a.momentum + b.momentum;
            let branch = ProcessBranch::new(ProcessType::TwoToTwo, vec![delta_plusplus(), neutron()], 1.0);
            let mut action = with_branch(a, b, 0.0, branch);
            execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();
            let out = action.outgoing();
            assert_close4(total(out), before, 1e-9);
            assert!((out[0].effective_mass() - 1.232).abs() < 1e-9);
            assert!((out[1].effective_mass() - 0.938).abs() < 1e-9);
        }
    }

    #[test]
    fn nucleon_resonance_conserves_momentum() {
        let mut rng = SimRng::new(78);
        for _ in 0..200 {
            let (mut store, a, b) = colliding_pair(&proton(), &neutron(), 2.5);
            let before = a.momentum + b.momentum;
            let branch = ProcessBranch::new(ProcessType::TwoToTwo, vec![n1440(), neutron()], 1.0);
            let mut action = with_branch(a, b, 0.0, branch);
            execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();
            assert_close4(total(action.outgoing()), before, 1e-9);
        }
    }

    #[test]
    fn closed_two_to_two_channel() {
        let (mut store, a, b) = colliding_pair(&proton(), &proton(), 0.2);
        let branch = ProcessBranch::new(ProcessType::TwoToTwo, vec![delta_plusplus(), delta_plus()], 1.0);
        let mut action = with_branch(a, b, 0.0, branch);
        let mut rng = SimRng::new(1);
        let err = execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap_err();
        assert!(matches!(err, ActionError::BelowThreshold { .. }));
    }

    #[test]
    fn decay_tag_is_not_a_scatter() {
        let (mut store, a, b) = colliding_pair(&proton(), &proton(), 0.2);
        let branch = ProcessBranch::new(ProcessType::Decay, vec![proton(), proton()], 1.0);
        let mut action = with_branch(a, b, 0.0, branch);
        let mut rng = SimRng::new(1);
        let err = execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap_err();
        assert!(matches!(err, ActionError::InvalidScatterAction(_)));
    }

    #[test]
    fn transverse_distance_of_offset_head_on_pair() {
        let p = proton();
        let a = particle(&p, ThreeVector::new(0.0, 0.0, 1.0), ThreeVector::new(0.0, 0.0, -1.0));
        let b = particle(&p, ThreeVector::new(0.0, 0.0, -1.0), ThreeVector::new(0.5, 0.0, 1.0));
        let action = ScatterAction::new(a, b, 0.0, false);
        assert!((action.transverse_distance_sqr() - 0.25).abs() < 1e-12);
        assert!((action.cm_momentum() - 1.0).abs() < 1e-12);
    }
}

// ── Formation inheritance ─────────────────────────────────────────────────────

#[cfg(test)]
mod formation {
    use super::*;

    fn forming(ptype: &Arc<ParticleType>, begin: f64, form: f64, factor: f64) -> ParticleData {
        let mut p = particle(ptype, ThreeVector::ZERO, ThreeVector::ZERO);
        p.set_slow_formation_times(begin, form);
        p.set_cross_section_scaling_factor(factor);
        p
    }

    #[test]
    fn later_forming_particle_wins() {
        let a = forming(&proton(), 2.0, 5.0, 0.3);
        let b = forming(&pi_zero(), 1.0, 3.0, 0.7);
        let mut out = vec![ParticleData::new(delta_plus())];
        inherit_formation(&[a, b], 4.0, &mut out);
        assert_eq!(out[0].formation_time(), 5.0);
        assert_eq!(out[0].begin_formation_time(), 2.0);
        assert_eq!(out[0].initial_xsec_scaling_factor(), 0.3);
    }

    #[test]
    fn ties_pick_second_particle() {
        let a = forming(&proton(), 1.0, 6.0, 0.3);
        let b = forming(&pi_zero(), 2.0, 6.0, 0.7);
        let mut out = vec![ParticleData::new(delta_plus())];
        inherit_formation(&[a, b], 4.0, &mut out);
        assert_eq!(out[0].begin_formation_time(), 2.0);
        assert_eq!(out[0].initial_xsec_scaling_factor(), 0.7);
    }

    #[test]
    fn formed_inputs_form_at_execution() {
        let a = forming(&proton(), 0.0, 1.0, 0.3);
        let b = forming(&pi_zero(), 0.0, 2.0, 0.7);
        let mut out = vec![ParticleData::new(delta_plus())];
        out[0].position = FourVector::new(4.0, 0.0, 0.0, 0.0);
        inherit_formation(&[a, b], 4.0, &mut out);
        assert_eq!(out[0].formation_time(), 4.0);
        assert_eq!(out[0].begin_formation_time(), 4.0);
        assert_eq!(out[0].initial_xsec_scaling_factor(), 1.0);
    }

    #[test]
    fn resonance_inherits_through_action() {
        let mut store = Particles::new();
        let mut a = particle(&proton(), ThreeVector::new(0.0, 0.0, 0.3), ThreeVector::ZERO);
        a.set_slow_formation_times(2.0, 5.0);
        a.set_cross_section_scaling_factor(0.3);
        let mut b = particle(&pi_zero(), ThreeVector::new(0.0, 0.0, -0.3), ThreeVector::ZERO);
        b.set_slow_formation_times(1.0, 3.0);
        b.set_cross_section_scaling_factor(0.7);
        let a = store.insert(a);
        let b = store.insert(b);

        let mut s = ScatterAction::new(a, b, 4.0, false);
        s.add_collision(ProcessBranch::new(ProcessType::TwoToOne, vec![delta_plus()], 1.0));
        let mut action: Action = s.into();
        let mut rng = SimRng::new(1);
        execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();

        let out = &action.outgoing()[0];
        assert_eq!(out.formation_time(), 5.0);
        assert_eq!(out.begin_formation_time(), 2.0);
        assert_eq!(out.initial_xsec_scaling_factor(), 0.3);
        assert_eq!(out.xsec_scaling_factor(4.5), 0.3);
    }

    #[test]
    fn string_fragments_multiply_factors() {
        let a = forming(&proton(), 1.0, 8.0, 0.4);
        let b = forming(&proton(), 0.0, 0.0, 1.0);
        let mut out = vec![forming(&pi_zero(), 4.0, 6.0, 0.5), forming(&pi_zero(), 4.0, 9.0, 0.5)];
        inherit_string_formation(&[a, b], 4.0, &mut out);
        assert!((out[0].initial_xsec_scaling_factor() - 0.2).abs() < 1e-12);
        assert_eq!(out[0].formation_time(), 8.0);
        assert_eq!(out[0].begin_formation_time(), 4.0);
        // Already forms later than the incoming particle.
        assert_eq!(out[1].formation_time(), 9.0);
        assert_eq!(out[1].begin_formation_time(), 4.0);
    }

    #[test]
    fn formed_inputs_leave_fragments_alone() {
        let a = forming(&proton(), 0.0, 1.0, 0.4);
        let b = forming(&proton(), 0.0, 2.0, 0.6);
        let mut out = vec![forming(&pi_zero(), 4.0, 6.0, 0.5)];
        inherit_string_formation(&[a, b], 4.0, &mut out);
        assert_eq!(out[0].initial_xsec_scaling_factor(), 0.5);
        assert_eq!(out[0].formation_time(), 6.0);
    }
}

// ── String excitation ─────────────────────────────────────────────────────────

#[cfg(test)]
mod strings {
    use super::*;

    fn string_action(a: ParticleData, b: ParticleData, kind: StringProcessKind) -> Action {
        let mut s = ScatterAction::new(a, b, 1.0, false);
        s.add_collision(ProcessBranch::new(ProcessType::String(kind), Vec::new(), 1.0));
        s.into()
    }

    #[test]
    fn exhausted_retries_fall_back_to_elastic() {
        for kind in StringProcessKind::ALL {
            let (mut store, a, b) = colliding_pair(&proton(), &proton(), 1.0);
            let before = a.momentum + b.momentum;
            let mut action = string_action(a.clone(), b.clone(), kind);
            let mut session = ScriptedSession::failing();
            let mut rng = SimRng::new(5);
            execute(&mut action, &mut store, &mut rng, &mut session).unwrap();

            assert_eq!(session.inits, 1);
            assert_eq!(session.attempts, STRING_RETRY_LIMIT);
            assert_eq!(action.process_type(), ProcessType::Elastic);
            let out = action.outgoing();
            assert_eq!(out.len(), 2);
            assert_eq!(out[0].pdgcode(), a.pdgcode());
            assert_eq!(out[1].pdgcode(), b.pdgcode());
            assert_eq!(out[0].position, a.position);
            assert_eq!(out[1].position, b.position);
            assert_close4(total(out), before, 1e-9);
            assert_eq!(store.len(), 2);
        }
    }

    #[test]
    fn no_string_process_always_falls_back() {
        let (mut store, a, b) = colliding_pair(&proton(), &neutron(), 3.0);
        let mut action = string_action(a, b, StringProcessKind::Hard);
        let mut rng = SimRng::new(6);
        execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();
        assert_eq!(action.process_type(), ProcessType::Elastic);
    }

    #[test]
    fn success_adopts_fragments() {
        let (mut store, a, b) = colliding_pair(&proton(), &proton(), 1.0);
        let mut a = a;
        // Re-insert a still-forming projectile.
        store.remove(&a).unwrap();
        a.set_slow_formation_times(0.5, 8.0);
        a.set_cross_section_scaling_factor(0.4);
        let a = store.insert(a);

        let pion = pi_zero();
        let mut f1 = particle(&pion, ThreeVector::new(0.0, 0.0, 0.7), ThreeVector::ZERO);
        let mut f2 = particle(&pion, ThreeVector::new(0.0, 0.0, -0.7), ThreeVector::ZERO);
        for f in [&mut f1, &mut f2] {
            f.set_slow_formation_times(1.0, 6.0);
            f.set_cross_section_scaling_factor(0.5);
        }
        let mut session = ScriptedSession {
            inits:      0,
            attempts:   0,
            succeed_on: Some(3),
            fragments:  vec![f1.clone(), f2],
        };

        let mut action = string_action(a, b, StringProcessKind::SoftNonDiffractive);
        let mut rng = SimRng::new(7);
        execute(&mut action, &mut store, &mut rng, &mut session).unwrap();

        assert_eq!(session.attempts, 3);
        assert_eq!(
            action.process_type(),
            ProcessType::String(StringProcessKind::SoftNonDiffractive)
        );
        let out = action.outgoing();
        assert_eq!(out.len(), 2);
        assert_eq!(store.len(), 2);
        for frag in out {
            assert!((frag.initial_xsec_scaling_factor() - 0.2).abs() < 1e-12);
            assert_eq!(frag.formation_time(), 8.0);
            assert_eq!(frag.begin_formation_time(), 1.0);
            assert_eq!(frag.position.x0, 1.0);
        }
        // Symmetric pair: the CM frame is the computational frame.
        assert_close4(out[0].momentum, f1.momentum, 1e-12);
    }
}

// ── Decays ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod decay {
    use super::*;

    fn delta_decay(parent: ParticleData, time: f64) -> Action {
        let mut d = DecayAction::new(parent, time);
        d.add_decays([
            ProcessBranch::new(ProcessType::Decay, vec![proton(), pi_zero()], 0.078),
            ProcessBranch::new(ProcessType::Decay, vec![neutron(), species("π⁺", 0.138, 0.0, 211, 2)], 0.039),
        ]);
        d.into()
    }

    #[test]
    fn two_body_decay_conserves_momentum() {
        let mut rng = SimRng::new(10);
        for i in 0..500 {
            let mut store = Particles::new();
            let p3 = ThreeVector::new(0.001 * i as f64, -0.2, 0.5);
            let parent = store.insert(particle(&delta_plus(), p3, ThreeVector::new(1.0, 0.0, 0.0)));
            let before = parent.momentum;
            let mut action = delta_decay(parent.clone(), 2.0);
            execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();

            let out = action.outgoing();
            assert_eq!(out.len(), 2);
            assert_close4(total(out), before, 1e-9);
            assert_eq!(action.process_type(), ProcessType::Decay);
            assert!(!store.is_valid(&parent));

            let origin = parent.position.threevec() + parent.velocity() * 2.0;
            for product in out {
                assert_eq!(product.position.x0, 2.0);
                assert!((product.position.threevec() - origin).abs() < 1e-12);
                assert_eq!(product.formation_time(), 2.0);
            }
        }
    }

    #[test]
    fn forming_parent_passes_formation_on() {
        let mut store = Particles::new();
        let mut parent = particle(&delta_plus(), ThreeVector::ZERO, ThreeVector::ZERO);
        parent.set_slow_formation_times(0.5, 3.0);
        parent.set_cross_section_scaling_factor(0.25);
        let parent = store.insert(parent);
        let mut action = delta_decay(parent, 1.0);
        let mut rng = SimRng::new(11);
        execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap();
        for product in action.outgoing() {
            assert_eq!(product.formation_time(), 3.0);
            assert_eq!(product.begin_formation_time(), 0.5);
            assert_eq!(product.initial_xsec_scaling_factor(), 0.25);
        }
    }

    #[test]
    fn three_body_decay_is_unsupported() {
        let mut store = Particles::new();
        let parent = store.insert(particle(&n1440(), ThreeVector::ZERO, ThreeVector::ZERO));
        let mut d = DecayAction::new(parent, 0.0);
        d.add_decay(ProcessBranch::new(ProcessType::Decay, vec![proton(), pi_zero(), pi_zero()], 0.1));
        let mut action: Action = d.into();
        let mut rng = SimRng::new(12);
        let err = execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap_err();
        assert!(matches!(err, ActionError::UnsupportedDecay(3)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn light_parent_is_below_threshold() {
        let mut store = Particles::new();
        let mut light = particle(&delta_plus(), ThreeVector::ZERO, ThreeVector::ZERO);
        light.set_4momentum(1.0, ThreeVector::ZERO);
        let parent = store.insert(light);
        let mut action = delta_decay(parent, 0.0);
        let mut rng = SimRng::new(13);
        let err = execute(&mut action, &mut store, &mut rng, &mut NoStringProcess).unwrap_err();
        assert!(matches!(err, ActionError::BelowThreshold { .. }));
    }
}
