//! Formation-time inheritance from incoming to outgoing particles.
//!
//! Products of an interaction that involved a still-forming particle keep
//! forming on the same schedule: they adopt the latest incoming formation
//! time, the formation start of that same particle, and its cross-section
//! scaling factor.  When every incoming particle is already formed, the
//! products are formed at the execution time.

use mt_particles::ParticleData;

/// Index of the incoming particle that forms last.  Ties pick the later one.
fn latest_forming(incoming: &[ParticleData]) -> Option<usize> {
    (0..incoming.len()).reduce(|best, i| {
        if incoming[best].formation_time() > incoming[i].formation_time() { best } else { i }
    })
}

/// Apply the inheritance rule for resonance formation, 2 → 2 and decays.
///
/// Outgoing positions must already be final: a formed product's formation
/// interval starts at its position time.
pub fn inherit_formation(incoming: &[ParticleData], time: f64, outgoing: &mut [ParticleData]) {
    let Some(idx) = latest_forming(incoming) else {
        return;
    };
    let latest = &incoming[idx];
    if latest.formation_time() > time {
        for p in outgoing.iter_mut() {
            p.set_slow_formation_times(latest.begin_formation_time(), latest.formation_time());
            p.set_cross_section_scaling_factor(latest.initial_xsec_scaling_factor());
        }
    } else {
        for p in outgoing.iter_mut() {
            p.set_formation_time(time);
        }
    }
}

/// Apply the inheritance rule to string fragments.
///
/// Fragments are partially formed themselves, so scaling factors multiply;
/// a fragment that would form before the incoming particle does is held
/// back until then.
pub fn inherit_string_formation(incoming: &[ParticleData], time: f64, outgoing: &mut [ParticleData]) {
    let Some(idx) = latest_forming(incoming) else {
        return;
    };
    let tform_in = incoming[idx].formation_time();
    if tform_in <= time {
        return;
    }
    let factor_in = incoming[idx].initial_xsec_scaling_factor();
    for p in outgoing.iter_mut() {
        p.set_cross_section_scaling_factor(factor_in * p.initial_xsec_scaling_factor());
        if tform_in > p.formation_time() {
            p.set_slow_formation_times(time, tform_in);
        }
    }
}
