//! The string-fragmentation session interface.
//!
//! Real implementations wrap an external event generator.  A session is
//! initialized once per collision and then asked repeatedly to produce a
//! final state for one sub-process; each call either succeeds or fails.

use mt_particles::ParticleData;

use crate::StringProcessKind;

/// Attempts per collision before the scatter falls back to elastic.
pub const STRING_RETRY_LIMIT: usize = 10_000;

/// A mutable string-fragmentation session.
///
/// After a `next_*` call returns `true`, [`final_state`](Self::final_state)
/// yields the fragments with momenta in the collision CM frame.
pub trait StringProcess {
    /// Prepare for one collision of `incoming` at `time`.
    fn init(&mut self, incoming: &[ParticleData], time: f64);

    /// Single diffractive: `A + X` when `is_ax`, else `X + B`.
    fn next_sdiff(&mut self, is_ax: bool) -> bool;

    fn next_ddiff(&mut self) -> bool;

    fn next_ndiff_soft(&mut self) -> bool;

    fn next_bbbar_ann(&mut self) -> bool;

    fn next_ndiff_hard(&mut self) -> bool;

    fn final_state(&mut self) -> Vec<ParticleData>;

    /// One attempt at `kind`.
    fn attempt(&mut self, kind: StringProcessKind) -> bool {
        match kind {
            StringProcessKind::SoftSingleDiffractiveAX => self.next_sdiff(true),
            StringProcessKind::SoftSingleDiffractiveXB => self.next_sdiff(false),
            StringProcessKind::SoftDoubleDiffractive   => self.next_ddiff(),
            StringProcessKind::SoftNonDiffractive      => self.next_ndiff_soft(),
            StringProcessKind::SoftAnnihilation        => self.next_bbbar_ann(),
            StringProcessKind::Hard                    => self.next_ndiff_hard(),
        }
    }
}

/// A session that never succeeds.  String branches then always degrade to
/// elastic scattering.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStringProcess;

impl StringProcess for NoStringProcess {
    fn init(&mut self, _incoming: &[ParticleData], _time: f64) {}

    fn next_sdiff(&mut self, _is_ax: bool) -> bool {
        false
    }

    fn next_ddiff(&mut self) -> bool {
        false
    }

    fn next_ndiff_soft(&mut self) -> bool {
        false
    }

    fn next_bbbar_ann(&mut self) -> bool {
        false
    }

    fn next_ndiff_hard(&mut self) -> bool {
        false
    }

    fn final_state(&mut self) -> Vec<ParticleData> {
        Vec::new()
    }
}
