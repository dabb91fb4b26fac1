//! The particle store: a growable slot arena with hole reuse.
//!
//! # Layout
//!
//! ```text
//!  slot:   0     1     2     3     4
//!        [ p0 ][hole][ p2 ][hole][ p4 ]      holes = {1, 3}
//! ```
//!
//! Removing a particle marks its slot as a hole; nothing else moves, so
//! every other handle keeps pointing at the right record.  Inserting fills
//! the lowest hole first and only appends when none is left.  Trailing holes
//! are trimmed so the last slot is always live.
//!
//! Handles are checked lazily: a snapshot is valid iff its slot still holds a
//! live record with the same `(ParticleId, ProcessId)` token.  A reused slot
//! always carries a fresh `ParticleId`, so stale handles can never match.

use std::collections::BTreeSet;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use mt_core::{ParticleId, ParticleType, SlotIndex};

use crate::{ParticleData, ParticleError, ParticleResult};

/// Slots reserved by [`Particles::new`].
pub const INITIAL_CAPACITY: usize = 100;

/// Capacity multiplier when the arena runs out of room.
const GROWTH_FACTOR: usize = 2;

// ── Particles ─────────────────────────────────────────────────────────────────

/// Owner of every live particle record in an event.
///
/// Deliberately not `Clone`: the population is never duplicated, only
/// individual records are copied out as handles.
pub struct Particles {
    data:     Vec<ParticleData>,
    holes:    BTreeSet<u32>,
    next_id:  u32,
    capacity: usize,
}

impl Default for Particles {
    fn default() -> Self {
        Self::new()
    }
}

impl Particles {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            holes: BTreeSet::new(),
            next_id: 0,
            capacity,
        }
    }

    /// Number of live particles (holes excluded).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - self.holes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserved slot count.  Doubles (at least) when exhausted.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Highest identity handed out so far, `None` before the first insert.
    pub fn id_max(&self) -> Option<ParticleId> {
        self.next_id.checked_sub(1).map(ParticleId)
    }

    /// Time component of the first live particle's position.
    pub fn time(&self) -> Option<f64> {
        self.front().map(|p| p.position.x0)
    }

    /// Remove everything.  Identities keep counting up, so handles taken
    /// before the reset never match a later particle.
    pub fn reset(&mut self) {
        self.data.clear();
        self.holes.clear();
    }

    // ── Insertion ─────────────────────────────────────────────────────────

    /// Insert a copy of `record` as a new particle and return its handle.
    ///
    /// The record's identity and slot are overwritten; everything else,
    /// including the creating `ProcessId`, is kept.
    pub fn insert(&mut self, record: ParticleData) -> ParticleData {
        self.ensure_capacity(1);
        self.place(record)
    }

    /// Insert `n` particles of `ptype` at rest at the origin.
    pub fn create(&mut self, n: usize, ptype: &Arc<ParticleType>) {
        self.ensure_capacity(n);
        for _ in 0..n {
            self.place(ParticleData::new(Arc::clone(ptype)));
        }
    }

    /// Insert one particle of `ptype` at rest and return its handle.
    pub fn create_one(&mut self, ptype: &Arc<ParticleType>) -> ParticleData {
        self.insert(ParticleData::new(Arc::clone(ptype)))
    }

    /// Grow the reservation so `to_add` inserts fit without reallocating.
    fn ensure_capacity(&mut self, to_add: usize) {
        let needed = self.data.len() + to_add.saturating_sub(self.holes.len());
        if needed > self.capacity {
            let new_capacity = (self.capacity * GROWTH_FACTOR).max(needed);
            self.data.reserve_exact(new_capacity - self.data.len());
            self.capacity = new_capacity;
        }
    }

    /// Assign the next identity and write into the lowest hole (or append).
    fn place(&mut self, mut record: ParticleData) -> ParticleData {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        let slot = self.holes.pop_first().unwrap_or(self.data.len() as u32);
        record.assign(id, SlotIndex(slot));
        match self.data.get_mut(slot as usize) {
            Some(existing) => *existing = record.clone(),
            None => self.data.push(record.clone()),
        }
        record
    }

    // ── Validity & removal ────────────────────────────────────────────────

    /// `true` iff `handle`'s slot still holds the same live particle.
    #[inline]
    pub fn is_valid(&self, handle: &ParticleData) -> bool {
        self.data
            .get(handle.slot().index())
            .is_some_and(|p| !p.hole && p.token() == handle.token())
    }

    fn check(&self, handle: &ParticleData) -> ParticleResult<()> {
        if self.is_valid(handle) {
            Ok(())
        } else {
            Err(ParticleError::InvalidHandle { id: handle.id(), slot: handle.slot() })
        }
    }

    /// Remove the particle behind `handle`.
    ///
    /// # Errors
    ///
    /// [`ParticleError::InvalidHandle`] unless the handle is currently valid.
    pub fn remove(&mut self, handle: &ParticleData) -> ParticleResult<()> {
        self.check(handle)?;
        self.release(handle.slot());
        Ok(())
    }

    fn release(&mut self, slot: SlotIndex) {
        self.data[slot.index()].hole = true;
        self.holes.insert(slot.0);
        while self.data.last().is_some_and(|p| p.hole) {
            self.data.pop();
            self.holes.remove(&(self.data.len() as u32));
        }
    }

    /// Remove every particle in `to_remove`, then insert every record in
    /// `to_add`.  Returns the handles of the inserted particles in order.
    ///
    /// All handles are checked first; on error the store is unchanged.
    pub fn replace(
        &mut self,
        to_remove: &[ParticleData],
        to_add:    Vec<ParticleData>,
    ) -> ParticleResult<Vec<ParticleData>> {
        let mut seen = BTreeSet::new();
        for handle in to_remove {
            self.check(handle)?;
            if !seen.insert(handle.slot()) {
                return Err(ParticleError::InvalidHandle { id: handle.id(), slot: handle.slot() });
            }
        }
        for handle in to_remove {
            self.release(handle.slot());
        }
        self.ensure_capacity(to_add.len());
        Ok(to_add.into_iter().map(|record| self.place(record)).collect())
    }

    // ── Access ────────────────────────────────────────────────────────────

    /// The live record in `slot`, if any.
    pub fn get(&self, slot: SlotIndex) -> Option<&ParticleData> {
        self.data.get(slot.index()).filter(|p| !p.hole)
    }

    pub fn front(&self) -> Option<&ParticleData> {
        self.iter().next()
    }

    pub fn back(&self) -> Option<&ParticleData> {
        self.iter().next_back()
    }

    /// Snapshot of every live particle in slot order.
    pub fn copy_to_vec(&self) -> Vec<ParticleData> {
        if self.holes.is_empty() {
            return self.data.clone();
        }
        self.iter().cloned().collect()
    }

    /// Live records in slot order.  Restartable and double-ended.
    pub fn iter(&self) -> Iter<'_> {
        Iter { inner: self.data.iter() }
    }

    /// Mutable access to live records for propagation-style updates.
    ///
    /// Identity fields have no public setters; `set_id_process` must not be
    /// called on records reached this way, or existing handles go stale.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut ParticleData> + '_ {
        self.data.iter_mut().filter(|p| !p.hole)
    }

    /// Parallel counterpart of [`iter_mut`](Self::iter_mut).
    #[cfg(feature = "parallel")]
    pub fn par_iter_mut(
        &mut self,
    ) -> impl rayon::iter::ParallelIterator<Item = &mut ParticleData> + '_ {
        use rayon::prelude::*;
        self.data.par_iter_mut().filter(|p| !p.hole)
    }
}

impl<'a> IntoIterator for &'a Particles {
    type Item = &'a ParticleData;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl fmt::Display for Particles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} particles:", self.len())?;
        for p in self {
            writeln!(f, "  {p}")?;
        }
        Ok(())
    }
}

// ── Iter ──────────────────────────────────────────────────────────────────────

/// Iterator over live records, skipping holes from either end.
#[derive(Clone)]
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, ParticleData>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ParticleData;

    fn next(&mut self) -> Option<&'a ParticleData> {
        self.inner.find(|p| !p.hole)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.rfind(|p| !p.hole)
    }
}

impl FusedIterator for Iter<'_> {}
