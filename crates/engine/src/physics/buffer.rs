use rustc_hash::FxHashSet;

use super::check::PhysicsArgs;
use crate::world::block::BlockId;
use crate::world::position::CellIndex;

/// A block write produced during dispatch, applied when the buffer is flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingUpdate {
    pub index: CellIndex,
    pub block: BlockId,
    pub args: Option<PhysicsArgs>,
}

/// Staging area for one tick's writes.
///
/// Nothing staged here is visible through the world until the scheduler
/// flushes, so every resolver in a tick reads the same grid. The first
/// write staged for a cell wins; later writes to that cell in the same tick
/// are dropped.
#[derive(Default)]
pub struct UpdateBuffer {
    updates: Vec<PendingUpdate>,
    claimed: FxHashSet<CellIndex>,
}

impl UpdateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a write. Returns `false` if the cell was already claimed.
    pub fn push(&mut self, update: PendingUpdate) -> bool {
        if !self.claimed.insert(update.index) {
            return false;
        }
        self.updates.push(update);
        true
    }

    pub fn is_claimed(&self, index: CellIndex) -> bool {
        self.claimed.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Discard everything staged after the first `len` writes.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.updates.len() {
            return;
        }
        for update in self.updates.drain(len..) {
            self.claimed.remove(&update.index);
        }
    }

    /// Take all staged writes in staging order and reset the buffer.
    pub fn take(&mut self) -> Vec<PendingUpdate> {
        self.claimed.clear();
        std::mem::take(&mut self.updates)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingUpdate> {
        self.updates.iter()
    }
}
