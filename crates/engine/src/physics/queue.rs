use std::collections::VecDeque;

use crossbeam::queue::SegQueue;
use rustc_hash::FxHashMap;

use super::check::{Check, CheckData, PhysicsArgs};
use crate::world::block::BlockId;
use crate::world::position::CellIndex;

/// The tick-drained collection of pending checks for one world.
///
/// Order is FIFO over cells. At most one check is outstanding per cell:
/// scheduling a cell that already has one is a no-op (or, with
/// [`CheckQueue::push_or_replace`], overwrites its state), so duplicate
/// requests are harmless.
#[derive(Default)]
pub struct CheckQueue {
    order: VecDeque<CellIndex>,
    outstanding: FxHashMap<CellIndex, CheckData>,
}

impl CheckQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `check` unless its cell already has an outstanding check.
    /// Returns whether it was added.
    pub fn push(&mut self, check: Check) -> bool {
        if self.outstanding.contains_key(&check.index) {
            return false;
        }
        self.outstanding.insert(check.index, check.data);
        self.order.push_back(check.index);
        true
    }

    /// Enqueue `check`, or overwrite the state of the cell's outstanding
    /// check while keeping its queue position.
    pub fn push_or_replace(&mut self, check: Check) {
        if self.outstanding.insert(check.index, check.data).is_none() {
            self.order.push_back(check.index);
        }
    }

    /// Remove up to `n` checks from the front. The cells stay outstanding
    /// until they are [`retire`](Self::retire)d or
    /// [`requeue`](Self::requeue)d, so concurrent scheduling of the same
    /// cells is still deduplicated.
    pub fn take_front(&mut self, n: usize) -> Vec<Check> {
        let n = n.min(self.order.len());
        self.order
            .drain(..n)
            .filter_map(|index| {
                self.outstanding
                    .get(&index)
                    .map(|data| Check::with_data(index, *data))
            })
            .collect()
    }

    /// Put a taken check back at the tail with its updated state.
    pub fn requeue(&mut self, check: Check) {
        self.outstanding.insert(check.index, check.data);
        self.order.push_back(check.index);
    }

    /// Forget a taken check.
    pub fn retire(&mut self, index: CellIndex) {
        self.outstanding.remove(&index);
    }

    /// Drop up to `n` of the oldest checks without evaluating them.
    pub fn shed(&mut self, n: usize) -> usize {
        let taken = self.take_front(n);
        for check in &taken {
            self.retire(check.index);
        }
        taken.len()
    }

    pub fn contains(&self, index: CellIndex) -> bool {
        self.outstanding.contains_key(&index)
    }

    pub fn get(&self, index: CellIndex) -> Option<CheckData> {
        self.outstanding.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.outstanding.clear();
    }

    /// Cells in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.order.iter().copied()
    }
}

/// Something an external actor wants the tick thread to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Schedule a check for a cell.
    Check(CellIndex),
    /// Write a block (player action, game-mode logic) and react to it.
    SetBlock {
        index: CellIndex,
        block: BlockId,
        args: Option<PhysicsArgs>,
    },
    /// Stop dispatching checks until resumed. The queue is kept.
    Suspend,
    /// Leave the suspended or overloaded state.
    Resume,
}

/// Lock-free multi-producer append queue feeding one world's tick thread.
///
/// Any thread may `submit`; only the tick thread drains.
#[derive(Default)]
pub struct Inbox {
    requests: SegQueue<Request>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self, request: Request) {
        self.requests.push(request);
    }

    pub fn schedule_check(&self, index: CellIndex) {
        self.submit(Request::Check(index));
    }

    pub fn schedule_check_batch(&self, indices: impl IntoIterator<Item = CellIndex>) {
        for index in indices {
            self.submit(Request::Check(index));
        }
    }

    pub fn set_block(&self, index: CellIndex, block: BlockId) {
        self.submit(Request::SetBlock {
            index,
            block,
            args: None,
        });
    }

    /// Take every request submitted so far, in submission order.
    pub fn drain(&self) -> Vec<Request> {
        let mut out = Vec::with_capacity(self.requests.len());
        while let Some(request) = self.requests.pop() {
            out.push(request);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
