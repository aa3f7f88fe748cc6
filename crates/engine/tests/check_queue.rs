//! Check queue, update buffer and inbox mechanics, without any scheduler.

use std::sync::Arc;

use voxflow_engine::physics::buffer::{PendingUpdate, UpdateBuffer};
use voxflow_engine::physics::check::{Check, CheckData, PhysicsArgs};
use voxflow_engine::physics::queue::{CheckQueue, Inbox, Request};
use voxflow_engine::world::block::BlockId;
use voxflow_engine::world::position::CellIndex;

fn cell(i: u32) -> CellIndex {
    CellIndex(i)
}

// ---------------------------------------------------------------------------
// CheckQueue
// ---------------------------------------------------------------------------

#[test]
fn queue_is_fifo_over_cells() {
    let mut q = CheckQueue::new();
    for i in [5, 1, 9, 3] {
        assert!(q.push(Check::new(cell(i))));
    }
    let order: Vec<u32> = q.take_front(10).iter().map(|c| c.index.0).collect();
    assert_eq!(order, [5, 1, 9, 3]);
}

#[test]
fn queue_keeps_one_check_per_cell() {
    let mut q = CheckQueue::new();
    assert!(q.push(Check::with_data(cell(7), CheckData::new(3))));
    assert!(!q.push(Check::with_data(cell(7), CheckData::new(9))));
    assert_eq!(q.len(), 1);
    assert_eq!(q.get(cell(7)).map(|d| d.value), Some(3));
}

#[test]
fn push_or_replace_overwrites_state_in_place() {
    let mut q = CheckQueue::new();
    q.push(Check::new(cell(1)));
    q.push(Check::with_data(cell(2), CheckData::new(4)));
    q.push_or_replace(Check::with_data(cell(2), CheckData::new(0)));
    q.push_or_replace(Check::new(cell(3)));

    assert_eq!(q.iter().map(|c| c.0).collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(q.get(cell(2)).map(|d| d.value), Some(0));
}

#[test]
fn taken_cells_stay_deduplicated_until_retired() {
    let mut q = CheckQueue::new();
    q.push(Check::new(cell(1)));
    let taken = q.take_front(1);
    assert!(q.is_empty());
    assert!(!q.push(Check::new(cell(1))), "cell is still outstanding");

    q.retire(taken[0].index);
    assert!(q.push(Check::new(cell(1))));
}

#[test]
fn requeue_goes_to_the_tail_with_new_state() {
    let mut q = CheckQueue::new();
    q.push(Check::new(cell(1)));
    q.push(Check::new(cell(2)));
    let mut first = q.take_front(1).remove(0);
    first.data.value = 12;
    q.requeue(first);

    assert_eq!(q.iter().map(|c| c.0).collect::<Vec<_>>(), [2, 1]);
    assert_eq!(q.get(cell(1)).map(|d| d.value), Some(12));
}

#[test]
fn shed_drops_oldest_first() {
    let mut q = CheckQueue::new();
    for i in 0..10 {
        q.push(Check::new(cell(i)));
    }
    assert_eq!(q.shed(4), 4);
    assert_eq!(q.len(), 6);
    assert!(!q.contains(cell(3)));
    assert!(q.contains(cell(4)));
    assert_eq!(q.shed(100), 6);
    assert!(q.is_empty());
}

// ---------------------------------------------------------------------------
// CheckData
// ---------------------------------------------------------------------------

#[test]
fn check_data_from_args() {
    assert!(CheckData::from_args(Some(PhysicsArgs::Wait)).wait);
    assert_eq!(
        CheckData::from_args(Some(PhysicsArgs::Dissipate { chance: 30 })).dissipate,
        Some(30)
    );
    assert_eq!(CheckData::from_args(None), CheckData::default());

    let mut data = CheckData::new(5);
    assert!(!data.is_retired());
    data.retire();
    assert!(data.is_retired());
}

// ---------------------------------------------------------------------------
// UpdateBuffer
// ---------------------------------------------------------------------------

fn update(i: u32, block: u8) -> PendingUpdate {
    PendingUpdate {
        index: cell(i),
        block: BlockId(block),
        args: None,
    }
}

#[test]
fn first_writer_claims_the_cell() {
    let mut buf = UpdateBuffer::new();
    assert!(buf.push(update(4, 1)));
    assert!(!buf.push(update(4, 2)));
    assert!(buf.push(update(5, 2)));
    assert!(buf.is_claimed(cell(4)));

    let staged = buf.take();
    assert_eq!(staged.len(), 2);
    assert_eq!(staged[0].block, BlockId(1));
    assert!(buf.is_empty());
    assert!(!buf.is_claimed(cell(4)));
}

#[test]
fn truncate_releases_claims() {
    let mut buf = UpdateBuffer::new();
    buf.push(update(1, 1));
    buf.push(update(2, 1));
    buf.push(update(3, 1));
    buf.truncate(1);
    assert_eq!(buf.len(), 1);
    assert!(buf.is_claimed(cell(1)));
    assert!(!buf.is_claimed(cell(3)));
    assert!(buf.push(update(3, 2)));
}

// ---------------------------------------------------------------------------
// Inbox
// ---------------------------------------------------------------------------

#[test]
fn inbox_accepts_requests_from_many_threads() {
    let inbox = Arc::new(Inbox::new());
    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let inbox = Arc::clone(&inbox);
            std::thread::spawn(move || {
                for i in 0..100 {
                    inbox.schedule_check(cell(t * 100 + i));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let drained = inbox.drain();
    assert_eq!(drained.len(), 400);
    assert!(drained.iter().all(|r| matches!(r, Request::Check(_))));
    assert!(inbox.is_empty());
}

#[test]
fn inbox_preserves_submission_order() {
    let inbox = Inbox::new();
    inbox.set_block(cell(1), BlockId(3));
    inbox.submit(Request::Suspend);
    inbox.schedule_check(cell(2));
    assert_eq!(
        inbox.drain(),
        vec![
            Request::SetBlock {
                index: cell(1),
                block: BlockId(3),
                args: None
            },
            Request::Suspend,
            Request::Check(cell(2)),
        ]
    );
}
