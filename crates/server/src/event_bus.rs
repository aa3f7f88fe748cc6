//! Broadcast of applied block changes.
//!
//! After every tick the runner drains the level's change log and publishes
//! it as one [`WorldChangeBatch`] on a shared `tokio::sync::broadcast`
//! channel, so that client sync or recording can follow the simulation
//! without touching the grid.

use std::sync::Arc;

use voxflow_engine::world::World;
use voxflow_engine::world::block::BlockId;
use voxflow_engine::world::position::BlockPos;

/// 256 batches in flight absorb bursty floods without lagging receivers.
pub const BUS_CAPACITY: usize = 256;

/// All block changes one level applied in one tick.
///
/// `Arc<[...]>` keeps per-subscriber clones to a refcount bump.
#[derive(Clone, Debug)]
pub struct WorldChangeBatch {
    pub level: Arc<str>,
    pub tick: u64,
    pub changes: Arc<[(BlockPos, BlockId)]>,
}

/// Drain the world's change log into `(position, new_block)` pairs, in the
/// order the writes were applied.
pub fn collect_block_changes(world: &mut World) -> Vec<(BlockPos, BlockId)> {
    world
        .take_changes()
        .into_iter()
        .map(|(index, block)| (world.pos_of(index), block))
        .collect()
}
