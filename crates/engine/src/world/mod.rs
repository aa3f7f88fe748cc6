pub mod block;
pub mod grid;
pub mod position;

use block::BlockId;
use grid::{Dimensions, Grid};
use position::{BlockPos, CellIndex};

/// Rejected world shapes.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("world dimensions must be non-zero (got {width}x{height}x{length})")]
    Empty { width: u16, height: u16, length: u16 },
    #[error("world volume {0} exceeds the addressable cell range")]
    TooLarge(u64),
}

/// One loaded world's voxels: the grid accessor the physics engine reads
/// and writes.
///
/// Owned by exactly one tick loop. External actors never touch it directly;
/// they go through the scheduler's inbox, which applies their writes on the
/// tick thread.
pub struct World {
    grid: Grid,
    /// Writes applied since the last `take_changes`, in application order.
    changes: Vec<(CellIndex, BlockId)>,
}

impl World {
    pub fn new(dims: Dimensions) -> Result<Self, GridError> {
        Ok(Self {
            grid: Grid::new_empty(dims)?,
            changes: Vec::new(),
        })
    }

    pub fn dims(&self) -> Dimensions {
        self.grid.dims()
    }

    /// Read a block. `None` is the explicit "invalid" sentinel for indices
    /// outside this world.
    pub fn get_block(&self, index: CellIndex) -> Option<BlockId> {
        self.grid.get(index)
    }

    pub fn get_block_at(&self, pos: BlockPos) -> Option<BlockId> {
        self.index_of(pos).and_then(|i| self.grid.get(i))
    }

    /// Write a block and record the change. Returns the previous block, or
    /// `None` if the index is out of range (nothing is written).
    pub fn set_block(&mut self, index: CellIndex, block: BlockId) -> Option<BlockId> {
        let old = self.grid.set(index, block)?;
        if old != block {
            self.changes.push((index, block));
        }
        Some(old)
    }

    pub fn set_block_at(&mut self, pos: BlockPos, block: BlockId) -> Option<BlockId> {
        let index = self.index_of(pos)?;
        self.set_block(index, block)
    }

    /// Fill the inclusive box `min..=max` (clamped to the world) without
    /// recording changes. Used for terrain generation and test fixtures.
    pub fn fill(&mut self, min: BlockPos, max: BlockPos, block: BlockId) {
        for y in min.y.max(0)..=max.y {
            for z in min.z.max(0)..=max.z {
                for x in min.x.max(0)..=max.x {
                    if let Some(i) = self.index_of(BlockPos::new(x, y, z)) {
                        self.grid.set(i, block);
                    }
                }
            }
        }
    }

    pub fn index_of(&self, pos: BlockPos) -> Option<CellIndex> {
        self.grid.dims().index_of(pos)
    }

    pub fn pos_of(&self, index: CellIndex) -> BlockPos {
        self.grid.dims().pos_of(index)
    }

    pub fn offset(&self, index: CellIndex, dx: i32, dy: i32, dz: i32) -> Option<CellIndex> {
        self.grid.dims().offset(index, dx, dy, dz)
    }

    /// In-bounds cardinal neighbours of `index`.
    pub fn neighbors(&self, index: CellIndex) -> impl Iterator<Item = CellIndex> + '_ {
        self.pos_of(index)
            .neighbors()
            .into_iter()
            .filter_map(|p| self.index_of(p))
    }

    /// Number of cells whose block satisfies `pred`.
    pub fn count(&self, pred: impl FnMut(BlockId) -> bool) -> usize {
        self.grid.count(pred)
    }

    /// Drain and return all writes applied since the last call.
    pub fn take_changes(&mut self) -> Vec<(CellIndex, BlockId)> {
        std::mem::take(&mut self.changes)
    }

    /// Number of writes waiting to be taken.
    pub fn pending_change_count(&self) -> usize {
        self.changes.len()
    }
}
