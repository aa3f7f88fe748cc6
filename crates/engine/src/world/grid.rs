use super::block::BlockId;
use super::position::{BlockPos, CellIndex};
use super::GridError;

/// Extent of a world along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
    pub length: u16,
}

impl Dimensions {
    pub const fn new(width: u16, height: u16, length: u16) -> Self {
        Self {
            width,
            height,
            length,
        }
    }

    pub const fn volume(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.length as u64
    }

    pub const fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && pos.x < self.width as i32
            && pos.y < self.height as i32
            && pos.z < self.length as i32
    }

    /// Flattened index in YZX order: horizontal layers are contiguous, which
    /// keeps the downward scans of falling blocks a fixed stride apart.
    pub fn index_of(&self, pos: BlockPos) -> Option<CellIndex> {
        if !self.contains(pos) {
            return None;
        }
        let (w, l) = (self.width as u32, self.length as u32);
        Some(CellIndex(
            (pos.y as u32 * l + pos.z as u32) * w + pos.x as u32,
        ))
    }

    pub fn pos_of(&self, index: CellIndex) -> BlockPos {
        let (w, l) = (self.width as u32, self.length as u32);
        let i = index.0;
        BlockPos::new((i % w) as i32, (i / (w * l)) as i32, ((i / w) % l) as i32)
    }

    /// Bounds-checked neighbour lookup. Stepping off any face yields `None`
    /// rather than wrapping into the adjacent row.
    pub fn offset(&self, index: CellIndex, dx: i32, dy: i32, dz: i32) -> Option<CellIndex> {
        self.index_of(self.pos_of(index).offset(dx, dy, dz))
    }
}

/// A dense box of blocks stored as one flat array.
#[derive(Clone)]
pub struct Grid {
    dims: Dimensions,
    blocks: Box<[BlockId]>,
}

impl Grid {
    pub fn new_filled(dims: Dimensions, block: BlockId) -> Result<Self, GridError> {
        if dims.width == 0 || dims.height == 0 || dims.length == 0 {
            return Err(GridError::Empty {
                width: dims.width,
                height: dims.height,
                length: dims.length,
            });
        }
        let volume = dims.volume();
        if volume > u32::MAX as u64 {
            return Err(GridError::TooLarge(volume));
        }
        Ok(Self {
            dims,
            blocks: vec![block; volume as usize].into_boxed_slice(),
        })
    }

    pub fn new_empty(dims: Dimensions) -> Result<Self, GridError> {
        Self::new_filled(dims, BlockId::AIR)
    }

    #[inline]
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    #[inline]
    pub fn get(&self, index: CellIndex) -> Option<BlockId> {
        self.blocks.get(index.as_usize()).copied()
    }

    /// Write a block, returning the previous one. Out-of-range writes are
    /// ignored and return `None`.
    #[inline]
    pub fn set(&mut self, index: CellIndex, block: BlockId) -> Option<BlockId> {
        let slot = self.blocks.get_mut(index.as_usize())?;
        Some(std::mem::replace(slot, block))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn count(&self, mut pred: impl FnMut(BlockId) -> bool) -> usize {
        self.blocks.iter().filter(|b| pred(**b)).count()
    }
}
