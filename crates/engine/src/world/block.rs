/// Opaque block identifier. The engine stores these without interpreting them.
/// Game-specific layers assign meaning to specific IDs (e.g. 8 = water, 12 = sand).
///
/// The only semantic the engine enforces is that `BlockId::AIR` (0) is the
/// "empty" block: dissipating cells and freshly created grids hold AIR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BlockId(pub u8);

impl BlockId {
    /// The universal "empty" block.
    pub const AIR: BlockId = BlockId(0);

    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Position of this block in a 256-entry lookup table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
