//! Classic block ids and the per-material property table.
//!
//! Ids 0..=65 follow the classic protocol (including the CPE custom blocks);
//! the physics-only materials live in the extended range above 100.

use voxflow_engine::world::block::BlockId;

pub const AIR: BlockId = BlockId(0);
pub const STONE: BlockId = BlockId(1);
pub const GRASS: BlockId = BlockId(2);
pub const DIRT: BlockId = BlockId(3);
pub const COBBLESTONE: BlockId = BlockId(4);
pub const WOOD: BlockId = BlockId(5);
pub const SAPLING: BlockId = BlockId(6);
pub const BEDROCK: BlockId = BlockId(7);
/// Active (spreading) water.
pub const WATER: BlockId = BlockId(8);
pub const STILL_WATER: BlockId = BlockId(9);
/// Active (spreading) lava.
pub const LAVA: BlockId = BlockId(10);
pub const STILL_LAVA: BlockId = BlockId(11);
pub const SAND: BlockId = BlockId(12);
pub const GRAVEL: BlockId = BlockId(13);
pub const LOG: BlockId = BlockId(17);
pub const LEAVES: BlockId = BlockId(18);
pub const SPONGE: BlockId = BlockId(19);
pub const GLASS: BlockId = BlockId(20);
pub const RED: BlockId = BlockId(21);
pub const GREEN: BlockId = BlockId(25);
pub const WHITE: BlockId = BlockId(36);
pub const DANDELION: BlockId = BlockId(37);
pub const ROSE: BlockId = BlockId(38);
pub const BROWN_MUSHROOM: BlockId = BlockId(39);
pub const RED_MUSHROOM: BlockId = BlockId(40);
pub const SLAB: BlockId = BlockId(44);
pub const TNT: BlockId = BlockId(46);
pub const BOOKSHELF: BlockId = BlockId(47);
pub const OBSIDIAN: BlockId = BlockId(49);
pub const ROPE: BlockId = BlockId(51);
pub const FIRE: BlockId = BlockId(54);
pub const ICE: BlockId = BlockId(60);

/// Absorbs lava the way a sponge absorbs water.
pub const LAVA_SPONGE: BlockId = BlockId(109);
/// Driftwood: sinks through air, floats up through water.
pub const FLOAT_WOOD: BlockId = BlockId(110);
/// Lava without the spreading delay.
pub const FAST_LAVA: BlockId = BlockId(112);

/// Static facts about one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockProps {
    /// Destroyed by flowing water under advanced physics.
    pub killed_by_water: bool,
    /// Destroyed by flowing lava under advanced physics.
    pub killed_by_lava: bool,
    /// Teleporter blocks; liquids never flow into them.
    pub is_portal: bool,
    /// Lets light through to the block below (keeps grass alive).
    pub light_passes: bool,
    /// What this block becomes when it grows grass.
    pub grass_variant: Option<BlockId>,
    /// What this block becomes when its grass dies.
    pub dirt_variant: Option<BlockId>,
}

/// One [`BlockProps`] per possible block id.
#[derive(Clone)]
pub struct PropsTable {
    props: Box<[BlockProps; 256]>,
}

impl PropsTable {
    /// Properties of the classic block set.
    pub fn classic() -> Self {
        let mut props = Box::new([BlockProps::default(); 256]);

        for b in [AIR, GLASS, LEAVES, SAPLING, DANDELION, ROSE, BROWN_MUSHROOM, RED_MUSHROOM, ROPE, FIRE, SLAB, ICE] {
            props[b.index()].light_passes = true;
        }
        for b in [SAPLING, DANDELION, ROSE, BROWN_MUSHROOM, RED_MUSHROOM] {
            props[b.index()].killed_by_water = true;
            props[b.index()].killed_by_lava = true;
        }
        for b in [WOOD, LOG, LEAVES, BOOKSHELF, TNT, ROPE, FLOAT_WOOD] {
            props[b.index()].killed_by_lava = true;
        }
        // Wool burns.
        for id in RED.0..=WHITE.0 {
            props[id as usize].killed_by_lava = true;
        }

        props[DIRT.index()].grass_variant = Some(GRASS);
        props[GRASS.index()].dirt_variant = Some(DIRT);

        Self { props }
    }

    #[inline]
    pub fn get(&self, block: BlockId) -> &BlockProps {
        &self.props[block.index()]
    }

    pub fn get_mut(&mut self, block: BlockId) -> &mut BlockProps {
        &mut self.props[block.index()]
    }
}

impl Default for PropsTable {
    fn default() -> Self {
        Self::classic()
    }
}

/// Water in either state.
pub fn is_water(id: BlockId) -> bool {
    id == WATER || id == STILL_WATER
}

/// Lava in any state.
pub fn is_lava(id: BlockId) -> bool {
    id == LAVA || id == STILL_LAVA || id == FAST_LAVA
}

/// Materials that fall when unsupported.
pub fn has_gravity(id: BlockId) -> bool {
    id == SAND || id == GRAVEL
}

/// Materials a falling block passes through.
pub fn is_open(id: BlockId) -> bool {
    id == AIR || is_water(id) || is_lava(id)
}

/// Small plants that falling blocks crush under advanced physics.
pub fn is_crushable(id: BlockId) -> bool {
    matches!(id, SAPLING | DANDELION | ROSE | BROWN_MUSHROOM | RED_MUSHROOM)
}
