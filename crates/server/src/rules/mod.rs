pub mod falling;
pub mod finite;
pub mod flow;
pub mod growth;
pub mod helpers;
pub mod liquid;
pub mod misc;
pub mod sponge;
pub mod tree;

use crate::block::{
    BROWN_MUSHROOM, DANDELION, DIRT, FAST_LAVA, FLOAT_WOOD, GRASS, GRAVEL, LAVA, LAVA_SPONGE,
    RED_MUSHROOM, ROSE, SAND, SAPLING, SPONGE, WATER,
};
use crate::level::LevelRules;

/// The classic rule set: liquids, falling blocks, sponges, growth and plants.
pub fn standard() -> LevelRules {
    let mut rules = LevelRules::new();
    rules.register(WATER, liquid::water);
    rules.register(LAVA, liquid::lava);
    rules.register(FAST_LAVA, liquid::fast_lava);

    rules.register(SAND, falling::resolve);
    rules.register(GRAVEL, falling::resolve);
    rules.register(FLOAT_WOOD, misc::float_wood);

    rules.register(SPONGE, sponge::absorb_water);
    rules.register(LAVA_SPONGE, sponge::absorb_lava);
    rules.on_removed(SPONGE, sponge::water_sponge_removed);
    rules.on_removed(LAVA_SPONGE, sponge::lava_sponge_removed);

    rules.register(DIRT, growth::dirt);
    rules.register(GRASS, growth::grass);
    rules.register(SAPLING, growth::sapling);
    for plant in [DANDELION, ROSE, BROWN_MUSHROOM, RED_MUSHROOM] {
        rules.register(plant, misc::plant);
    }
    rules
}
