//! Grass, saplings and plants.

mod common;

use common::{at, config, count, level, ticks, with_floor};
use voxflow_engine::world::block::BlockId;
use voxflow_engine::world::position::BlockPos;
use voxflow_server::block::{self, DIRT, GLASS, GRASS, GREEN, LEAVES, LOG, ROSE, SAPLING, STONE};
use voxflow_server::config::{LevelConfig, PhysicsLevel, TreeSpecies};
use voxflow_server::level::Level;
use voxflow_server::rules::{self, growth::GROWTH_THRESHOLD};

fn with_block(mut lvl: Level, x: i32, y: i32, z: i32, block: BlockId) -> Level {
    lvl.world_mut().fill(BlockPos::new(x, y, z), BlockPos::new(x, y, z), block);
    lvl
}

/// Dispatches before dirt or grass converts: the counter climbs past the
/// threshold, then the next dispatch converts.
const CONVERSION_TICKS: usize = GROWTH_THRESHOLD as usize + 2;

#[test]
fn lit_dirt_grows_grass() {
    let rules = rules::standard();
    let mut lvl = with_block(level(config(3)), 1, 0, 1, DIRT);
    assert!(lvl.schedule_check(BlockPos::new(1, 0, 1)));

    ticks(&mut lvl, &rules, CONVERSION_TICKS - 1);
    assert_eq!(at(&lvl, 1, 0, 1), Some(DIRT));
    lvl.tick(&rules);
    assert_eq!(at(&lvl, 1, 0, 1), Some(GRASS));
}

#[test]
fn buried_grass_dies() {
    let rules = rules::standard();
    let lvl = with_block(level(config(3)), 1, 0, 1, GRASS);
    let mut lvl = with_block(lvl, 1, 1, 1, STONE);
    assert!(lvl.schedule_check(BlockPos::new(1, 0, 1)));

    ticks(&mut lvl, &rules, CONVERSION_TICKS);
    assert_eq!(at(&lvl, 1, 0, 1), Some(DIRT));
}

#[test]
fn grass_under_glass_survives() {
    let rules = rules::standard();
    let lvl = with_block(level(config(3)), 1, 0, 1, GRASS);
    let mut lvl = with_block(lvl, 1, 1, 1, GLASS);
    assert!(lvl.schedule_check(BlockPos::new(1, 0, 1)));

    ticks(&mut lvl, &rules, CONVERSION_TICKS * 2);
    assert_eq!(at(&lvl, 1, 0, 1), Some(GRASS));
    assert!(lvl.scheduler().is_quiet());
}

#[test]
fn dark_dirt_stays_dirt() {
    let rules = rules::standard();
    let lvl = with_block(level(config(3)), 1, 0, 1, DIRT);
    let mut lvl = with_block(lvl, 1, 1, 1, STONE);
    assert!(lvl.schedule_check(BlockPos::new(1, 0, 1)));

    ticks(&mut lvl, &rules, CONVERSION_TICKS * 2);
    assert_eq!(at(&lvl, 1, 0, 1), Some(DIRT));
}

#[test]
fn grass_growth_can_be_disabled() {
    let rules = rules::standard();
    let mut lvl = with_block(
        level(LevelConfig {
            grass_growth: false,
            ..config(3)
        }),
        1,
        0,
        1,
        DIRT,
    );
    assert!(lvl.schedule_check(BlockPos::new(1, 0, 1)));

    lvl.tick(&rules);
    assert!(lvl.scheduler().is_quiet());
    assert_eq!(at(&lvl, 1, 0, 1), Some(DIRT));
}

fn forest(species: TreeSpecies) -> LevelConfig {
    LevelConfig {
        grow_trees: true,
        tree_species: species,
        ..config(16)
    }
}

#[test]
fn sapling_grows_into_a_tree() {
    let rules = rules::standard();
    let mut lvl = with_floor(level(forest(TreeSpecies::Fern)));
    lvl.world_mut().fill(BlockPos::new(8, 1, 8), BlockPos::new(8, 1, 8), SAPLING);
    assert!(lvl.schedule_check(BlockPos::new(8, 1, 8)));

    let ticks = lvl.run_until_quiet(&rules, 20_000);
    assert!(ticks < 20_000);
    assert_eq!(at(&lvl, 8, 1, 8), Some(LOG));
    assert!(count(&lvl, |b| b == LOG) >= 5);
    assert!(count(&lvl, |b| b == LEAVES) > 0);
    assert_eq!(count(&lvl, |b| b == SAPLING), 0);
}

#[test]
fn trees_only_grow_into_air() {
    let rules = rules::standard();
    let mut lvl = with_floor(level(forest(TreeSpecies::Oak)));
    lvl.world_mut().fill(BlockPos::new(8, 1, 8), BlockPos::new(8, 1, 8), SAPLING);
    lvl.world_mut().fill(BlockPos::new(8, 3, 8), BlockPos::new(8, 3, 8), STONE);
    assert!(lvl.schedule_check(BlockPos::new(8, 1, 8)));

    lvl.run_until_quiet(&rules, 20_000);
    assert_eq!(at(&lvl, 8, 1, 8), Some(LOG));
    assert_eq!(at(&lvl, 8, 3, 8), Some(STONE));
}

#[test]
fn cactus_is_green() {
    let rules = rules::standard();
    let mut lvl = with_floor(level(forest(TreeSpecies::Cactus)));
    lvl.world_mut().fill(BlockPos::new(8, 1, 8), BlockPos::new(8, 1, 8), SAPLING);
    assert!(lvl.schedule_check(BlockPos::new(8, 1, 8)));

    lvl.run_until_quiet(&rules, 20_000);
    assert_eq!(at(&lvl, 8, 1, 8), Some(GREEN));
    assert_eq!(count(&lvl, |b| b == LEAVES), 0);
}

#[test]
fn saplings_wait_when_trees_are_off() {
    let rules = rules::standard();
    let mut lvl = with_floor(level(config(8)));
    lvl.world_mut().fill(BlockPos::new(4, 1, 4), BlockPos::new(4, 1, 4), SAPLING);
    assert!(lvl.schedule_check(BlockPos::new(4, 1, 4)));

    lvl.tick(&rules);
    assert!(lvl.scheduler().is_quiet());
    assert_eq!(at(&lvl, 4, 1, 4), Some(SAPLING));
}

#[test]
fn advanced_plants_pass_updates_on() {
    let rules = rules::standard();
    let mut lvl = with_floor(level(LevelConfig {
        physics: PhysicsLevel::Advanced,
        ..config(8)
    }));
    lvl.world_mut().fill(BlockPos::new(4, 1, 4), BlockPos::new(4, 1, 4), ROSE);
    lvl.world_mut().fill(BlockPos::new(4, 2, 4), BlockPos::new(4, 2, 4), block::SAND);
    // The sand is supported by the rose; only the rose is checked.
    assert!(lvl.schedule_check(BlockPos::new(4, 1, 4)));

    lvl.tick(&rules);
    let sand = lvl.index_of(BlockPos::new(4, 2, 4)).unwrap();
    assert!(lvl.scheduler().queue().contains(sand));

    lvl.run_until_quiet(&rules, 50);
    assert_eq!(at(&lvl, 4, 1, 4), Some(block::SAND), "advanced sand crushes the rose");
}
