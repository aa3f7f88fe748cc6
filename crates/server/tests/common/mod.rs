#![allow(dead_code)]

use voxflow_engine::world::block::BlockId;
use voxflow_engine::world::position::BlockPos;
use voxflow_server::config::{LevelConfig, PhysicsLevel, Terrain};
use voxflow_server::level::{Level, LevelRules};

/// Seeded, empty, simple-physics cube with uniform flow.
pub fn config(size: u16) -> LevelConfig {
    LevelConfig {
        name: "test".into(),
        width: size,
        height: size,
        length: size,
        seed: Some(7),
        terrain: Terrain::Empty,
        physics: PhysicsLevel::Simple,
        random_flow: false,
        ..LevelConfig::default()
    }
}

pub fn level(config: LevelConfig) -> Level {
    Level::load(config).unwrap()
}

/// Stone slab filling layer `y = 0`.
pub fn with_floor(mut level: Level) -> Level {
    let dims = level.world().dims();
    let (w, l) = (dims.width as i32 - 1, dims.length as i32 - 1);
    level
        .world_mut()
        .fill(BlockPos::new(0, 0, 0), BlockPos::new(w, 0, l), voxflow_server::block::STONE);
    level
}

pub fn put(level: &mut Level, rules: &LevelRules, x: i32, y: i32, z: i32, block: BlockId) {
    assert!(level.set_block(rules, BlockPos::new(x, y, z), block));
}

pub fn at(level: &Level, x: i32, y: i32, z: i32) -> Option<BlockId> {
    level.block_at(BlockPos::new(x, y, z))
}

pub fn count(level: &Level, pred: impl FnMut(BlockId) -> bool) -> usize {
    level.world().count(pred)
}

pub fn ticks(level: &mut Level, rules: &LevelRules, n: usize) {
    for _ in 0..n {
        level.tick(rules);
    }
}
