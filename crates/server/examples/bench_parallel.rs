//! Benchmark: ticking levels one after another vs. in parallel.
//!
//! Loads several identical flooded levels and measures time to quiescence.
//! Run with: `cargo run --release -p voxflow-server --example bench_parallel`

use std::time::Instant;

use voxflow_engine::world::position::BlockPos;
use voxflow_server::block;
use voxflow_server::config::{LevelConfig, PhysicsLevel, Terrain};
use voxflow_server::host::PhysicsHost;
use voxflow_server::level::{Level, LevelRules};

const LEVELS: usize = 16;
const SIZE: u16 = 64;
const MAX_TICKS: usize = 10_000;

fn main() -> anyhow::Result<()> {
    println!("=== voxflow: parallel level benchmark ===\n");
    println!("  {LEVELS} levels of {SIZE}^3, water sources and sand columns in each\n");

    let rules = voxflow_server::rules::standard();

    // --- Sequential ---
    let mut levels = (0..LEVELS)
        .map(|i| build_level(i, &rules))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let t0 = Instant::now();
    let seq_ticks: usize = levels
        .iter_mut()
        .map(|level| level.run_until_quiet(&rules, MAX_TICKS))
        .sum();
    let dt_seq = t0.elapsed();
    println!("  Sequential: {seq_ticks:>8} level ticks in {dt_seq:>8.2?}");

    // --- Parallel ---
    let mut host = PhysicsHost::new();
    let mut ids = Vec::new();
    for i in 0..LEVELS {
        let id = host.load(level_config(i))?;
        if let Some(level) = host.get_mut(id) {
            seed_level(level, &rules);
        }
        ids.push(id);
    }
    let t0 = Instant::now();
    let par_ticks = host.run_until_quiet(MAX_TICKS);
    let dt_par = t0.elapsed();
    println!("  Parallel:   {par_ticks:>8} host ticks in {dt_par:>8.2?}");

    println!("\n  Speedup: {:.2}x", dt_seq.as_secs_f64() / dt_par.as_secs_f64());

    // --- Verify identical ---
    let mismatches = levels
        .iter()
        .zip(&ids)
        .filter(|(seq, id)| {
            host.get(**id)
                .is_none_or(|par| par.world().count(block::is_water) != seq.world().count(block::is_water))
        })
        .count();
    if mismatches == 0 {
        println!("  Results: identical water volume in every level");
    } else {
        println!("  Results: {mismatches} levels differ!");
    }
    Ok(())
}

fn level_config(i: usize) -> LevelConfig {
    LevelConfig {
        name: format!("bench-{i}"),
        width: SIZE,
        height: SIZE,
        length: SIZE,
        seed: Some(i as u64),
        terrain: Terrain::Flat { ground: 8 },
        physics: PhysicsLevel::Advanced,
        overload: 100_000,
        ..LevelConfig::default()
    }
}

fn build_level(i: usize, rules: &LevelRules) -> anyhow::Result<Level> {
    let mut level = Level::load(level_config(i))?;
    seed_level(&mut level, rules);
    Ok(level)
}

fn seed_level(level: &mut Level, rules: &LevelRules) {
    let mid = i32::from(SIZE) / 2;
    level.set_block(rules, BlockPos::new(mid, 20, mid), block::WATER);
    for x in (4..i32::from(SIZE) - 4).step_by(8) {
        for y in 30..40 {
            level.set_block(rules, BlockPos::new(x, y, 4), block::SAND);
        }
    }
}
