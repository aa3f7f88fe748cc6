//! Handles, the multi-level host, the async tick loop and whole-level
//! termination.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{at, config, count, level, put, with_floor};
use tokio::sync::{broadcast, watch};
use voxflow_engine::physics::check::PhysicsArgs;
use voxflow_engine::physics::scheduler::RunState;
use voxflow_engine::world::position::BlockPos;
use voxflow_server::block::{self, GRAVEL, LAVA, LAVA_SPONGE, SAND, SPONGE, WATER};
use voxflow_server::config::{LevelConfig, PhysicsLevel};
use voxflow_server::event_bus::{self, WorldChangeBatch};
use voxflow_server::host::PhysicsHost;
use voxflow_server::rules;
use voxflow_server::simulation;

// ---------------------------------------------------------------------------
// LevelHandle
// ---------------------------------------------------------------------------

#[test]
fn handle_writes_land_on_the_next_tick() {
    let rules = rules::standard();
    let mut lvl = level(config(10));
    let handle = lvl.handle();

    let writer = {
        let handle = handle.clone();
        std::thread::spawn(move || handle.set_block(BlockPos::new(5, 5, 5), WATER))
    };
    assert!(writer.join().unwrap());
    assert!(!handle.set_block(BlockPos::new(50, 0, 0), WATER), "outside the level");
    assert_eq!(at(&lvl, 5, 5, 5), Some(block::AIR));

    lvl.tick(&rules);
    assert_eq!(at(&lvl, 5, 5, 5), Some(WATER));
    assert_eq!(at(&lvl, 5, 4, 5), Some(WATER));
}

#[test]
fn transient_blocks_dissipate() {
    let rules = rules::standard();
    let mut lvl = level(config(6));
    let handle = lvl.handle();
    handle.place_transient(BlockPos::new(2, 2, 2), block::GLASS, 100);

    lvl.tick(&rules);
    assert_eq!(at(&lvl, 2, 2, 2), Some(block::AIR));
}

#[test]
fn waiting_liquid_keeps_its_check() {
    let rules = rules::standard();
    let mut lvl = with_floor(level(config(6)));
    let handle = lvl.handle();
    handle.set_block_with(BlockPos::new(2, 1, 2), WATER, PhysicsArgs::Wait);

    for _ in 0..20 {
        lvl.tick(&rules);
    }
    let source = lvl.index_of(BlockPos::new(2, 1, 2)).unwrap();
    assert!(lvl.scheduler().queue().contains(source));

    // Replacing the source ends it.
    handle.set_block(BlockPos::new(2, 1, 2), block::STONE);
    lvl.run_until_quiet(&rules, 50);
    assert!(!lvl.scheduler().queue().contains(source));
}

#[test]
fn handle_suspends_and_resumes() {
    let rules = rules::standard();
    let mut lvl = level(config(10));
    let handle = lvl.handle();
    handle.suspend();
    handle.set_block(BlockPos::new(5, 5, 5), WATER);

    let report = lvl.tick(&rules);
    assert_eq!(report.state, RunState::Suspended);
    assert_eq!(count(&lvl, block::is_water), 1, "writes still apply");

    handle.resume();
    lvl.tick(&rules);
    assert_eq!(count(&lvl, block::is_water), 6);
}

#[test]
fn reconfigure_switches_physics_and_limits_in_place() {
    let rules = rules::standard();
    let mut lvl = level(config(10));
    put(&mut lvl, &rules, 5, 5, 5, WATER);

    lvl.reconfigure(LevelConfig {
        physics: PhysicsLevel::Off,
        overload: 42,
        ..config(10)
    })
    .unwrap();
    assert_eq!(lvl.config().physics, PhysicsLevel::Off);
    assert_eq!(lvl.scheduler().limits().max_checks_per_tick, 42);

    lvl.tick(&rules);
    assert_eq!(count(&lvl, block::is_water), 1);
    assert!(lvl.scheduler().queue().is_empty());

    let rejected = lvl.reconfigure(LevelConfig {
        overload: 0,
        ..config(10)
    });
    assert!(rejected.is_err());
    assert_eq!(lvl.config().physics, PhysicsLevel::Off);
}

#[test]
fn overload_is_visible_through_the_handle() {
    let rules = rules::standard();
    let mut lvl = level(LevelConfig {
        overload: 10,
        queue_ceiling: 100,
        recovery_threshold: 20,
        ..config(16)
    });
    let handle = lvl.handle();
    let cells = (0..16).flat_map(|x| (0..16).map(move |z| BlockPos::new(x, 0, z)));
    assert_eq!(handle.schedule_check_batch(cells), 256);

    lvl.tick(&rules);
    assert!(handle.is_overloaded());

    lvl.run_until_quiet(&rules, 100);
    assert!(!handle.is_overloaded());
    assert_eq!(handle.queue_depth(), 0);
    assert_eq!(handle.stats().snapshot().overload_episodes, 1);
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

fn busy_scene(physics: PhysicsLevel, random_flow: bool) -> voxflow_server::level::Level {
    let rules = rules::standard();
    let mut lvl = with_floor(level(LevelConfig {
        physics,
        random_flow,
        ..config(16)
    }));
    put(&mut lvl, &rules, 3, 10, 3, WATER);
    put(&mut lvl, &rules, 12, 8, 12, LAVA);
    put(&mut lvl, &rules, 8, 4, 8, SPONGE);
    put(&mut lvl, &rules, 12, 1, 3, LAVA_SPONGE);
    for y in 5..12 {
        put(&mut lvl, &rules, 6, y, 10, if y % 2 == 0 { SAND } else { GRAVEL });
    }
    lvl
}

#[test]
fn every_mode_settles() {
    let rules = rules::standard();
    for physics in [PhysicsLevel::Simple, PhysicsLevel::Advanced, PhysicsLevel::Finite] {
        for random_flow in [false, true] {
            let mut lvl = busy_scene(physics, random_flow);
            let ticks = lvl.run_until_quiet(&rules, 20_000);
            assert!(ticks < 20_000, "{physics:?} random={random_flow} never settled");
            assert!(lvl.scheduler().queue().is_empty());
        }
    }
}

// ---------------------------------------------------------------------------
// PhysicsHost
// ---------------------------------------------------------------------------

#[test]
fn host_ticks_levels_independently() {
    let mut host = PhysicsHost::new();
    let a = host
        .load(LevelConfig {
            name: "a".into(),
            ..config(8)
        })
        .unwrap();
    let b = host
        .load(LevelConfig {
            name: "b".into(),
            ..config(8)
        })
        .unwrap();
    assert!(host.load(LevelConfig { name: "a".into(), ..config(8) }).is_err());
    assert_eq!(host.find("b"), Some(b));
    assert_eq!(host.metrics().level_count(), 2);

    host.handle(a).unwrap().set_block(BlockPos::new(4, 4, 4), WATER);
    let reports = host.tick_all();
    assert_eq!(reports.len(), 2);

    let level_a = host.get(a).unwrap();
    let level_b = host.get(b).unwrap();
    assert_eq!(level_a.world().count(block::is_water), 6);
    assert_eq!(level_b.world().count(block::is_water), 0);

    let ticks = host.run_until_quiet(1_000);
    assert!(ticks < 1_000);
    assert!(host.is_quiet());

    let unloaded = host.unload(a).unwrap();
    assert_eq!(unloaded.name(), "a");
    assert!(host.get(a).is_none());
    assert_eq!(host.len(), 1);
    assert_eq!(host.metrics().level_count(), 1);
}

#[test]
fn host_runs_are_reproducible() {
    let run = || {
        let mut host = PhysicsHost::new();
        let id = host
            .load(LevelConfig {
                random_flow: true,
                ..config(12)
            })
            .unwrap();
        let handle = host.handle(id).unwrap();
        handle.set_block(BlockPos::new(6, 8, 6), WATER);
        handle.set_block(BlockPos::new(2, 8, 2), LAVA);
        host.run_until_quiet(5_000);
        let level = host.get(id).unwrap();
        let dims = level.world().dims();
        (0..dims.volume() as u32)
            .map(|i| level.world().get_block(voxflow_engine::world::position::CellIndex(i)))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

// ---------------------------------------------------------------------------
// Async tick loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tick_loop_publishes_changes() {
    let rules = Arc::new(rules::standard());
    let lvl = level(LevelConfig {
        speed_ms: 5,
        ..config(8)
    });
    let handle = lvl.handle();
    let (bus_tx, mut bus_rx) = broadcast::channel::<WorldChangeBatch>(event_bus::BUS_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let task = simulation::spawn_level(lvl, rules, bus_tx, shutdown_rx);
    handle.set_block(BlockPos::new(4, 4, 4), WATER);

    let batch = tokio::time::timeout(Duration::from_secs(5), bus_rx.recv())
        .await
        .expect("no batch published")
        .unwrap();
    assert_eq!(&*batch.level, "test");
    assert!(batch.changes.contains(&(BlockPos::new(4, 4, 4), WATER)));

    shutdown_tx.send(true).unwrap();
    let lvl = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("tick loop did not stop")
        .unwrap();
    assert_eq!(at(&lvl, 4, 4, 4), Some(WATER));
}
