use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, watch};
use voxflow_engine::world::position::BlockPos;
use voxflow_server::block;
use voxflow_server::config::{LevelConfig, PhysicsLevel, ServerConfig, Terrain};
use voxflow_server::event_bus::{self, WorldChangeBatch};
use voxflow_server::host::PhysicsHost;
use voxflow_server::level::Level;
use voxflow_server::metrics::Metrics;
use voxflow_server::{rules, simulation};

/// How often the metrics snapshot is logged.
const REPORT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    let demo_mode = std::env::args().any(|a| a == "--demo");
    let config_path: Option<PathBuf> = std::env::args()
        .skip_while(|a| a != "--config")
        .nth(1)
        .map(PathBuf::from);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if demo_mode {
        return run_demo();
    }

    let config = match &config_path {
        Some(path) => ServerConfig::load(path)?,
        None => {
            tracing::info!("no --config given, using one default level");
            ServerConfig::default()
        }
    };

    let rules = Arc::new(rules::standard());
    let metrics = Arc::new(Metrics::new());
    let (bus_tx, _) = broadcast::channel::<WorldChangeBatch>(event_bus::BUS_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut tasks = Vec::new();
    for level_config in config.levels {
        let level = Level::load(level_config)?;
        let handle = level.handle();
        metrics.register(Arc::from(handle.name()), Arc::clone(handle.stats()));
        tasks.push(simulation::spawn_level(
            level,
            Arc::clone(&rules),
            bus_tx.clone(),
            shutdown_rx.clone(),
        ));
    }
    let reporter = simulation::spawn_reporter(Arc::clone(&metrics), REPORT_INTERVAL, shutdown_rx);

    tracing::info!(levels = tasks.len(), "physics running, Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    tracing::info!("Ctrl+C received, shutting down...");

    // Receivers may already be gone if every task exited early.
    let _ = shutdown_tx.send(true);
    for task in tasks {
        match task.await {
            Ok(level) => tracing::info!(level = level.name(), "level stopped"),
            Err(e) => tracing::error!("tick loop failed: {e}"),
        }
    }
    let _ = reporter.await;
    Ok(())
}

/// Drop sand and pour water into a small flat level, then run it to rest.
fn run_demo() -> Result<()> {
    tracing::info!("voxflow physics demo");

    let mut host = PhysicsHost::new();
    let id = host.load(LevelConfig {
        name: "demo".into(),
        width: 32,
        height: 32,
        length: 32,
        seed: Some(1),
        terrain: Terrain::Flat { ground: 4 },
        physics: PhysicsLevel::Advanced,
        ..LevelConfig::default()
    })?;
    let rules = rules::standard();
    let level = host.get_mut(id).context("demo level vanished")?;

    for y in 12..16 {
        level.set_block(&rules, BlockPos::new(8, y, 8), block::SAND);
    }
    level.set_block(&rules, BlockPos::new(20, 10, 20), block::WATER);

    let ticks = host.run_until_quiet(2_000);
    let level = host.get(id).context("demo level vanished")?;
    let water = level.world().count(block::is_water);
    tracing::info!(ticks, water, "demo settled");

    match level.block_at(BlockPos::new(8, 5, 8)) {
        Some(block::SAND) => tracing::info!("sand landed on the surface"),
        other => tracing::warn!(?other, "unexpected block where sand should rest"),
    }
    println!("{}", host.metrics().snapshot().to_json()?);
    Ok(())
}
