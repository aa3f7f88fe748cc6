//! Async tick loops.
//!
//! Each level runs on its own tokio task, ticking every `speed_ms`
//! milliseconds. Block changes applied by a tick are published to the event
//! bus. Other subsystems talk to a running level only through its
//! [`LevelHandle`](crate::level::LevelHandle).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::event_bus::{self, WorldChangeBatch};
use crate::level::{Level, LevelRules};
use crate::metrics::Metrics;

/// Spawn the tick loop for `level`. The task hands the level back once
/// `shutdown` flips to `true`.
pub fn spawn_level(
    mut level: Level,
    rules: Arc<LevelRules>,
    bus: broadcast::Sender<WorldChangeBatch>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<Level> {
    tokio::spawn(async move {
        let name: Arc<str> = Arc::from(level.name());
        let period = Duration::from_millis(level.config().speed_ms);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it.
        interval.tick().await;

        tracing::info!(level = %name, ?period, "tick loop started");

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let report = level.tick(&rules);
            let changes = event_bus::collect_block_changes(level.world_mut());
            if !changes.is_empty() {
                let num_changes = changes.len();
                let batch = WorldChangeBatch {
                    level: Arc::clone(&name),
                    tick: report.tick,
                    changes: changes.into(),
                };
                // No subscribers is fine.
                let _ = bus.send(batch);
                tracing::debug!(
                    level = %name,
                    tick = report.tick,
                    dispatched = report.dispatched,
                    queue = report.queue_depth,
                    changes = num_changes,
                    "tick published"
                );
            }
        }

        tracing::info!(level = %name, queue = level.scheduler().queue().len(), "tick loop stopped");
        level
    })
}

/// Periodically log a JSON metrics snapshot until `shutdown` flips.
pub fn spawn_reporter(
    metrics: Arc<Metrics>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                    continue;
                }
            }
            match metrics.snapshot().to_json() {
                Ok(json) => tracing::info!(target: "voxflow::metrics", "{json}"),
                Err(e) => tracing::warn!("failed to serialize metrics: {e}"),
            }
        }
    })
}
