//! Process-wide physics metrics.
//!
//! Each level's scheduler keeps its own lock-free [`PhysicsStats`]; this
//! registry collects them by level name and adds a histogram of host tick
//! durations. Tick threads only touch atomics; readers take snapshots at
//! their own pace.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use voxflow_engine::physics::scheduler::RunState;
use voxflow_engine::physics::stats::PhysicsStats;

pub struct Metrics {
    levels: DashMap<Arc<str>, Arc<PhysicsStats>>,

    // Host tick duration buckets
    hist_under_1ms: AtomicU64,
    hist_1_10ms: AtomicU64,
    hist_10_50ms: AtomicU64,
    hist_50_250ms: AtomicU64,
    hist_over_250ms: AtomicU64,

    started_at: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            levels: DashMap::new(),
            hist_under_1ms: AtomicU64::new(0),
            hist_1_10ms: AtomicU64::new(0),
            hist_10_50ms: AtomicU64::new(0),
            hist_50_250ms: AtomicU64::new(0),
            hist_over_250ms: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn register(&self, level: Arc<str>, stats: Arc<PhysicsStats>) {
        self.levels.insert(level, stats);
    }

    pub fn unregister(&self, level: &str) {
        self.levels.remove(level);
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Record one tick of every loaded level.
    pub fn record_host_tick(&self, duration: Duration) {
        let bucket = match duration.as_millis() {
            0 => &self.hist_under_1ms,
            1..=9 => &self.hist_1_10ms,
            10..=49 => &self.hist_10_50ms,
            50..=249 => &self.hist_50_250ms,
            _ => &self.hist_over_250ms,
        };
        bucket.fetch_add(1, Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut levels: Vec<LevelSnapshot> = self
            .levels
            .iter()
            .map(|entry| LevelSnapshot::new(entry.key(), entry.value()))
            .collect();
        levels.sort_by(|a, b| a.name.cmp(&b.name));

        MetricsSnapshot {
            uptime_secs: self.started_at.elapsed().as_secs_f64(),
            levels,
            hist: [
                self.hist_under_1ms.load(Relaxed),
                self.hist_1_10ms.load(Relaxed),
                self.hist_10_50ms.load(Relaxed),
                self.hist_50_250ms.load(Relaxed),
                self.hist_over_250ms.load(Relaxed),
            ],
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: f64,
    pub levels: Vec<LevelSnapshot>,
    /// `[<1ms, 1-10ms, 10-50ms, 50-250ms, >250ms]`
    pub hist: [u64; 5],
}

impl MetricsSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelSnapshot {
    pub name: String,
    pub state: &'static str,
    pub ticks: u64,
    pub queue_depth: u64,
    pub checks_dispatched: u64,
    pub checks_retired: u64,
    pub checks_shed: u64,
    pub resolver_failures: u64,
    pub updates_applied: u64,
    pub overload_episodes: u64,
    pub last_tick_us: u64,
    pub mean_tick_us: u64,
}

impl LevelSnapshot {
    fn new(name: &str, stats: &PhysicsStats) -> Self {
        let s = stats.snapshot();
        Self {
            name: name.to_owned(),
            state: match s.state {
                RunState::Running => "running",
                RunState::Overloaded => "overloaded",
                RunState::Suspended => "suspended",
            },
            ticks: s.ticks,
            queue_depth: s.queue_depth,
            checks_dispatched: s.checks_dispatched,
            checks_retired: s.checks_retired,
            checks_shed: s.checks_shed,
            resolver_failures: s.resolver_failures,
            updates_applied: s.updates_applied,
            overload_episodes: s.overload_episodes,
            last_tick_us: s.last_tick_ns / 1_000,
            mean_tick_us: s.tick_ns_sum.checked_div(s.ticks).unwrap_or(0) / 1_000,
        }
    }
}
