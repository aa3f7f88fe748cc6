//! Lock-free per-world physics counters.
//!
//! The tick thread updates these with relaxed atomics once per tick;
//! operational tooling on other threads reads them at its own pace.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering::Relaxed};
use std::time::Duration;

use super::scheduler::{RunState, TickReport};

pub struct PhysicsStats {
    // Monotonic counters
    ticks: AtomicU64,
    checks_dispatched: AtomicU64,
    checks_retired: AtomicU64,
    checks_shed: AtomicU64,
    resolver_failures: AtomicU64,
    updates_applied: AtomicU64,
    overload_episodes: AtomicU64,
    tick_ns_sum: AtomicU64,

    // Gauges
    queue_depth: AtomicU64,
    last_tick_ns: AtomicU64,
    state: AtomicU8,
}

impl PhysicsStats {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            checks_dispatched: AtomicU64::new(0),
            checks_retired: AtomicU64::new(0),
            checks_shed: AtomicU64::new(0),
            resolver_failures: AtomicU64::new(0),
            updates_applied: AtomicU64::new(0),
            overload_episodes: AtomicU64::new(0),
            tick_ns_sum: AtomicU64::new(0),
            queue_depth: AtomicU64::new(0),
            last_tick_ns: AtomicU64::new(0),
            state: AtomicU8::new(RunState::Running as u8),
        }
    }

    /// Called by the scheduler at the end of every tick.
    pub fn record_tick(&self, report: &TickReport, duration: Duration) {
        let ns = duration.as_nanos() as u64;
        self.ticks.fetch_add(1, Relaxed);
        self.checks_dispatched
            .fetch_add(report.dispatched as u64, Relaxed);
        self.checks_retired.fetch_add(report.retired as u64, Relaxed);
        self.checks_shed.fetch_add(report.shed as u64, Relaxed);
        self.resolver_failures
            .fetch_add(report.failed as u64, Relaxed);
        self.updates_applied
            .fetch_add(report.applied as u64, Relaxed);
        self.tick_ns_sum.fetch_add(ns, Relaxed);
        self.last_tick_ns.store(ns, Relaxed);
        self.queue_depth.store(report.queue_depth as u64, Relaxed);
        self.state.store(report.state as u8, Relaxed);
    }

    pub fn record_overload(&self) {
        self.overload_episodes.fetch_add(1, Relaxed);
    }

    /// Current queue length as of the last tick.
    pub fn queue_depth(&self) -> u64 {
        self.queue_depth.load(Relaxed)
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Relaxed))
    }

    pub fn is_overloaded(&self) -> bool {
        self.state() == RunState::Overloaded
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ticks: self.ticks.load(Relaxed),
            checks_dispatched: self.checks_dispatched.load(Relaxed),
            checks_retired: self.checks_retired.load(Relaxed),
            checks_shed: self.checks_shed.load(Relaxed),
            resolver_failures: self.resolver_failures.load(Relaxed),
            updates_applied: self.updates_applied.load(Relaxed),
            overload_episodes: self.overload_episodes.load(Relaxed),
            tick_ns_sum: self.tick_ns_sum.load(Relaxed),
            queue_depth: self.queue_depth.load(Relaxed),
            last_tick_ns: self.last_tick_ns.load(Relaxed),
            state: self.state(),
        }
    }
}

impl Default for PhysicsStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub ticks: u64,
    pub checks_dispatched: u64,
    pub checks_retired: u64,
    pub checks_shed: u64,
    pub resolver_failures: u64,
    pub updates_applied: u64,
    pub overload_episodes: u64,
    pub tick_ns_sum: u64,
    pub queue_depth: u64,
    pub last_tick_ns: u64,
    pub state: RunState,
}
