use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::PhysicsRng;
use super::buffer::{PendingUpdate, UpdateBuffer};
use super::check::{Check, CheckData, PhysicsArgs};
use super::queue::{CheckQueue, Inbox, Request};
use super::stats::PhysicsStats;
use crate::rules::{PhysicsEnv, RuleSet, TickCtx};
use crate::world::World;
use crate::world::block::BlockId;
use crate::world::position::CellIndex;

/// Per-world bounds on simulation cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverloadLimits {
    /// Checks dispatched per tick; the rest wait for the next tick.
    pub max_checks_per_tick: usize,
    /// Queue length above which dispatch stops and the world is overloaded.
    pub queue_ceiling: usize,
    /// Queue length at or below which an overloaded world resumes.
    pub recovery_threshold: usize,
}

impl Default for OverloadLimits {
    fn default() -> Self {
        Self {
            max_checks_per_tick: 1500,
            queue_ceiling: 100_000,
            recovery_threshold: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RunState {
    #[default]
    Running = 0,
    /// The queue passed its ceiling; checks are shed without dispatch until
    /// it drains to the recovery threshold.
    Overloaded = 1,
    /// Paused by an operator. The queue is kept intact.
    Suspended = 2,
}

impl RunState {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => RunState::Overloaded,
            2 => RunState::Suspended,
            _ => RunState::Running,
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// External requests drained from the inbox.
    pub requests: usize,
    /// Checks handed to a resolver (or retired as stale) this tick.
    pub dispatched: usize,
    pub retired: usize,
    /// Checks left at the front of the queue by the per-tick cap.
    pub deferred: usize,
    /// Resolver invocations that panicked.
    pub failed: usize,
    /// Checks dropped unevaluated while overloaded.
    pub shed: usize,
    /// Writes that changed the grid.
    pub applied: usize,
    pub queue_depth: usize,
    pub state: RunState,
}

/// Drives the physics of one world.
///
/// A tick is strictly sequential: drain external requests, dispatch a
/// bounded snapshot of the check queue, then flush every staged write.
/// Checks scheduled during a tick are only dispatched on a later tick.
pub struct Scheduler<E> {
    world: World,
    env: E,
    queue: CheckQueue,
    updates: UpdateBuffer,
    inbox: Arc<Inbox>,
    rng: PhysicsRng,
    limits: OverloadLimits,
    state: RunState,
    stats: Arc<PhysicsStats>,
    tick: u64,
}

impl<E: PhysicsEnv> Scheduler<E> {
    pub fn new(world: World, env: E, seed: u64) -> Self {
        Self {
            world,
            env,
            queue: CheckQueue::new(),
            updates: UpdateBuffer::new(),
            inbox: Arc::new(Inbox::new()),
            rng: PhysicsRng::seed_from_u64(seed),
            limits: OverloadLimits::default(),
            state: RunState::Running,
            stats: Arc::new(PhysicsStats::new()),
            tick: 0,
        }
    }

    pub fn with_limits(mut self, limits: OverloadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct grid access for the owning thread (terrain setup, tests).
    /// Writes made here bypass physics; use [`Scheduler::set_block`] to
    /// trigger reactions.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn queue(&self) -> &CheckQueue {
        &self.queue
    }

    /// Producer side for other threads.
    pub fn inbox(&self) -> Arc<Inbox> {
        Arc::clone(&self.inbox)
    }

    pub fn stats(&self) -> Arc<PhysicsStats> {
        Arc::clone(&self.stats)
    }

    pub fn limits(&self) -> OverloadLimits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: OverloadLimits) {
        self.limits = limits;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn pending_updates(&self) -> usize {
        self.updates.len()
    }

    /// Schedule a check from the tick thread. Ignored while physics is off
    /// or when `index` is outside the world.
    pub fn schedule_check(&mut self, index: CellIndex) -> bool {
        if !self.env.physics_enabled() || self.world.get_block(index).is_none() {
            return false;
        }
        self.queue.push(Check::new(index))
    }

    pub fn schedule_check_batch(&mut self, indices: impl IntoIterator<Item = CellIndex>) -> usize {
        indices
            .into_iter()
            .filter(|&i| self.schedule_check(i))
            .count()
    }

    /// Write a block from the tick thread as an external actor would: the
    /// new block and its neighbours are checked on the next tick.
    pub fn set_block(&mut self, rules: &RuleSet<E>, index: CellIndex, block: BlockId) -> bool {
        let changed = self.apply_write(rules, index, block, None);
        self.notify_neighbours(rules, index);
        changed
    }

    pub fn suspend(&mut self) {
        if self.state != RunState::Suspended {
            tracing::info!(queue = self.queue.len(), "physics suspended");
            self.state = RunState::Suspended;
        }
    }

    pub fn resume(&mut self) {
        if self.state != RunState::Running {
            tracing::info!(queue = self.queue.len(), "physics resumed");
            self.state = RunState::Running;
        }
    }

    // ── Tick ────────────────────────────────────────────────────────────

    pub fn tick(&mut self, rules: &RuleSet<E>) -> TickReport {
        let started = Instant::now();
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        report.requests = self.drain_inbox(rules);

        if !self.env.physics_enabled() {
            self.queue.clear();
        } else if self.state != RunState::Suspended {
            self.update_overload();
            if self.state == RunState::Overloaded {
                report.shed = self.queue.shed(self.limits.max_checks_per_tick.max(1));
                self.update_overload();
            } else {
                self.dispatch(rules, &mut report);
            }
        }

        report.applied += self.flush(rules);
        report.queue_depth = self.queue.len();
        report.state = self.state;

        if report.dispatched > 0 || report.shed > 0 {
            tracing::debug!(
                tick = report.tick,
                dispatched = report.dispatched,
                retired = report.retired,
                deferred = report.deferred,
                applied = report.applied,
                queue = report.queue_depth,
                "physics tick"
            );
        }

        self.stats.record_tick(&report, started.elapsed());
        report
    }

    /// Tick until nothing is queued, staged, or waiting in the inbox, or
    /// `max_ticks` have run. Returns the number of ticks executed.
    pub fn run_until_quiet(&mut self, rules: &RuleSet<E>, max_ticks: usize) -> usize {
        for n in 0..max_ticks {
            if self.is_quiet() {
                return n;
            }
            self.tick(rules);
        }
        max_ticks
    }

    pub fn is_quiet(&self) -> bool {
        self.queue.is_empty() && self.updates.is_empty() && self.inbox.is_empty()
    }

    fn drain_inbox(&mut self, rules: &RuleSet<E>) -> usize {
        let requests = self.inbox.drain();
        for request in &requests {
            match *request {
                Request::Check(index) => {
                    self.schedule_check(index);
                }
                Request::SetBlock { index, block, args } => {
                    self.apply_write(rules, index, block, args);
                    self.notify_neighbours(rules, index);
                }
                Request::Suspend => self.suspend(),
                Request::Resume => self.resume(),
            }
        }
        requests.len()
    }

    fn update_overload(&mut self) {
        let depth = self.queue.len();
        match self.state {
            RunState::Running if depth > self.limits.queue_ceiling => {
                tracing::warn!(
                    queue = depth,
                    ceiling = self.limits.queue_ceiling,
                    recovery = self.limits.recovery_threshold,
                    "physics overloaded; shedding checks until the queue drains"
                );
                self.state = RunState::Overloaded;
                self.stats.record_overload();
            }
            RunState::Overloaded if depth <= self.limits.recovery_threshold => {
                tracing::info!(queue = depth, "physics recovered from overload");
                self.state = RunState::Running;
            }
            _ => {}
        }
    }

    fn dispatch(&mut self, rules: &RuleSet<E>, report: &mut TickReport) {
        let batch = self.queue.take_front(self.limits.max_checks_per_tick.max(1));
        report.deferred = self.queue.len();

        let mut survivors = Vec::with_capacity(batch.len());
        let mut scheduled = Vec::new();

        for mut check in batch {
            report.dispatched += 1;

            let Some(block) = self.world.get_block(check.index) else {
                self.queue.retire(check.index);
                report.retired += 1;
                continue;
            };

            if let Some(chance) = check.data.dissipate {
                if self.rng.gen_range(0..100u32) < u32::from(chance) {
                    self.updates.push(PendingUpdate {
                        index: check.index,
                        block: BlockId::AIR,
                        args: None,
                    });
                    self.queue.retire(check.index);
                    report.retired += 1;
                } else {
                    survivors.push(check);
                }
                continue;
            }

            // Material changed since scheduling, or never had physics.
            let Some(resolver) = rules.resolver(block) else {
                self.queue.retire(check.index);
                report.retired += 1;
                continue;
            };

            let (staged, follow_ups) = (self.updates.len(), scheduled.len());
            let outcome = {
                let mut ctx = TickCtx::new(
                    &self.world,
                    &self.env,
                    &mut self.rng,
                    rules,
                    &mut self.updates,
                    &mut scheduled,
                );
                panic::catch_unwind(AssertUnwindSafe(|| resolver(&mut ctx, &mut check)))
            };

            if let Err(payload) = outcome {
                self.updates.truncate(staged);
                scheduled.truncate(follow_ups);
                self.queue.retire(check.index);
                report.failed += 1;
                let pos = self.world.pos_of(check.index);
                tracing::error!(
                    x = pos.x,
                    y = pos.y,
                    z = pos.z,
                    block = block.0,
                    reason = panic_message(payload.as_ref()),
                    "resolver panicked; check retired"
                );
                continue;
            }

            if check.data.is_retired() {
                self.queue.retire(check.index);
                report.retired += 1;
            } else {
                survivors.push(check);
            }
        }

        for check in survivors {
            self.queue.requeue(check);
        }
        for check in scheduled {
            self.queue.push(check);
        }
    }

    /// Apply every staged write in staging order.
    fn flush(&mut self, rules: &RuleSet<E>) -> usize {
        let updates = self.updates.take();
        updates
            .into_iter()
            .filter(|u| self.apply_write(rules, u.index, u.block, u.args))
            .count()
    }

    /// Write one block and schedule whatever the write provokes. Returns
    /// whether the grid changed.
    fn apply_write(
        &mut self,
        rules: &RuleSet<E>,
        index: CellIndex,
        block: BlockId,
        args: Option<PhysicsArgs>,
    ) -> bool {
        let Some(old) = self.world.set_block(index, block) else {
            return false;
        };
        let changed = old != block;
        if !self.env.physics_enabled() {
            return changed;
        }

        if changed {
            if let Some(hook) = rules.removal_hook(old) {
                for cell in hook(&self.world, &self.env, index) {
                    self.queue.push(Check::new(cell));
                }
            }
        }

        let data = CheckData::from_args(args);
        if rules.has_resolver(block) || data.dissipate.is_some() {
            let check = Check::with_data(index, data);
            if changed {
                // State of a previous material's check means nothing now.
                self.queue.push_or_replace(check);
            } else {
                self.queue.push(check);
            }
        }

        if args == Some(PhysicsArgs::NotifyNeighbours) {
            self.notify_neighbours(rules, index);
        }
        changed
    }

    fn notify_neighbours(&mut self, rules: &RuleSet<E>, index: CellIndex) {
        if !self.env.physics_enabled() {
            return;
        }
        let cells: Vec<CellIndex> = self
            .world
            .neighbors(index)
            .filter(|&n| self.world.get_block(n).is_some_and(|b| rules.has_resolver(b)))
            .collect();
        for cell in cells {
            self.queue.push(Check::new(cell));
        }
    }
}

// ── Parallel execution across worlds ────────────────────────────────────

/// Tick several independent worlds at once. Worlds share nothing but the
/// rule set, so each one still runs its tick sequentially on one thread.
pub fn tick_all<'s, E, I>(schedulers: I, rules: &RuleSet<E>) -> Vec<TickReport>
where
    E: PhysicsEnv + 's,
    I: IntoParallelIterator<Item = &'s mut Scheduler<E>>,
{
    schedulers
        .into_par_iter()
        .map(|scheduler| scheduler.tick(rules))
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
