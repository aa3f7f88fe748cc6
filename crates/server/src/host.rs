//! Owner of every loaded level.
//!
//! Levels are independent: each has its own grid, queue and RNG, so a host
//! tick advances all of them in parallel on the rayon pool.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, bail};
use slotmap::{SlotMap, new_key_type};
use voxflow_engine::physics::scheduler::{self, TickReport};

use crate::config::LevelConfig;
use crate::level::{Level, LevelHandle, LevelRules};
use crate::metrics::Metrics;
use crate::rules;

new_key_type! {
    /// Handle to a level loaded into a [`PhysicsHost`].
    pub struct WorldId;
}

pub struct PhysicsHost {
    levels: SlotMap<WorldId, Level>,
    rules: LevelRules,
    metrics: Arc<Metrics>,
}

impl PhysicsHost {
    /// A host running the classic rule set.
    pub fn new() -> Self {
        Self::with_rules(rules::standard())
    }

    pub fn with_rules(rules: LevelRules) -> Self {
        Self {
            levels: SlotMap::with_key(),
            rules,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn rules(&self) -> &LevelRules {
        &self.rules
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn load(&mut self, config: LevelConfig) -> Result<WorldId> {
        if self.find(&config.name).is_some() {
            bail!("level '{}' is already loaded", config.name);
        }
        let level = Level::load(config)?;
        self.metrics
            .register(Arc::from(level.name()), level.scheduler().stats());
        Ok(self.levels.insert(level))
    }

    /// Unload a level. Its pending checks are discarded.
    pub fn unload(&mut self, id: WorldId) -> Option<Level> {
        let level = self.levels.remove(id)?;
        self.metrics.unregister(level.name());
        tracing::info!(
            level = level.name(),
            discarded = level.scheduler().queue().len(),
            "level unloaded"
        );
        Some(level)
    }

    pub fn get(&self, id: WorldId) -> Option<&Level> {
        self.levels.get(id)
    }

    pub fn get_mut(&mut self, id: WorldId) -> Option<&mut Level> {
        self.levels.get_mut(id)
    }

    pub fn find(&self, name: &str) -> Option<WorldId> {
        self.levels
            .iter()
            .find(|(_, level)| level.name() == name)
            .map(|(id, _)| id)
    }

    pub fn handle(&self, id: WorldId) -> Option<LevelHandle> {
        self.levels.get(id).map(Level::handle)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = WorldId> + '_ {
        self.levels.keys()
    }

    /// Tick every level once, in parallel.
    pub fn tick_all(&mut self) -> Vec<(WorldId, TickReport)> {
        let started = Instant::now();
        let (ids, schedulers): (Vec<WorldId>, Vec<_>) = self
            .levels
            .iter_mut()
            .map(|(id, level)| (id, level.scheduler_mut()))
            .unzip();
        let reports = scheduler::tick_all(schedulers, &self.rules);
        self.metrics.record_host_tick(started.elapsed());
        ids.into_iter().zip(reports).collect()
    }

    /// Tick until every level is quiet or `max_ticks` is reached. Returns
    /// the number of host ticks run.
    pub fn run_until_quiet(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && !self.is_quiet() {
            self.tick_all();
            ticks += 1;
        }
        ticks
    }

    pub fn is_quiet(&self) -> bool {
        self.levels.values().all(|level| level.scheduler().is_quiet())
    }
}

impl Default for PhysicsHost {
    fn default() -> Self {
        Self::new()
    }
}
