//! A loaded level: its grid, its configuration, and the scheduler that
//! simulates it.

use std::sync::Arc;

use anyhow::{Context, Result};
use voxflow_engine::physics::check::PhysicsArgs;
use voxflow_engine::physics::queue::{Inbox, Request};
use voxflow_engine::physics::scheduler::{Scheduler, TickReport};
use voxflow_engine::physics::stats::PhysicsStats;
use voxflow_engine::rules::{PhysicsEnv, RuleSet};
use voxflow_engine::world::World;
use voxflow_engine::world::block::BlockId;
use voxflow_engine::world::grid::Dimensions;
use voxflow_engine::world::position::{BlockPos, CellIndex};

use crate::block::{self, PropsTable};
use crate::config::{LevelConfig, Terrain};

/// What the classic rules read besides the grid.
pub struct Environment {
    pub config: LevelConfig,
    pub props: PropsTable,
}

impl Environment {
    pub fn new(config: LevelConfig) -> Self {
        let mut props = PropsTable::classic();
        for &id in &config.portals {
            props.get_mut(BlockId(id)).is_portal = true;
        }
        Self { config, props }
    }

    pub fn advanced(&self) -> bool {
        self.config.advanced()
    }
}

impl PhysicsEnv for Environment {
    fn physics_enabled(&self) -> bool {
        self.config.physics != crate::config::PhysicsLevel::Off
    }
}

pub type LevelRules = RuleSet<Environment>;

/// A named level and its scheduler. Owned by exactly one tick loop.
pub struct Level {
    name: Arc<str>,
    scheduler: Scheduler<Environment>,
}

impl Level {
    pub fn load(config: LevelConfig) -> Result<Self> {
        config.validate()?;
        let dims = Dimensions::new(config.width, config.height, config.length);
        let mut world = World::new(dims)
            .with_context(|| format!("failed to create level '{}'", config.name))?;
        generate(&mut world, config.terrain);

        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        let limits = config.limits();
        let name: Arc<str> = Arc::from(config.name.as_str());

        tracing::info!(
            level = %name,
            width = dims.width,
            height = dims.height,
            length = dims.length,
            physics = ?config.physics,
            seed,
            "level loaded"
        );

        Ok(Self {
            name,
            scheduler: Scheduler::new(world, Environment::new(config), seed).with_limits(limits),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &LevelConfig {
        &self.scheduler.env().config
    }

    /// Change the configuration in place (e.g. a map-settings command).
    pub fn reconfigure(&mut self, config: LevelConfig) -> Result<()> {
        config.validate()?;
        self.scheduler.set_limits(config.limits());
        *self.scheduler.env_mut() = Environment::new(config);
        Ok(())
    }

    pub fn scheduler(&self) -> &Scheduler<Environment> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<Environment> {
        &mut self.scheduler
    }

    pub fn world(&self) -> &World {
        self.scheduler.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.scheduler.world_mut()
    }

    pub fn block_at(&self, pos: BlockPos) -> Option<BlockId> {
        self.world().get_block_at(pos)
    }

    pub fn index_of(&self, pos: BlockPos) -> Option<CellIndex> {
        self.world().index_of(pos)
    }

    /// Write a block directly, outside any tick. Returns `false` if `pos` is
    /// outside the level.
    pub fn set_block(&mut self, rules: &LevelRules, pos: BlockPos, block: BlockId) -> bool {
        match self.index_of(pos) {
            Some(index) => self.scheduler.set_block(rules, index, block),
            None => false,
        }
    }

    /// Schedule a check directly, outside any tick.
    pub fn schedule_check(&mut self, pos: BlockPos) -> bool {
        match self.index_of(pos) {
            Some(index) => self.scheduler.schedule_check(index),
            None => false,
        }
    }

    pub fn tick(&mut self, rules: &LevelRules) -> TickReport {
        self.scheduler.tick(rules)
    }

    pub fn run_until_quiet(&mut self, rules: &LevelRules, max_ticks: usize) -> usize {
        self.scheduler.run_until_quiet(rules, max_ticks)
    }

    /// Thread-safe handle for external actors.
    pub fn handle(&self) -> LevelHandle {
        LevelHandle {
            name: Arc::clone(&self.name),
            dims: self.world().dims(),
            inbox: self.scheduler.inbox(),
            stats: self.scheduler.stats(),
        }
    }
}

/// The interface other subsystems (players, game modes, operators) use to
/// feed a level running on another thread. Requests take effect at the
/// start of the level's next tick.
#[derive(Clone)]
pub struct LevelHandle {
    name: Arc<str>,
    dims: Dimensions,
    inbox: Arc<Inbox>,
    stats: Arc<PhysicsStats>,
}

impl LevelHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Returns `false` if `pos` is outside the level.
    pub fn schedule_check(&self, pos: BlockPos) -> bool {
        match self.dims.index_of(pos) {
            Some(index) => {
                self.inbox.schedule_check(index);
                true
            }
            None => false,
        }
    }

    /// Schedule many cells; out-of-bounds positions are skipped. Returns how
    /// many were submitted.
    pub fn schedule_check_batch(&self, positions: impl IntoIterator<Item = BlockPos>) -> usize {
        let indices: Vec<CellIndex> = positions
            .into_iter()
            .filter_map(|p| self.dims.index_of(p))
            .collect();
        let n = indices.len();
        self.inbox.schedule_check_batch(indices);
        n
    }

    /// Place or break a block as a player would.
    pub fn set_block(&self, pos: BlockPos, block: BlockId) -> bool {
        self.submit_write(pos, block, None)
    }

    /// Place a block that turns back into air with `chance`% probability on
    /// every tick.
    pub fn place_transient(&self, pos: BlockPos, block: BlockId, chance: u8) -> bool {
        self.submit_write(pos, block, Some(PhysicsArgs::Dissipate { chance }))
    }

    /// Place a block with explicit physics arguments, e.g.
    /// [`PhysicsArgs::Wait`] to keep a liquid source alive.
    pub fn set_block_with(&self, pos: BlockPos, block: BlockId, args: PhysicsArgs) -> bool {
        self.submit_write(pos, block, Some(args))
    }

    fn submit_write(&self, pos: BlockPos, block: BlockId, args: Option<PhysicsArgs>) -> bool {
        match self.dims.index_of(pos) {
            Some(index) => {
                self.inbox.submit(Request::SetBlock { index, block, args });
                true
            }
            None => false,
        }
    }

    pub fn suspend(&self) {
        self.inbox.submit(Request::Suspend);
    }

    pub fn resume(&self) {
        self.inbox.submit(Request::Resume);
    }

    /// Queue length as of the level's last tick.
    pub fn queue_depth(&self) -> u64 {
        self.stats.queue_depth()
    }

    pub fn is_overloaded(&self) -> bool {
        self.stats.is_overloaded()
    }

    pub fn stats(&self) -> &Arc<PhysicsStats> {
        &self.stats
    }
}

fn generate(world: &mut World, terrain: Terrain) {
    match terrain {
        Terrain::Empty => {}
        Terrain::Flat { ground } => {
            let dims = world.dims();
            let (w, l) = (dims.width as i32 - 1, dims.length as i32 - 1);
            let ground = i32::from(ground).min(dims.height as i32 - 1);
            world.fill(BlockPos::new(0, 0, 0), BlockPos::new(w, 0, l), block::BEDROCK);
            if ground > 1 {
                world.fill(BlockPos::new(0, 1, 0), BlockPos::new(w, ground - 1, l), block::STONE);
            }
            if ground > 0 {
                world.fill(BlockPos::new(0, ground, 0), BlockPos::new(w, ground, l), block::DIRT);
            }
        }
    }
}
