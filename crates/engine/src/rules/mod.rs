use rand::Rng;

use crate::physics::PhysicsRng;
use crate::physics::buffer::{PendingUpdate, UpdateBuffer};
use crate::physics::check::{Check, CheckData, PhysicsArgs};
use crate::world::World;
use crate::world::block::BlockId;
use crate::world::position::{BlockPos, CellIndex};

/// Per-world settings and tables a rule set reads. Implemented by the game
/// layer.
pub trait PhysicsEnv: Send + Sync {
    /// When `false` the scheduler dispatches nothing and drops its queue.
    fn physics_enabled(&self) -> bool;
}

/// A resolver: evaluate one check against the current (pre-flush) world.
///
/// Resolvers stage writes and follow-on checks through the context and
/// update `check.data` in place. Retiring is done by
/// [`CheckData::retire`]; anything else keeps the check queued for the next
/// tick.
pub type ResolverFn<E> = fn(&mut TickCtx<'_, E>, &mut Check);

/// Called after a write replaces a block of the hooked material. Returns
/// the cells that should be checked next tick.
pub type RemovalFn<E> = fn(&World, &E, CellIndex) -> Vec<CellIndex>;

/// Material-keyed dispatch table.
pub struct RuleSet<E> {
    resolvers: [Option<ResolverFn<E>>; 256],
    removal: [Option<RemovalFn<E>>; 256],
}

impl<E> RuleSet<E> {
    pub fn new() -> Self {
        Self {
            resolvers: [None; 256],
            removal: [None; 256],
        }
    }

    /// Route checks on cells holding `block` to `resolver`, replacing any
    /// previous registration.
    pub fn register(&mut self, block: BlockId, resolver: ResolverFn<E>) {
        self.resolvers[block.index()] = Some(resolver);
    }

    pub fn on_removed(&mut self, block: BlockId, hook: RemovalFn<E>) {
        self.removal[block.index()] = Some(hook);
    }

    #[inline]
    pub fn resolver(&self, block: BlockId) -> Option<ResolverFn<E>> {
        self.resolvers[block.index()]
    }

    #[inline]
    pub fn removal_hook(&self, block: BlockId) -> Option<RemovalFn<E>> {
        self.removal[block.index()]
    }

    #[inline]
    pub fn has_resolver(&self, block: BlockId) -> bool {
        self.resolvers[block.index()].is_some()
    }

    /// Number of materials with a resolver.
    pub fn len(&self) -> usize {
        self.resolvers.iter().filter(|r| r.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for RuleSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a resolver may touch while one check is dispatched.
///
/// The world is read-only here: writes go to the tick's staging buffer and
/// become visible only after the flush, and scheduled checks land in the
/// next tick's queue.
pub struct TickCtx<'a, E> {
    pub world: &'a World,
    pub env: &'a E,
    pub rng: &'a mut PhysicsRng,
    rules: &'a RuleSet<E>,
    updates: &'a mut UpdateBuffer,
    scheduled: &'a mut Vec<Check>,
}

impl<'a, E> TickCtx<'a, E> {
    pub(crate) fn new(
        world: &'a World,
        env: &'a E,
        rng: &'a mut PhysicsRng,
        rules: &'a RuleSet<E>,
        updates: &'a mut UpdateBuffer,
        scheduled: &'a mut Vec<Check>,
    ) -> Self {
        Self {
            world,
            env,
            rng,
            rules,
            updates,
            scheduled,
        }
    }

    #[inline]
    pub fn get(&self, index: CellIndex) -> Option<BlockId> {
        self.world.get_block(index)
    }

    #[inline]
    pub fn pos(&self, index: CellIndex) -> BlockPos {
        self.world.pos_of(index)
    }

    #[inline]
    pub fn offset(&self, index: CellIndex, dx: i32, dy: i32, dz: i32) -> Option<CellIndex> {
        self.world.offset(index, dx, dy, dz)
    }

    /// Roll a `1 / n` chance.
    pub fn one_in(&mut self, n: u32) -> bool {
        self.rng.gen_range(0..n) == 0
    }

    /// Stage a write. Returns `false` if another write already claimed the
    /// cell this tick.
    pub fn add_update(&mut self, index: CellIndex, block: BlockId) -> bool {
        self.updates.push(PendingUpdate {
            index,
            block,
            args: None,
        })
    }

    pub fn add_update_with(&mut self, index: CellIndex, block: BlockId, args: PhysicsArgs) -> bool {
        self.updates.push(PendingUpdate {
            index,
            block,
            args: Some(args),
        })
    }

    /// Whether a write for `index` is already staged this tick.
    pub fn is_claimed(&self, index: CellIndex) -> bool {
        self.updates.is_claimed(index)
    }

    pub fn schedule(&mut self, index: CellIndex) {
        self.scheduled.push(Check::new(index));
    }

    /// Schedule the in-bounds neighbours whose current material has a
    /// resolver.
    pub fn schedule_neighbours(&mut self, index: CellIndex) {
        for n in self.world.neighbors(index) {
            if self.world.get_block(n).is_some_and(|b| self.rules.has_resolver(b)) {
                self.scheduled.push(Check::new(n));
            }
        }
    }

    pub fn has_resolver(&self, block: BlockId) -> bool {
        self.rules.has_resolver(block)
    }
}
