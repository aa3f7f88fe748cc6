//! Water and lava spreading.
//!
//! Two strategies, picked per level: uniform flow spreads into all five
//! directions on every dispatch; random flow tries each unfinished direction
//! with a 1-in-4 chance and remembers finished directions in the payload
//! (see [`FlowState`]). Levels with finite liquids hand off to
//! [`finite`](super::finite).

use rand::Rng;
use voxflow_engine::physics::check::Check;
use voxflow_engine::world::block::BlockId;
use voxflow_engine::world::position::CellIndex;

use super::finite;
use super::flow::{DIRECTIONS, FlowState};
use super::helpers::{Ctx, cube};
use crate::block::{self, FAST_LAVA, FLOAT_WOOD, GRAVEL, LAVA, SAND, WATER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liquid {
    Water,
    Lava,
}

impl Liquid {
    pub fn of(id: BlockId) -> Option<Self> {
        if block::is_water(id) {
            Some(Liquid::Water)
        } else if block::is_lava(id) {
            Some(Liquid::Lava)
        } else {
            None
        }
    }

    /// The sponge material that holds this liquid back.
    pub fn sponge(self) -> BlockId {
        match self {
            Liquid::Water => block::SPONGE,
            Liquid::Lava => block::LAVA_SPONGE,
        }
    }

    pub fn matches(self, id: BlockId) -> bool {
        Liquid::of(id) == Some(self)
    }
}

/// A sponge for `liquid` sits within the level's sponge radius of `index`.
pub fn sponged(ctx: &Ctx<'_>, index: CellIndex, liquid: Liquid) -> bool {
    let sponge = liquid.sponge();
    let radius = i32::from(ctx.env.config.sponge_radius);
    cube(ctx.world, index, radius).any(|cell| ctx.get(cell) == Some(sponge))
}

// ── Resolvers ────────────────────────────────────────────────────────────

pub fn water(ctx: &mut Ctx<'_>, check: &mut Check) {
    let (finite, random) = (ctx.env.config.finite(), ctx.env.config.random_flow);
    if finite {
        finite::resolve(ctx, check);
    } else if random {
        flow_randomly(ctx, check, Liquid::Water, true);
    } else {
        flow_uniformly(ctx, check, Liquid::Water, true);
    }
}

/// Lava idles for [`LAVA_DELAY_TICKS`](super::flow::LAVA_DELAY_TICKS)
/// dispatches before each spreading attempt.
pub fn lava(ctx: &mut Ctx<'_>, check: &mut Check) {
    let mut state = FlowState::from_raw(check.data.value);
    let waiting = state.wait_lava_delay();
    check.data.value = state.raw();
    if waiting {
        return;
    }

    let (finite, random) = (ctx.env.config.finite(), ctx.env.config.random_flow);
    if finite {
        finite::resolve(ctx, check);
    } else if random {
        flow_randomly(ctx, check, Liquid::Lava, true);
    } else {
        flow_uniformly(ctx, check, Liquid::Lava, true);
    }
}

/// Lava with no start-up delay that ignores the wait flag. Under random
/// flow a surviving check forgets its direction mask, so every direction
/// is retried on the next dispatch.
pub fn fast_lava(ctx: &mut Ctx<'_>, check: &mut Check) {
    if ctx.env.config.random_flow {
        flow_randomly(ctx, check, Liquid::Lava, false);
        if !check.data.is_retired() {
            check.data.value = 0;
        }
    } else {
        flow_uniformly(ctx, check, Liquid::Lava, false);
    }
}

// ── Strategies ───────────────────────────────────────────────────────────

fn flow_uniformly(ctx: &mut Ctx<'_>, check: &mut Check, liquid: Liquid, honour_wait: bool) {
    let index = check.index;
    if sponged(ctx, index, liquid) {
        ctx.add_update(index, block::AIR);
    } else if let Some(source) = ctx.get(index) {
        if liquid == Liquid::Water {
            nudge_falling_above(ctx, index);
        }
        for &(_, dx, dy, dz) in &DIRECTIONS {
            let target = ctx.offset(index, dx, dy, dz);
            spread(ctx, liquid, target, source);
        }
    }

    if !(honour_wait && check.data.wait) {
        check.data.retire();
    }
}

fn flow_randomly(ctx: &mut Ctx<'_>, check: &mut Check, liquid: Liquid, honour_wait: bool) {
    let index = check.index;
    let keep_alive = honour_wait && check.data.wait;

    if sponged(ctx, index, liquid) {
        ctx.add_update(index, block::AIR);
        if !keep_alive {
            check.data.retire();
        }
        return;
    }
    let Some(source) = ctx.get(index) else {
        check.data.retire();
        return;
    };

    let mut state = FlowState::from_raw(check.data.value);
    match liquid {
        // Re-arm a short random delay before the next attempt.
        Liquid::Lava => state.set_delay(ctx.rng.gen_range(0..3)),
        Liquid::Water => nudge_falling_above(ctx, index),
    }

    for &(dir, dx, dy, dz) in &DIRECTIONS {
        if !state.has_flowed(dir) && ctx.one_in(4) {
            let target = ctx.offset(index, dx, dy, dz);
            spread(ctx, liquid, target, source);
            state.mark(dir);
        }
    }
    for &(dir, dx, dy, dz) in &DIRECTIONS {
        if !state.has_flowed(dir) && is_blocked(ctx, liquid, ctx.offset(index, dx, dy, dz)) {
            state.mark(dir);
        }
    }

    check.data.value = state.raw();
    if !keep_alive && state.is_complete() {
        check.data.retire();
    }
}

// ── Single-cell interactions ─────────────────────────────────────────────

/// Try to move `liquid` (as material `source`) into `target`.
fn spread(ctx: &mut Ctx<'_>, liquid: Liquid, target: Option<CellIndex>, source: BlockId) {
    let Some(target) = target else { return };
    let Some(existing) = ctx.get(target) else { return };
    if ctx.env.config.in_safe_zone(ctx.pos(target)) || ctx.env.props.get(existing).is_portal {
        return;
    }
    let advanced = ctx.env.advanced();

    match (liquid, existing) {
        (_, block::AIR) => {
            if !sponged(ctx, target, liquid) {
                ctx.add_update(target, source);
            }
        }
        (Liquid::Water, LAVA | FAST_LAVA) => {
            if !sponged(ctx, target, liquid) {
                ctx.add_update(target, block::STONE);
            }
        }
        (Liquid::Lava, WATER) => {
            if !sponged(ctx, target, liquid) {
                ctx.add_update(target, block::STONE);
            }
        }
        (Liquid::Lava, SAND) if advanced => {
            ctx.add_update(target, block::GLASS);
        }
        (Liquid::Water, SAND | GRAVEL | FLOAT_WOOD) | (Liquid::Lava, SAND | GRAVEL) => {
            ctx.schedule(target);
        }
        _ => {
            if advanced && kills(ctx, liquid, existing) && !sponged(ctx, target, liquid) {
                ctx.add_update(target, block::AIR);
            }
        }
    }
}

/// Whether `liquid` can never spread into `target` from where it is now.
fn is_blocked(ctx: &Ctx<'_>, liquid: Liquid, target: Option<CellIndex>) -> bool {
    let Some(target) = target else { return true };
    let Some(existing) = ctx.get(target) else {
        return true;
    };
    if ctx.env.config.in_safe_zone(ctx.pos(target)) || ctx.env.props.get(existing).is_portal {
        return true;
    }

    match (liquid, existing) {
        (Liquid::Water, block::AIR | LAVA | FAST_LAVA) => sponged(ctx, target, liquid),
        (Liquid::Lava, block::AIR) => false,
        (Liquid::Lava, WATER) => sponged(ctx, target, liquid),
        (Liquid::Water, SAND | GRAVEL | FLOAT_WOOD) | (Liquid::Lava, SAND | GRAVEL) => false,
        _ => !(ctx.env.advanced() && kills(ctx, liquid, existing) && !sponged(ctx, target, liquid)),
    }
}

fn kills(ctx: &Ctx<'_>, liquid: Liquid, existing: BlockId) -> bool {
    let props = ctx.env.props.get(existing);
    match liquid {
        Liquid::Water => props.killed_by_water,
        Liquid::Lava => props.killed_by_lava,
    }
}

/// Water under sand, gravel or driftwood makes it re-check its support.
fn nudge_falling_above(ctx: &mut Ctx<'_>, index: CellIndex) {
    if let Some(above) = ctx.offset(index, 0, 1, 0) {
        if ctx.get(above).is_some_and(|b| block::has_gravity(b) || b == FLOAT_WOOD) {
            ctx.schedule(above);
        }
    }
}
