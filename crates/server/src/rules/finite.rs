//! Finite liquids: every unit of liquid is conserved.
//!
//! A unit never duplicates. It moves by writing itself into one open cell
//! and air into its origin within the same tick, or stays put. Units that
//! find nowhere to go for [`MAX_IDLE`] dispatches settle and retire.

use rand::seq::SliceRandom;
use voxflow_engine::physics::check::Check;
use voxflow_engine::world::block::BlockId;
use voxflow_engine::world::position::CellIndex;

use super::helpers::{Ctx, is_free_air};
use super::liquid::Liquid;
use crate::block;

pub const MAX_IDLE: u8 = 10;

/// Idle counter lives in the low bits; lava keeps its delay in the top bits.
const IDLE_MASK: u8 = 0x1F;

const SIDES: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub fn resolve(ctx: &mut Ctx<'_>, check: &mut Check) {
    let origin = check.index;
    let Some(unit) = ctx.get(origin) else {
        check.data.retire();
        return;
    };
    // Something else is rewriting this cell this tick; try again next tick.
    if ctx.is_claimed(origin) {
        return;
    }

    if let Some(dest) = destination(ctx, origin, unit) {
        ctx.add_update(dest, unit);
        ctx.add_update(origin, block::AIR);
        ctx.schedule_neighbours(origin);
        check.data.retire();
        return;
    }

    let idle = (check.data.value & IDLE_MASK) + 1;
    if idle >= MAX_IDLE {
        check.data.retire();
    } else {
        check.data.value = (check.data.value & !IDLE_MASK) | idle;
    }
}

/// Where the unit at `origin` goes this tick: straight down if possible,
/// then towards a side cell that has a drop below it, then sideways only
/// when more of the same liquid presses from above.
fn destination(ctx: &mut Ctx<'_>, origin: CellIndex, unit: BlockId) -> Option<CellIndex> {
    if let Some(below) = ctx.offset(origin, 0, -1, 0) {
        if open(ctx, below) {
            return Some(below);
        }
    }

    let mut sides: Vec<CellIndex> = SIDES
        .iter()
        .filter_map(|&(dx, dz)| ctx.offset(origin, dx, 0, dz))
        .filter(|&cell| open(ctx, cell))
        .collect();
    if sides.is_empty() {
        return None;
    }
    sides.shuffle(&mut *ctx.rng);

    let edge = sides.iter().copied().find(|&side| {
        ctx.offset(side, 0, -1, 0).is_some_and(|below| open(ctx, below))
    });
    if edge.is_some() {
        return edge;
    }

    let liquid = Liquid::of(unit);
    let pressed = ctx
        .offset(origin, 0, 1, 0)
        .and_then(|above| ctx.get(above))
        .is_some_and(|above| liquid.is_some_and(|l| l.matches(above)));
    if pressed { sides.first().copied() } else { None }
}

fn open(ctx: &Ctx<'_>, cell: CellIndex) -> bool {
    is_free_air(ctx, cell) && !ctx.env.config.in_safe_zone(ctx.pos(cell))
}
