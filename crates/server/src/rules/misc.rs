//! Driftwood and small plants.

use voxflow_engine::physics::check::Check;

use super::helpers::{Ctx, above, is_free_air};
use crate::block::{self, FLOAT_WOOD};

/// Driftwood sinks through air and floats up through water, one cell per
/// dispatch.
pub fn float_wood(ctx: &mut Ctx<'_>, check: &mut Check) {
    check.data.retire();
    let origin = check.index;
    if ctx.is_claimed(origin) {
        return;
    }

    if let Some(below) = ctx.offset(origin, 0, -1, 0) {
        if is_free_air(ctx, below) {
            ctx.add_update(origin, block::AIR);
            ctx.add_update(below, FLOAT_WOOD);
            return;
        }
    }

    let Some(up) = ctx.offset(origin, 0, 1, 0) else { return };
    if let Some(liquid) = above(ctx, origin).filter(|&b| block::is_water(b)) {
        if !ctx.is_claimed(up) {
            ctx.add_update(origin, liquid);
            ctx.add_update(up, FLOAT_WOOD);
        }
    }
}

/// Flowers, mushrooms and other plants only pass updates on.
pub fn plant(ctx: &mut Ctx<'_>, check: &mut Check) {
    if ctx.env.advanced() {
        ctx.schedule_neighbours(check.index);
    }
    check.data.retire();
}
