//! Sand and gravel.

use voxflow_engine::physics::check::{Check, PhysicsArgs};

use super::helpers::Ctx;
use crate::block::{self, is_crushable, is_open};

/// Simple physics drops the block straight onto the first solid cell below.
/// Advanced physics moves it one cell per dispatch and lets it crush
/// saplings, flowers and mushrooms on the way.
pub fn resolve(ctx: &mut Ctx<'_>, check: &mut Check) {
    check.data.retire();
    let origin = check.index;
    let Some(falling) = ctx.get(origin) else { return };
    let advanced = ctx.env.advanced();

    let mut landing = None;
    let mut cursor = origin;
    while let Some(below) = ctx.offset(cursor, 0, -1, 0) {
        let Some(under) = ctx.get(below) else { break };
        if !(is_open(under) || (advanced && is_crushable(under))) {
            break;
        }
        landing = Some(below);
        cursor = below;
        if advanced {
            break;
        }
    }
    let Some(landing) = landing else { return };

    if ctx.is_claimed(origin) || ctx.is_claimed(landing) {
        ctx.schedule(origin);
        return;
    }
    ctx.add_update(origin, block::AIR);
    ctx.add_update_with(landing, falling, PhysicsArgs::NotifyNeighbours);
    ctx.schedule_neighbours(origin);
}
