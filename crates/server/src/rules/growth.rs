//! Grass spreading onto lit dirt, grass dying in the dark, and saplings
//! growing into trees.

use voxflow_engine::physics::check::Check;
use voxflow_engine::world::position::CellIndex;

use super::helpers::{Ctx, light_reaches};
use super::tree;
use crate::block;

/// Dispatches a dirt or grass cell waits before it converts.
pub const GROWTH_THRESHOLD: u8 = 20;

/// Growth steps a sapling needs before it becomes a tree.
pub const SAPLING_STAGES: u8 = 20;

pub fn dirt(ctx: &mut Ctx<'_>, check: &mut Check) {
    convert_after_delay(ctx, check, true);
}

pub fn grass(ctx: &mut Ctx<'_>, check: &mut Check) {
    convert_after_delay(ctx, check, false);
}

/// Dirt under open sky turns to its grass variant; grass under an opaque
/// block turns to its dirt variant.
fn convert_after_delay(ctx: &mut Ctx<'_>, check: &mut Check, to_grass: bool) {
    if !ctx.env.config.grass_growth {
        check.data.retire();
        return;
    }
    if check.data.value <= GROWTH_THRESHOLD {
        check.data.value += 1;
        return;
    }
    check.data.retire();

    let index = check.index;
    let Some(current) = ctx.get(index) else { return };
    let props = &ctx.env.props;
    let lit = light_reaches(ctx, props, index);
    let variant = match (to_grass, lit) {
        (true, true) => props.get(current).grass_variant,
        (false, false) => props.get(current).dirt_variant,
        _ => None,
    };
    if let Some(variant) = variant {
        ctx.add_update(index, variant);
    }
}

pub fn sapling(ctx: &mut Ctx<'_>, check: &mut Check) {
    let index = check.index;
    if ctx.env.advanced() {
        ctx.schedule_neighbours(index);
    }
    if !ctx.env.config.grow_trees {
        check.data.retire();
        return;
    }
    if check.data.value < SAPLING_STAGES {
        if ctx.one_in(20) {
            check.data.value += 1;
        }
        return;
    }

    grow_tree(ctx, index);
    check.data.retire();
}

/// Stage the tree rooted at `origin`. Only air cells (and the sapling's own
/// cell) are overwritten.
fn grow_tree(ctx: &mut Ctx<'_>, origin: CellIndex) {
    let base = ctx.pos(origin);
    let mut parts = Vec::new();
    tree::generate(ctx.env.config.tree_species, &mut *ctx.rng, base, |pos, block| {
        parts.push((pos, block));
    });

    let mut origin_written = false;
    for (pos, part) in parts {
        let Some(cell) = ctx.world.index_of(pos) else { continue };
        if cell == origin {
            origin_written |= ctx.add_update(cell, part);
        } else if ctx.get(cell) == Some(block::AIR) {
            ctx.add_update(cell, part);
        }
    }
    if !origin_written {
        ctx.add_update(origin, block::AIR);
    }
    tracing::debug!(x = base.x, y = base.y, z = base.z, "sapling grew");
}
