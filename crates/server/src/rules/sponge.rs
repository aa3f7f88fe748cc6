//! Sponges clear nearby liquid when placed and let it back in when removed.

use voxflow_engine::physics::check::Check;
use voxflow_engine::world::World;
use voxflow_engine::world::position::CellIndex;

use super::helpers::{Ctx, cube, shell};
use super::liquid::Liquid;
use crate::block;
use crate::level::Environment;

/// Half-width of the cube a freshly placed sponge empties.
pub const ABSORB_RADIUS: i32 = 2;

/// Removing a sponge re-checks liquid on the shell just outside the area it
/// was holding dry.
pub const REACTIVATE_RADIUS: i32 = 3;

pub fn absorb_water(ctx: &mut Ctx<'_>, check: &mut Check) {
    absorb(ctx, check, Liquid::Water);
}

pub fn absorb_lava(ctx: &mut Ctx<'_>, check: &mut Check) {
    absorb(ctx, check, Liquid::Lava);
}

fn absorb(ctx: &mut Ctx<'_>, check: &mut Check, liquid: Liquid) {
    let cells: Vec<CellIndex> = cube(ctx.world, check.index, ABSORB_RADIUS)
        .filter(|&cell| ctx.get(cell).is_some_and(|b| liquid.matches(b)))
        .collect();
    for cell in cells {
        ctx.add_update(cell, block::AIR);
    }
    check.data.retire();
}

pub fn water_sponge_removed(world: &World, _env: &Environment, index: CellIndex) -> Vec<CellIndex> {
    reactivate(world, index, Liquid::Water)
}

pub fn lava_sponge_removed(world: &World, _env: &Environment, index: CellIndex) -> Vec<CellIndex> {
    reactivate(world, index, Liquid::Lava)
}

fn reactivate(world: &World, index: CellIndex, liquid: Liquid) -> Vec<CellIndex> {
    shell(world, index, REACTIVATE_RADIUS)
        .filter(|&cell| world.get_block(cell).is_some_and(|b| liquid.matches(b)))
        .collect()
}
