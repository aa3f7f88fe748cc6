//! Neighbourhood helpers shared by the classic resolvers.

use voxflow_engine::rules::TickCtx;
use voxflow_engine::world::World;
use voxflow_engine::world::block::BlockId;
use voxflow_engine::world::position::CellIndex;

use crate::block::{self, PropsTable};
use crate::level::Environment;

pub type Ctx<'a> = TickCtx<'a, Environment>;

/// Every in-bounds cell of the cube of half-width `radius` around `center`,
/// `center` included.
pub fn cube(world: &World, center: CellIndex, radius: i32) -> impl Iterator<Item = CellIndex> + '_ {
    offsets(radius).filter_map(move |(dx, dy, dz)| world.offset(center, dx, dy, dz))
}

/// Only the outer face cells of that cube.
pub fn shell(world: &World, center: CellIndex, radius: i32) -> impl Iterator<Item = CellIndex> + '_ {
    offsets(radius)
        .filter(move |(dx, dy, dz)| dx.abs() == radius || dy.abs() == radius || dz.abs() == radius)
        .filter_map(move |(dx, dy, dz)| world.offset(center, dx, dy, dz))
}

fn offsets(r: i32) -> impl Iterator<Item = (i32, i32, i32)> {
    (-r..=r).flat_map(move |dy| (-r..=r).flat_map(move |dz| (-r..=r).map(move |dx| (dx, dy, dz))))
}

/// The block above `index`, or `None` at the top of the world.
pub fn above(ctx: &Ctx<'_>, index: CellIndex) -> Option<BlockId> {
    ctx.offset(index, 0, 1, 0).and_then(|i| ctx.get(i))
}

/// Whether light reaches `index` from above. The sky counts as open.
pub fn light_reaches(ctx: &Ctx<'_>, props: &PropsTable, index: CellIndex) -> bool {
    above(ctx, index).is_none_or(|b| props.get(b).light_passes)
}

/// Cell `index` holds air and nothing has claimed it this tick.
pub fn is_free_air(ctx: &Ctx<'_>, index: CellIndex) -> bool {
    ctx.get(index) == Some(block::AIR) && !ctx.is_claimed(index)
}
