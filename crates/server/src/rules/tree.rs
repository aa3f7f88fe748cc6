//! Tree shapes grown from saplings.
//!
//! Generators only describe the tree: they call `place` for every block in
//! trunk-first order and leave it to the caller to decide which cells may
//! be overwritten.

use rand::Rng;
use voxflow_engine::physics::PhysicsRng;
use voxflow_engine::world::block::BlockId;
use voxflow_engine::world::position::BlockPos;

use crate::block::{GREEN, LEAVES, LOG};
use crate::config::TreeSpecies;

pub fn generate(
    species: TreeSpecies,
    rng: &mut PhysicsRng,
    base: BlockPos,
    mut place: impl FnMut(BlockPos, BlockId),
) {
    match species {
        TreeSpecies::Fern => fern(rng, base, &mut place),
        TreeSpecies::Oak => oak(rng, base, &mut place),
        TreeSpecies::Cactus => cactus(rng, base, &mut place),
    }
}

/// The classic tree: a straight trunk under two wide leaf layers and two
/// narrow ones, with some corners randomly missing.
fn fern(rng: &mut PhysicsRng, base: BlockPos, place: &mut impl FnMut(BlockPos, BlockId)) {
    let height: i32 = rng.gen_range(5..8);
    for dy in 0..height {
        place(base.offset(0, dy, 0), LOG);
    }

    for dy in (height - 3)..=height {
        let top_layers = dy >= height - 1;
        let radius: i32 = if top_layers { 1 } else { 2 };
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if dx == 0 && dz == 0 && dy < height {
                    continue;
                }
                let corner = dx.abs() == radius && dz.abs() == radius;
                if corner && (dy == height || rng.gen_bool(0.5)) {
                    continue;
                }
                place(base.offset(dx, dy, dz), LEAVES);
            }
        }
    }
}

/// A shorter trunk under a rounded canopy.
fn oak(rng: &mut PhysicsRng, base: BlockPos, place: &mut impl FnMut(BlockPos, BlockId)) {
    let height: i32 = rng.gen_range(4..7);
    for dy in 0..height {
        place(base.offset(0, dy, 0), LOG);
    }

    let crown = base.offset(0, height - 1, 0);
    for dy in -2..=2 {
        for dz in -2..=2 {
            for dx in -2..=2 {
                let dist = dx * dx + dy * dy + dz * dz;
                if dist > 6 || (dx == 0 && dz == 0 && dy <= 0) {
                    continue;
                }
                if dist > 4 && rng.gen_bool(0.3) {
                    continue;
                }
                place(crown.offset(dx, dy, dz), LEAVES);
            }
        }
    }
}

/// A green column, sometimes with one arm.
fn cactus(rng: &mut PhysicsRng, base: BlockPos, place: &mut impl FnMut(BlockPos, BlockId)) {
    let height: i32 = rng.gen_range(3..6);
    for dy in 0..height {
        place(base.offset(0, dy, 0), GREEN);
    }
    if height < 4 || rng.gen_bool(0.5) {
        return;
    }

    let (dx, dz) = match rng.gen_range(0..4) {
        0 => (1, 0),
        1 => (-1, 0),
        2 => (0, 1),
        _ => (0, -1),
    };
    let joint = base.offset(dx, height / 2, dz);
    place(joint, GREEN);
    place(joint.offset(0, 1, 0), GREEN);
}
