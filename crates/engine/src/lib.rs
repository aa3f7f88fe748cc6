//! Tick-driven block physics for bounded voxel worlds.
//!
//! A [`Scheduler`](physics::scheduler::Scheduler) owns one world and its
//! pending checks. Each tick it dispatches queued checks to the resolver
//! registered for the material in the checked cell, stages every write the
//! resolvers produce, and flushes the staged writes once dispatch is over.
//! Block semantics live entirely in the [`RuleSet`](rules::RuleSet) supplied
//! by the game layer.

pub mod physics;
pub mod rules;
pub mod world;
