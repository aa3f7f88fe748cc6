//! Classic block physics on top of `voxflow-engine`: block ids and
//! properties, level configuration, the resolver set (liquids, falling
//! blocks, sponges, growth, trees) and the runtime that ticks levels.

pub mod block;
pub mod config;
pub mod event_bus;
pub mod host;
pub mod level;
pub mod metrics;
pub mod rules;
pub mod simulation;
