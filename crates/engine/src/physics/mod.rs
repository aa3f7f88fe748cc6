pub mod buffer;
pub mod check;
pub mod queue;
pub mod scheduler;
pub mod stats;

/// Deterministic generator owned by each world, seeded at load.
pub type PhysicsRng = rand::rngs::StdRng;
