//! Life-event systems - the per-person operations a tick applies
//!
//! Each module extends [`SimulationWorld`](crate::world::SimulationWorld)
//! with one family of operations and declares the design constants it uses.

pub mod aging;
pub mod birth;
pub mod death;
pub mod family;
pub mod matchmaking;

pub use birth::{litter_size, Offspring};
pub use death::death_probability;
