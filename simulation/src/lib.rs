//! Kinship Simulation Engine
//!
//! Simulates a population year by year through marriage, procreation and
//! death, growing a graph of family and social relationships. Used offline to
//! generate inhabitants and family trees for role-playing-game worlds.
//!
//! ```no_run
//! use simulation::{SimConfig, SimulationWorld};
//!
//! let mut world = SimulationWorld::new(SimConfig::default())?;
//! world.seed_population(100)?;
//! let reports = world.run(180)?;
//! println!("{} people lived over {} years", world.len(), reports.len());
//! # Ok::<(), simulation::SimError>(())
//! ```

pub mod components;
pub mod config;
pub mod error;
pub mod names;
pub mod relationships;
pub mod systems;
pub mod world;

pub use components::*;
pub use config::{LifeRules, RngMode, SimConfig};
pub use error::{NameError, SimError};
pub use names::{NameSource, SyllableNames};
pub use relationships::{Bond, Relationship, RelationshipKind, Relationships};
pub use systems::Offspring;
pub use world::{PersonRecord, PersonSpec, SimulationWorld, TickReport};
