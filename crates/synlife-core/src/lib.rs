pub mod config;
pub mod field;
pub mod food;
pub mod motion;
pub mod simulation;
pub mod telemetry;
pub mod zones;

pub use config::{ConfigError, SimulationConfig};
pub use field::PhiField;
pub use food::{FoodItem, FoodStore};
pub use motion::{KinematicMover, MovementProvider};
pub use simulation::{Simulation, TickReport};
pub use telemetry::{EpisodeSummary, EpisodeTracker, LineageTree};

// Re-export the organism crate
pub mod creature {
    pub use synlife_creature::*;
}
