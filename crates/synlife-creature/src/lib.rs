//! Organisms for synlife
//!
//! This crate implements:
//! - Heritable genomes with seeded, range-clamped mutation
//! - Growth through juvenile, adult and elder life stages
//! - Homeostasis of energy, temperature and integrity
//! - Reproduction gated by physiology, cooldown and population capacity
//! - A population registry with deterministic capacity eviction
//! - World access traits for the field, zones and food the organisms consume

pub mod behavior;
pub mod config;
pub mod creature;
pub mod events;
pub mod genome;
pub mod growth;
pub mod homeostasis;
pub mod population;
pub mod reproduction;
pub mod rewards;
pub mod sensors;
pub mod traits;
pub mod types;
pub mod world_interaction;

// Re-export main types for convenience
pub use behavior::{Action, IdlePolicy, MovementIntent, Policy};
pub use config::{CreatureConfig, RewardConfig};
pub use creature::{Creature, Offspring, TickContext, TickOutcome};
pub use events::{EventBuffer, EventKind, EventSink, LifecycleEvent, NoopSink, Tee};
pub use genome::{Genome, GenomeRanges, TraitKind, TraitRange};
pub use growth::{DerivedStats, GrowthSystem, StageTransition};
pub use homeostasis::{Physiology, Surroundings};
pub use population::{Eviction, MutationSeed, PopulationManager, PopulationView, SeedRecord};
pub use reproduction::{Conception, Ineligible, ReproductionController};
pub use sensors::{Observation, OBSERVATION_SIZE};
pub use traits::{FieldAccess, HazardZone, NullField, NutrientSource, ShelterZone, TemperatureZone};
pub use types::{BodyState, DeathCause, EntityId, FoodId, LifeStage, Lineage};
pub use world_interaction::ZoneRegistry;
