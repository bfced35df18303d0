//! # synlife - headless organism simulation
//!
//! Runner for the `synlife-core` simulation: layered configuration, a seeded
//! wandering policy and food replenishment.

pub mod config;
pub mod headless;
pub mod policy;

// Re-export core modules for convenience
pub use synlife_core::creature;
pub use synlife_core::{Simulation, SimulationConfig};
