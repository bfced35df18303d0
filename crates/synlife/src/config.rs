//! Runner configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `synlife.ron` file (if exists), or the file passed with `--config`
//! 3. Environment variables prefixed with `SYNLIFE_`
//! 4. Command-line flags, applied by `main`
//!
//! Example environment variable: `SYNLIFE_RUN__TICKS=5000`
//!
//! The simulation itself is described by a RON preset (see
//! [`SimulationConfig::load_preset`]); this file only picks the preset and
//! overrides a few of its scalars.

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use synlife_core::SimulationConfig;

/// Main runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RunConfig {
    #[serde(default)]
    pub run: RunSettings,

    #[serde(default)]
    pub preset: PresetConfig,

    #[serde(default)]
    pub food: FoodSpawnerConfig,

    #[serde(default)]
    pub policy: WanderConfig,
}

/// Tick loop settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunSettings {
    pub ticks: u64,
    /// Seconds per tick
    pub dt: f32,
    /// Ticks between progress log lines, 0 disables them
    pub report_interval: u64,
    /// Stop early once every creature is dead
    pub stop_on_extinction: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            ticks: 1000,
            dt: 0.1,
            report_interval: 100,
            stop_on_extinction: true,
        }
    }
}

/// Which simulation preset to run and scalar overrides on top of it
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PresetConfig {
    /// RON preset file; the compiled defaults are used when unset
    pub path: Option<String>,
    /// Use the built-in demo arena instead of the defaults
    pub demo: bool,
    pub seed: Option<u64>,
    pub capacity: Option<usize>,
    pub initial_population: Option<usize>,
}

impl PresetConfig {
    /// Resolve the simulation configuration this preset describes
    pub fn resolve(&self) -> Result<SimulationConfig> {
        let mut config = match (&self.path, self.demo) {
            (Some(path), _) => SimulationConfig::load_preset(path)
                .with_context(|| format!("Failed to load preset {}", path))?,
            (None, true) => SimulationConfig::demo(),
            (None, false) => SimulationConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(capacity) = self.capacity {
            config.population.capacity = capacity;
        }
        if let Some(initial) = self.initial_population {
            config.population.initial_population = initial;
        }
        Ok(config)
    }
}

/// Food replenishment: one placement attempt per interval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FoodSpawnerConfig {
    pub enabled: bool,
    pub max_items: usize,
    /// Seconds between placement attempts
    pub spawn_interval: f32,
    /// Attempts closer than this to existing food are skipped
    pub min_distance: f32,
    pub base_nutrient: f32,
    /// Nutrient scaling with the field value at the spawn point
    pub phi_multiplier: f32,
    /// Items placed before the first tick
    pub initial_items: usize,
}

impl Default for FoodSpawnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items: 50,
            spawn_interval: 2.0,
            min_distance: 5.0,
            base_nutrient: 10.0,
            phi_multiplier: 0.5,
            initial_items: 20,
        }
    }
}

/// Built-in wandering policy settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WanderConfig {
    /// Maximum random turn intent per tick
    pub turn_noise: f32,
    /// Weight of the sensed field gradient in the turn intent
    pub gradient_weight: f32,
    pub scan_probability: f64,
    /// Normalised energy above which reproduction is requested
    pub reproduce_energy: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            turn_noise: 0.5,
            gradient_weight: 1.0,
            scan_probability: 0.1,
            reproduce_energy: 0.75,
        }
    }
}

impl RunConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `synlife.ron` in the working directory, or `path` if given
    /// 3. Environment variables prefixed with `SYNLIFE_` (highest priority)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("synlife")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("run.ticks", 1000_i64)?
            .set_default("run.dt", 0.1)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (SYNLIFE_RUN__TICKS, etc.)
            .add_source(
                Environment::with_prefix("SYNLIFE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
