//! Simulation configuration - serializable parameters for a run
//!
//! Every record has compiled defaults and round-trips through RON so runs
//! can be described by preset files.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use synlife_creature::{CreatureConfig, GenomeRanges, RewardConfig};

use crate::zones::ZoneShape;

/// Errors raised while loading or saving configuration presets
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read preset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse preset: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize preset: {0}")]
    Serialize(#[from] ron::Error),
}

/// Hidden scalar field parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhiFieldConfig {
    /// Spatial frequency of the noise
    pub scale: f32,
    /// Drift of the noise domain per second along x
    pub speed_x: f32,
    /// Drift of the noise domain per second along z
    pub speed_y: f32,
    pub amplitude: f32,
    pub seed: i32,

    pub enable_back_action: bool,
    pub back_action_radius: f32,
    /// Seconds a scan perturbation lasts
    pub back_action_duration: f32,
    /// Field multiplier at the centre of a fresh perturbation
    pub back_action_damping: f32,
}

impl Default for PhiFieldConfig {
    fn default() -> Self {
        Self {
            scale: 0.1,
            speed_x: 0.01,
            speed_y: 0.01,
            amplitude: 1.0,
            seed: 42,
            enable_back_action: false,
            back_action_radius: 5.0,
            back_action_duration: 2.0,
            back_action_damping: 0.5,
        }
    }
}

/// Population capacity and founder count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub capacity: usize,
    pub initial_population: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            initial_population: 10,
        }
    }
}

/// Square arena centred on the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Edge length
    pub size: f32,
    /// Distance at which a creature overlaps a food item
    pub eat_radius: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            size: 50.0,
            eat_radius: 1.0,
        }
    }
}

impl ArenaConfig {
    pub fn half_extent(&self) -> f32 {
        self.size.abs() * 0.5
    }

    /// Clamp a position into the arena
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        let h = self.half_extent();
        position.clamp(Vec2::splat(-h), Vec2::splat(h))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureZoneConfig {
    pub shape: ZoneShape,
    pub temperature: f32,
    pub transition_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterZoneConfig {
    pub shape: ZoneShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardZoneConfig {
    pub shape: ZoneShape,
    pub damage_per_second: f32,
}

/// Zones placed in the arena
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonesConfig {
    pub temperature: Vec<TemperatureZoneConfig>,
    pub shelters: Vec<ShelterZoneConfig>,
    pub hazards: Vec<HazardZoneConfig>,
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Run seed for founders, mutation seeds and replay
    pub seed: u64,
    pub creature: CreatureConfig,
    pub rewards: RewardConfig,
    pub genome_ranges: GenomeRanges,
    pub phi_field: PhiFieldConfig,
    pub population: PopulationConfig,
    pub arena: ArenaConfig,
    pub zones: ZonesConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            creature: CreatureConfig::default(),
            rewards: RewardConfig::default(),
            genome_ranges: GenomeRanges::default(),
            phi_field: PhiFieldConfig::default(),
            population: PopulationConfig::default(),
            arena: ArenaConfig::default(),
            zones: ZonesConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Load a RON preset from disk
    pub fn load_preset(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_ron_str(&source)?;
        log::info!("Loaded simulation preset from {}", path.display());
        Ok(config)
    }

    /// Copy with degenerate values clamped to safe ones
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        config.creature = config.creature.sanitized();
        config.population.capacity = config.population.capacity.max(1);
        config.arena.size = config.arena.size.abs();
        config.arena.eat_radius = config.arena.eat_radius.max(0.0);
        config.phi_field.back_action_radius = config.phi_field.back_action_radius.max(0.0);
        config.phi_field.back_action_duration = config.phi_field.back_action_duration.max(0.0);
        config
    }

    /// Small arena with one zone of each kind
    pub fn demo() -> Self {
        Self {
            phi_field: PhiFieldConfig {
                enable_back_action: true,
                ..PhiFieldConfig::default()
            },
            zones: ZonesConfig {
                temperature: vec![
                    TemperatureZoneConfig {
                        shape: ZoneShape::Rect {
                            min: Vec2::new(-25.0, 15.0),
                            max: Vec2::new(25.0, 25.0),
                        },
                        temperature: 0.9,
                        transition_radius: 5.0,
                    },
                    TemperatureZoneConfig {
                        shape: ZoneShape::Rect {
                            min: Vec2::new(-25.0, -25.0),
                            max: Vec2::new(25.0, -15.0),
                        },
                        temperature: 0.1,
                        transition_radius: 5.0,
                    },
                ],
                shelters: vec![ShelterZoneConfig {
                    shape: ZoneShape::Circle {
                        center: Vec2::new(-15.0, 0.0),
                        radius: 4.0,
                    },
                }],
                hazards: vec![HazardZoneConfig {
                    shape: ZoneShape::Circle {
                        center: Vec2::new(15.0, 0.0),
                        radius: 3.0,
                    },
                    damage_per_second: 0.1,
                }],
            },
            ..Self::default()
        }
    }
}
