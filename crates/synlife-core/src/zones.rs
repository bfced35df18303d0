//! Temperature, shelter and hazard zones
//!
//! Zones are simple planar shapes. The simulation builds a
//! [`ZoneRegistry`] from [`ZonesConfig`] and hands it to every creature
//! update.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use synlife_creature::world_interaction::NEUTRAL_TEMPERATURE;
use synlife_creature::{HazardZone, ShelterZone, TemperatureZone, ZoneRegistry};

use crate::config::ZonesConfig;

/// Distance below which a point counts as inside a temperature zone
const INSIDE_TOLERANCE: f32 = 0.1;

/// Planar region in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZoneShape {
    Circle { center: Vec2, radius: f32 },
    /// Axis-aligned rectangle
    Rect { min: Vec2, max: Vec2 },
}

impl ZoneShape {
    /// Distance from `position` to the shape, zero inside
    pub fn distance(&self, position: Vec2) -> f32 {
        match *self {
            ZoneShape::Circle { center, radius } => {
                (position.distance(center) - radius.abs()).max(0.0)
            }
            ZoneShape::Rect { min, max } => {
                let lo = min.min(max);
                let hi = min.max(max);
                let closest = position.clamp(lo, hi);
                position.distance(closest)
            }
        }
    }

    pub fn contains(&self, position: Vec2) -> bool {
        self.distance(position) <= 0.0
    }
}

/// Region with a fixed temperature that fades to neutral over a transition band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRegion {
    pub shape: ZoneShape,
    pub temperature: f32,
    pub transition_radius: f32,
}

impl TemperatureZone for TemperatureRegion {
    fn temperature_at(&self, position: Vec2) -> f32 {
        let distance = self.shape.distance(position);
        if distance < INSIDE_TOLERANCE {
            self.temperature
        } else if distance < self.transition_radius {
            let t = 1.0 - distance / self.transition_radius;
            NEUTRAL_TEMPERATURE + (self.temperature - NEUTRAL_TEMPERATURE) * t
        } else {
            NEUTRAL_TEMPERATURE
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shelter {
    pub shape: ZoneShape,
}

impl ShelterZone for Shelter {
    fn is_inside(&self, position: Vec2) -> bool {
        self.shape.contains(position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub shape: ZoneShape,
    pub damage_per_second: f32,
}

impl HazardZone for Hazard {
    fn is_inside(&self, position: Vec2) -> bool {
        self.shape.contains(position)
    }

    fn damage_rate(&self) -> f32 {
        self.damage_per_second
    }
}

/// Build the zone registry described by `config`
pub fn build_registry(config: &ZonesConfig) -> ZoneRegistry {
    let mut registry = ZoneRegistry::new();
    for zone in &config.temperature {
        registry.add_temperature_zone(TemperatureRegion {
            shape: zone.shape,
            temperature: zone.temperature.clamp(0.0, 1.0),
            transition_radius: zone.transition_radius.max(0.0),
        });
    }
    for zone in &config.shelters {
        registry.add_shelter(Shelter { shape: zone.shape });
    }
    for zone in &config.hazards {
        registry.add_hazard(Hazard {
            shape: zone.shape,
            damage_per_second: zone.damage_per_second.max(0.0),
        });
    }
    log::debug!("Built zone registry with {} zones", registry.len());
    registry
}
