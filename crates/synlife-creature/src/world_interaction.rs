//! Creature-world interaction
//!
//! Handles creature interactions with the arena: zone queries and eating.

use glam::Vec2;

use crate::traits::{FieldAccess, HazardZone, NutrientSource, ShelterZone, TemperatureZone};
use crate::types::FoodId;

/// Ambient temperature with no zone in effect
pub const NEUTRAL_TEMPERATURE: f32 = 0.5;

/// Zone providers owned by the simulation driver and passed into creature updates
#[derive(Default)]
pub struct ZoneRegistry {
    temperature: Vec<Box<dyn TemperatureZone>>,
    shelters: Vec<Box<dyn ShelterZone>>,
    hazards: Vec<Box<dyn HazardZone>>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_temperature_zone(&mut self, zone: impl TemperatureZone + 'static) {
        self.temperature.push(Box::new(zone));
    }

    pub fn add_shelter(&mut self, zone: impl ShelterZone + 'static) {
        self.shelters.push(Box::new(zone));
    }

    pub fn add_hazard(&mut self, zone: impl HazardZone + 'static) {
        self.hazards.push(Box::new(zone));
    }

    pub fn len(&self) -> usize {
        self.temperature.len() + self.shelters.len() + self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ambient temperature at `position`
    ///
    /// Starts from neutral; the single zone reading deviating furthest from
    /// neutral wins. Readings are not averaged.
    pub fn ambient_temperature(&self, position: Vec2) -> f32 {
        let mut ambient = NEUTRAL_TEMPERATURE;
        for zone in &self.temperature {
            let reading = zone.temperature_at(position);
            if !reading.is_finite() {
                continue;
            }
            if (reading - NEUTRAL_TEMPERATURE).abs() > (ambient - NEUTRAL_TEMPERATURE).abs() {
                ambient = reading;
            }
        }
        ambient.clamp(0.0, 1.0)
    }

    pub fn is_sheltered(&self, position: Vec2) -> bool {
        self.shelters.iter().any(|zone| zone.is_inside(position))
    }

    /// Summed damage rate of every hazard containing `position`
    pub fn hazard_damage_rate(&self, position: Vec2) -> f32 {
        self.hazards
            .iter()
            .filter(|zone| zone.is_inside(position))
            .map(|zone| zone.damage_rate().max(0.0))
            .sum()
    }
}

/// Consume a food item at `position`
///
/// The item's nutrient value is scaled by `1 + field_affinity * phi` where
/// `phi` is the field sample at the creature's position, and the item is
/// removed from the source. Returns the (non-negative) energy gained, or
/// `None` if the item no longer exists.
pub fn consume_food(
    source: &mut dyn NutrientSource,
    field: &dyn FieldAccess,
    item: FoodId,
    position: Vec2,
    field_affinity: f32,
) -> Option<f32> {
    let nutrient = source.nutrient_at(item)?;
    source.remove(item);
    let phi = field.sample(position);
    Some((nutrient * (1.0 + field_affinity * phi)).max(0.0))
}
