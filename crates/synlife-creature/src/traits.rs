//! World access traits for creature-world interaction
//!
//! These traits define the interface between creatures and the world,
//! allowing the creature crate to stay independent of the field, zone and
//! food implementations that live in `synlife-core`.

use glam::Vec2;

use crate::types::FoodId;

/// Access to the hidden scalar field
pub trait FieldAccess {
    /// Field value at `position` for the current field time
    fn sample(&self, position: Vec2) -> f32;

    /// Field value plus uniform noise in `[-noise_level, noise_level]`
    fn sample_noisy(&mut self, position: Vec2, noise_level: f32) -> f32;

    /// Central-difference gradient `(d/dx, d/dz)`
    fn gradient(&self, position: Vec2) -> Vec2;

    /// Record a scan perturbation at `position`. No-op when disabled.
    fn trigger_back_action(&mut self, position: Vec2);

    fn back_action_enabled(&self) -> bool;
}

/// Region reporting an ambient temperature in `[0, 1]`
pub trait TemperatureZone {
    fn temperature_at(&self, position: Vec2) -> f32;
}

/// Region halving basal drain and doubling regeneration while inside
pub trait ShelterZone {
    fn is_inside(&self, position: Vec2) -> bool;
}

/// Region damaging integrity while inside
pub trait HazardZone {
    fn is_inside(&self, position: Vec2) -> bool;

    /// Integrity damage per second
    fn damage_rate(&self) -> f32;
}

/// Provider of consumable food items
pub trait NutrientSource {
    /// Nutrient value of `item`, `None` if it no longer exists
    fn nutrient_at(&self, item: FoodId) -> Option<f32>;

    /// Remove a consumed item
    fn remove(&mut self, item: FoodId);
}

/// Field that is flat zero and ignores back action
///
/// Useful for tests and for worlds without a field.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullField;

impl FieldAccess for NullField {
    fn sample(&self, _position: Vec2) -> f32 {
        0.0
    }

    fn sample_noisy(&mut self, _position: Vec2, _noise_level: f32) -> f32 {
        0.0
    }

    fn gradient(&self, _position: Vec2) -> Vec2 {
        Vec2::ZERO
    }

    fn trigger_back_action(&mut self, _position: Vec2) {}

    fn back_action_enabled(&self) -> bool {
        false
    }
}
