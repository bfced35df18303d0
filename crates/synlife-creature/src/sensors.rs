//! Sensory systems for creatures
//!
//! Builds the normalized observation vector handed to the external policy.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::CreatureConfig;
use crate::growth::GrowthSystem;
use crate::homeostasis::Physiology;
use crate::traits::FieldAccess;
use crate::types::BodyState;

/// Number of values in [`Observation::to_array`]
pub const OBSERVATION_SIZE: usize = 17;

const SCANNED_NOISE: f32 = 0.05;
const UNSCANNED_NOISE: f32 = 0.2;

/// Complete sensory input
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    /// Energy as a fraction of capacity, 0-1
    pub energy: f32,
    pub temperature: f32,
    pub integrity: f32,
    /// Age as a fraction of maximum age, 0-1
    pub age: f32,
    /// Size gained as a fraction of maximum growth, 0-1
    pub size: f32,
    pub stage: [f32; 3],
    /// Noisy field reading; less noisy after a scan and with better antennae
    pub phi: f32,
    /// Field gradient, zero unless the creature scanned last step
    pub phi_gradient: Vec2,
    /// Velocity divided by move speed
    pub velocity: Vec2,
    pub heading: Vec2,
    /// Remaining cooldown as a fraction of the configured cooldown, 0-1
    pub cooldown: f32,
    pub sheltered: f32,
}

/// Per-creature sensing state carried between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub scanned_last_step: bool,
    pub last_phi: f32,
}

fn fraction(value: f32, denominator: f32) -> f32 {
    if denominator > 0.0 {
        (value / denominator).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl Observation {
    /// Gather the observation for a creature at `body`
    ///
    /// Draws one noisy field sample, recorded in `sensors.last_phi`.
    #[allow(clippy::too_many_arguments)]
    pub fn gather(
        physiology: &Physiology,
        growth: &GrowthSystem,
        reproduction_cooldown: f32,
        config: &CreatureConfig,
        body: &BodyState,
        sheltered: bool,
        field: &mut dyn FieldAccess,
        sensors: &mut SensorState,
    ) -> Self {
        let antenna = growth.genome().antenna_gain * growth.size;
        let base_noise = if sensors.scanned_last_step {
            SCANNED_NOISE
        } else {
            UNSCANNED_NOISE
        };
        let noise = if antenna > 0.0 {
            base_noise / antenna
        } else {
            base_noise
        };
        let phi = field.sample_noisy(body.position, noise);
        sensors.last_phi = phi;

        let phi_gradient = if sensors.scanned_last_step {
            field.gradient(body.position)
        } else {
            Vec2::ZERO
        };

        let velocity = if config.move_speed > 0.0 {
            body.velocity / config.move_speed
        } else {
            Vec2::ZERO
        };

        Self {
            energy: fraction(physiology.energy, growth.stats().max_energy),
            temperature: physiology.temperature,
            integrity: physiology.integrity,
            age: fraction(growth.age, growth.max_age().unwrap_or(0.0)),
            size: fraction(growth.size - 1.0, config.max_growth),
            stage: growth.stage.one_hot(),
            phi,
            phi_gradient,
            velocity,
            heading: body.heading,
            cooldown: fraction(reproduction_cooldown, config.reproduction_cooldown),
            sheltered: if sheltered { 1.0 } else { 0.0 },
        }
    }

    /// Flatten in policy input order
    pub fn to_array(&self) -> [f32; OBSERVATION_SIZE] {
        [
            self.energy,
            self.temperature,
            self.integrity,
            self.age,
            self.size,
            self.stage[0],
            self.stage[1],
            self.stage[2],
            self.phi,
            self.phi_gradient.x,
            self.phi_gradient.y,
            self.velocity.x,
            self.velocity.y,
            self.heading.x,
            self.heading.y,
            self.cooldown,
            self.sheltered,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{Genome, GenomeRanges};
    use crate::traits::NullField;

    struct SlopedField {
        last_noise: f32,
    }

    impl FieldAccess for SlopedField {
        fn sample(&self, position: Vec2) -> f32 {
            position.x * 0.1
        }
        fn sample_noisy(&mut self, position: Vec2, noise_level: f32) -> f32 {
            self.last_noise = noise_level;
            self.sample(position)
        }
        fn gradient(&self, _position: Vec2) -> Vec2 {
            Vec2::new(0.1, 0.0)
        }
        fn trigger_back_action(&mut self, _position: Vec2) {}
        fn back_action_enabled(&self) -> bool {
            false
        }
    }

    fn setup() -> (CreatureConfig, GrowthSystem, Physiology) {
        let config = CreatureConfig::default();
        let genome = Genome::create_default(&GenomeRanges::default());
        let growth = GrowthSystem::new(&config, genome);
        let physiology = Physiology::new(&config, &genome);
        (config, growth, physiology)
    }

    #[test]
    fn test_observation_layout() {
        let (config, growth, physiology) = setup();
        let body = BodyState {
            position: Vec2::ZERO,
            velocity: Vec2::new(2.5, 0.0),
            heading: Vec2::Y,
        };
        let mut sensors = SensorState::default();

        let obs = Observation::gather(
            &physiology,
            &growth,
            7.5,
            &config,
            &body,
            true,
            &mut NullField,
            &mut sensors,
        );
        let values = obs.to_array();

        assert_eq!(values.len(), OBSERVATION_SIZE);
        assert_eq!(values[0], 1.0);
        assert_eq!(&values[5..8], &[1.0, 0.0, 0.0]);
        assert_eq!(values[11], 0.5);
        assert_eq!(values[14], 1.0);
        assert_eq!(values[15], 0.5);
        assert_eq!(values[16], 1.0);
    }

    #[test]
    fn test_gradient_only_after_scan() {
        let (config, growth, physiology) = setup();
        let body = BodyState::at(Vec2::new(10.0, 0.0));
        let mut field = SlopedField { last_noise: 0.0 };
        let mut sensors = SensorState::default();

        let obs = Observation::gather(
            &physiology, &growth, 0.0, &config, &body, false, &mut field, &mut sensors,
        );
        assert_eq!(obs.phi_gradient, Vec2::ZERO);
        assert!((field.last_noise - 0.2).abs() < 1e-6);
        assert!((sensors.last_phi - 1.0).abs() < 1e-6);

        sensors.scanned_last_step = true;
        let obs = Observation::gather(
            &physiology, &growth, 0.0, &config, &body, false, &mut field, &mut sensors,
        );
        assert_eq!(obs.phi_gradient, Vec2::new(0.1, 0.0));
        assert!((field.last_noise - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_values_normalized() {
        let (config, mut growth, mut physiology) = setup();
        physiology.energy = 1000.0;
        growth.size = 10.0;
        let mut sensors = SensorState::default();

        let obs = Observation::gather(
            &physiology,
            &growth,
            100.0,
            &config,
            &BodyState::default(),
            false,
            &mut NullField,
            &mut sensors,
        );
        assert_eq!(obs.energy, 1.0);
        assert_eq!(obs.size, 1.0);
        assert_eq!(obs.cooldown, 1.0);
        assert_eq!(obs.sheltered, 0.0);
    }
}
