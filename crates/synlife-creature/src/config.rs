//! Creature and reward configuration
//!
//! Immutable records supplied at startup. Every field has a compiled default;
//! [`CreatureConfig::sanitized`] clamps degenerate values instead of rejecting
//! them.

use serde::{Deserialize, Serialize};

/// Physiology, life-history, reproduction and mutation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    // Initial state
    pub initial_energy: f32,
    pub initial_temperature: f32,
    pub initial_integrity: f32,
    pub initial_age: f32,

    // Life history (seconds, scaled by genome norms)
    pub maturity_age_min: f32,
    pub maturity_age_max: f32,
    pub max_age_min: f32,
    pub max_age_max: f32,

    // Growth
    pub size_growth_rate: f32,
    /// Maximum size gained over a lifetime; size stays in `[1, 1 + max_growth]`
    pub max_growth: f32,
    pub nutrition_threshold: f32,
    pub stress_threshold: f32,

    // Reproduction
    /// Base energy fraction required to reproduce, raised by conservatism
    pub reproduction_energy_threshold: f32,
    pub reproduction_integrity_threshold: f32,
    pub reproduction_cooldown: f32,
    pub reproduction_energy_cost: f32,
    pub reproduction_vulnerability_duration: f32,

    // Death
    pub death_energy_threshold: f32,
    pub death_integrity_threshold: f32,

    // Mutation
    pub mutation_rate: f32,
    pub mutation_strength: f32,

    // Movement
    pub move_speed: f32,
    /// Degrees per second
    pub turn_speed: f32,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            initial_energy: 100.0,
            initial_temperature: 0.5,
            initial_integrity: 1.0,
            initial_age: 0.0,
            maturity_age_min: 10.0,
            maturity_age_max: 30.0,
            max_age_min: 60.0,
            max_age_max: 120.0,
            size_growth_rate: 0.01,
            max_growth: 2.0,
            nutrition_threshold: 0.7,
            stress_threshold: 0.3,
            reproduction_energy_threshold: 0.7,
            reproduction_integrity_threshold: 0.6,
            reproduction_cooldown: 15.0,
            reproduction_energy_cost: 50.0,
            reproduction_vulnerability_duration: 5.0,
            death_energy_threshold: 0.0,
            death_integrity_threshold: 0.0,
            mutation_rate: 0.3,
            mutation_strength: 0.1,
            move_speed: 5.0,
            turn_speed: 180.0,
        }
    }
}

impl CreatureConfig {
    /// Copy with negative durations, costs and rates clamped to safe values
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        config.initial_energy = config.initial_energy.max(0.0);
        config.initial_temperature = config.initial_temperature.clamp(0.0, 1.0);
        config.initial_integrity = config.initial_integrity.clamp(0.0, 1.0);
        config.initial_age = config.initial_age.max(0.0);
        if config.maturity_age_min > config.maturity_age_max {
            std::mem::swap(&mut config.maturity_age_min, &mut config.maturity_age_max);
        }
        if config.max_age_min > config.max_age_max {
            std::mem::swap(&mut config.max_age_min, &mut config.max_age_max);
        }
        // Ages must stay positive: they divide the size target
        config.max_age_min = config.max_age_min.max(f32::EPSILON);
        config.max_age_max = config.max_age_max.max(config.max_age_min);
        config.size_growth_rate = config.size_growth_rate.max(0.0);
        config.max_growth = config.max_growth.max(0.0);
        config.reproduction_cooldown = config.reproduction_cooldown.max(0.0);
        config.reproduction_energy_cost = config.reproduction_energy_cost.max(0.0);
        config.reproduction_vulnerability_duration =
            config.reproduction_vulnerability_duration.max(0.0);
        config.mutation_rate = config.mutation_rate.clamp(0.0, 1.0);
        config.mutation_strength = config.mutation_strength.abs();
        config.move_speed = config.move_speed.max(0.0);
        config.turn_speed = config.turn_speed.max(0.0);
        config
    }
}

/// Reward shaping for the external learning loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub living_reward: f32,
    pub min_energy_for_living_reward: f32,
    pub min_integrity_for_living_reward: f32,

    pub starvation_penalty: f32,
    pub damage_penalty: f32,
    pub temperature_stress_penalty: f32,
    pub death_penalty: f32,

    pub food_reward_base: f32,
    pub food_reward_diminishing_factor: f32,

    pub reproduction_reward: f32,

    pub enable_exploration_reward: bool,
    pub exploration_reward: f32,
    pub exploration_grid_size: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            living_reward: 0.001,
            min_energy_for_living_reward: 0.2,
            min_integrity_for_living_reward: 0.3,
            starvation_penalty: -0.01,
            damage_penalty: -0.05,
            temperature_stress_penalty: -0.02,
            death_penalty: -10.0,
            food_reward_base: 0.1,
            food_reward_diminishing_factor: 0.8,
            reproduction_reward: 0.5,
            enable_exploration_reward: true,
            exploration_reward: 0.001,
            exploration_grid_size: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CreatureConfig::default();
        assert_eq!(config.initial_energy, 100.0);
        assert_eq!(config.reproduction_energy_threshold, 0.7);
        assert_eq!(config.mutation_rate, 0.3);

        let rewards = RewardConfig::default();
        assert_eq!(rewards.death_penalty, -10.0);
        assert!(rewards.enable_exploration_reward);
    }

    #[test]
    fn test_sanitized_swaps_and_clamps() {
        let config = CreatureConfig {
            maturity_age_min: 40.0,
            maturity_age_max: 10.0,
            reproduction_cooldown: -3.0,
            mutation_rate: 4.0,
            mutation_strength: -0.2,
            ..CreatureConfig::default()
        }
        .sanitized();

        assert_eq!(config.maturity_age_min, 10.0);
        assert_eq!(config.maturity_age_max, 40.0);
        assert_eq!(config.reproduction_cooldown, 0.0);
        assert_eq!(config.mutation_rate, 1.0);
        assert!((config.mutation_strength - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_sanitized_keeps_valid_config() {
        let config = CreatureConfig::default();
        assert_eq!(config.sanitized(), config);
    }
}
