//! Reward shaping for the external learning loop

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::RewardConfig;
use crate::homeostasis::Physiology;

/// Energy fraction below which the starvation penalty applies
const STARVATION_FRACTION: f32 = 0.2;
/// Temperature deviation above which the stress penalty applies
const TEMPERATURE_STRESS_DEVIATION: f32 = 0.3;
/// Total nutrients per step of food reward decay
const FOOD_DECAY_SCALE: f32 = 10.0;

/// Per-creature reward accumulator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardTracker {
    step_reward: f32,
    total_reward: f32,
    pub food_count: u32,
    /// Sum of nutrient values eaten, drives diminishing food rewards
    pub total_nutrients: f32,
    visited_cells: BTreeSet<(i32, i32)>,
}

impl RewardTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reward: f32) {
        self.step_reward += reward;
        self.total_reward += reward;
    }

    /// Reward accumulated since the last call
    pub fn take_step_reward(&mut self) -> f32 {
        std::mem::take(&mut self.step_reward)
    }

    pub fn total_reward(&self) -> f32 {
        self.total_reward
    }

    pub fn visited_cell_count(&self) -> usize {
        self.visited_cells.len()
    }

    /// Record a meal and add `base * factor^(total_nutrients / 10)`
    pub fn reward_food(&mut self, config: &RewardConfig, nutrient: f32) -> f32 {
        self.food_count += 1;
        self.total_nutrients += nutrient;
        let reward = config.food_reward_base
            * config
                .food_reward_diminishing_factor
                .powf(self.total_nutrients / FOOD_DECAY_SCALE);
        self.add(reward);
        reward
    }

    pub fn reward_reproduction(&mut self, config: &RewardConfig) {
        self.add(config.reproduction_reward);
    }

    pub fn penalize_damage(&mut self, config: &RewardConfig, dt: f32) {
        self.add(config.damage_penalty * dt);
    }

    pub fn penalize_death(&mut self, config: &RewardConfig) {
        self.add(config.death_penalty);
    }

    /// Living reward plus starvation and temperature-stress penalties
    pub fn reward_vitals(
        &mut self,
        config: &RewardConfig,
        physiology: &Physiology,
        max_energy: f32,
        dt: f32,
    ) {
        let energy_fraction = physiology.energy_fraction(max_energy);
        if energy_fraction > config.min_energy_for_living_reward
            && physiology.integrity > config.min_integrity_for_living_reward
        {
            self.add(config.living_reward);
        }
        if energy_fraction < STARVATION_FRACTION {
            self.add(config.starvation_penalty * dt);
        }
        if physiology.temperature_deviation() > TEMPERATURE_STRESS_DEVIATION {
            self.add(config.temperature_stress_penalty * dt);
        }
    }

    /// Exploration reward for entering a new grid cell; returns whether the cell was new
    pub fn reward_exploration(&mut self, config: &RewardConfig, position: Vec2) -> bool {
        if !config.enable_exploration_reward || config.exploration_grid_size <= 0.0 {
            return false;
        }
        let cell = (
            (position.x / config.exploration_grid_size).floor() as i32,
            (position.y / config.exploration_grid_size).floor() as i32,
        );
        let is_new = self.visited_cells.insert(cell);
        if is_new {
            self.add(config.exploration_reward);
        }
        is_new
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CreatureConfig;
    use crate::genome::{Genome, GenomeRanges};

    fn physiology() -> Physiology {
        let genome = Genome::create_default(&GenomeRanges::default());
        Physiology::new(&CreatureConfig::default(), &genome)
    }

    #[test]
    fn test_food_reward_diminishes() {
        let config = RewardConfig::default();
        let mut tracker = RewardTracker::new();

        let first = tracker.reward_food(&config, 10.0);
        let second = tracker.reward_food(&config, 10.0);
        assert!((first - 0.1 * 0.8).abs() < 1e-6);
        assert!((second - 0.1 * 0.8 * 0.8).abs() < 1e-6);
        assert_eq!(tracker.food_count, 2);
        assert_eq!(tracker.total_nutrients, 20.0);
    }

    #[test]
    fn test_step_reward_resets() {
        let config = RewardConfig::default();
        let mut tracker = RewardTracker::new();
        tracker.reward_reproduction(&config);
        tracker.penalize_death(&config);

        assert!((tracker.take_step_reward() - (0.5 - 10.0)).abs() < 1e-6);
        assert_eq!(tracker.take_step_reward(), 0.0);
        assert!((tracker.total_reward() - (0.5 - 10.0)).abs() < 1e-6);
    }

    #[test]
    fn test_vitals_rewards() {
        let config = RewardConfig::default();
        let mut tracker = RewardTracker::new();
        let mut body = physiology();

        tracker.reward_vitals(&config, &body, 100.0, 1.0);
        assert!((tracker.take_step_reward() - config.living_reward).abs() < 1e-7);

        body.energy = 10.0;
        body.temperature = 1.0;
        tracker.reward_vitals(&config, &body, 100.0, 0.5);
        let expected = config.starvation_penalty * 0.5 + config.temperature_stress_penalty * 0.5;
        assert!((tracker.take_step_reward() - expected).abs() < 1e-7);
    }

    #[test]
    fn test_exploration_rewards_new_cells_once() {
        let config = RewardConfig::default();
        let mut tracker = RewardTracker::new();

        assert!(tracker.reward_exploration(&config, Vec2::new(0.5, 0.5)));
        assert!(!tracker.reward_exploration(&config, Vec2::new(1.5, 1.5)));
        assert!(tracker.reward_exploration(&config, Vec2::new(-0.5, 0.5)));
        assert_eq!(tracker.visited_cell_count(), 2);

        let disabled = RewardConfig {
            enable_exploration_reward: false,
            ..RewardConfig::default()
        };
        assert!(!tracker.reward_exploration(&disabled, Vec2::new(10.0, 10.0)));
    }
}
