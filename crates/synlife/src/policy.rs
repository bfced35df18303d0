//! Seeded wandering policy for headless runs
//!
//! Creatures drift forward, turn with a mix of noise and the sensed field
//! gradient, scan now and then, and ask to reproduce when well fed adults.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use synlife_creature::{Action, EntityId, Observation, Policy};

use crate::config::WanderConfig;

/// Index of the adult flag in [`Observation::stage`]
const ADULT: usize = 1;

pub struct WanderPolicy {
    config: WanderConfig,
    rng: Xoshiro256StarStar,
}

impl WanderPolicy {
    pub fn new(config: WanderConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }
}

impl Policy for WanderPolicy {
    fn act(&mut self, _id: EntityId, observation: &Observation) -> Action {
        let noise = self.config.turn_noise.abs();
        let wander = if noise > 0.0 {
            self.rng.random_range(-noise..=noise)
        } else {
            0.0
        };
        // Gradient is only sensed after a scan; steer uphill in the heading frame
        let right = glam::Vec2::new(observation.heading.y, -observation.heading.x);
        let uphill = observation.phi_gradient.dot(right) * self.config.gradient_weight;

        // Hungrier creatures move faster
        let move_intent = 0.5 + 0.5 * (1.0 - observation.energy).clamp(0.0, 1.0);

        let scan = self
            .rng
            .random_bool(self.config.scan_probability.clamp(0.0, 1.0));
        let reproduce = observation.stage[ADULT] > 0.5
            && observation.cooldown <= 0.0
            && observation.energy >= self.config.reproduce_energy;

        Action {
            move_intent,
            turn_intent: (wander + uphill).clamp(-1.0, 1.0),
            scan,
            reproduce,
        }
    }
}
