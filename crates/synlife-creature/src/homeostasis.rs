//! Per-tick regulation of energy, temperature and integrity

use serde::{Deserialize, Serialize};

use crate::config::CreatureConfig;
use crate::genome::Genome;
use crate::growth::DerivedStats;
use crate::types::DeathCause;

const TEMPERATURE_DRIFT_RATE: f32 = 0.1;
/// Deviation from the target tolerated without integrity damage
const TEMPERATURE_COMFORT_BAND: f32 = 0.3;
const TEMPERATURE_DAMAGE_RATE: f32 = 0.1;
const REGENERATION_RATE: f32 = 0.05;
/// Energy fraction required before integrity regenerates
const REGENERATION_ENERGY_FRACTION: f32 = 0.3;
const LETHAL_TEMPERATURE_DEVIATION: f32 = 0.8;
const LETHAL_TEMPERATURE_INTEGRITY: f32 = 0.2;

/// Conditions at the creature's position for this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surroundings {
    pub ambient_temperature: f32,
    pub sheltered: bool,
}

impl Default for Surroundings {
    fn default() -> Self {
        Self {
            ambient_temperature: crate::world_interaction::NEUTRAL_TEMPERATURE,
            sheltered: false,
        }
    }
}

/// Physiological state of a creature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Physiology {
    pub energy: f32,
    /// Body temperature in `[0, 1]`
    pub temperature: f32,
    /// Structural integrity in `[0, 1]`
    pub integrity: f32,
    target_temperature: f32,
}

impl Physiology {
    /// Initial physiology; the target temperature is fixed here from the genome
    pub fn new(config: &CreatureConfig, genome: &Genome) -> Self {
        Self {
            energy: config.initial_energy.max(0.0),
            temperature: config.initial_temperature.clamp(0.0, 1.0),
            integrity: config.initial_integrity.clamp(0.0, 1.0),
            target_temperature: genome.temperature_tolerance,
        }
    }

    pub fn target_temperature(&self) -> f32 {
        self.target_temperature
    }

    pub fn temperature_deviation(&self) -> f32 {
        (self.temperature - self.target_temperature).abs()
    }

    pub fn energy_fraction(&self, max_energy: f32) -> f32 {
        if max_energy > 0.0 {
            self.energy / max_energy
        } else {
            0.0
        }
    }

    /// Run one homeostasis step
    ///
    /// Drifts temperature toward ambient, applies temperature damage, basal
    /// drain and regeneration, then clamps energy and integrity.
    pub fn regulate(&mut self, dt: f32, surroundings: Surroundings, stats: &DerivedStats) {
        let drift = (dt * TEMPERATURE_DRIFT_RATE).clamp(0.0, 1.0);
        self.temperature += (surroundings.ambient_temperature - self.temperature) * drift;
        self.temperature = self.temperature.clamp(0.0, 1.0);

        let excess = self.temperature_deviation() - TEMPERATURE_COMFORT_BAND;
        if excess > 0.0 {
            self.integrity -= excess * TEMPERATURE_DAMAGE_RATE * dt;
        }

        let drain_factor = if surroundings.sheltered { 0.5 } else { 1.0 };
        self.energy -= stats.basal_metabolism * drain_factor * dt;

        if self.integrity < 1.0 && self.energy > stats.max_energy * REGENERATION_ENERGY_FRACTION {
            let heal_factor = if surroundings.sheltered { 2.0 } else { 1.0 };
            self.integrity += REGENERATION_RATE * heal_factor * dt;
        }

        self.clamp(stats.max_energy);
    }

    /// Clamp energy to `[0, max_energy]` and integrity to `[0, 1]`
    pub fn clamp(&mut self, max_energy: f32) {
        self.energy = self.energy.clamp(0.0, max_energy.max(0.0));
        self.integrity = self.integrity.clamp(0.0, 1.0);
    }

    /// Remove integrity, e.g. from a hazard
    pub fn damage(&mut self, amount: f32) {
        self.integrity = (self.integrity - amount.max(0.0)).clamp(0.0, 1.0);
    }

    /// Add energy, capped at `max_energy`
    pub fn feed(&mut self, amount: f32, max_energy: f32) {
        self.energy = (self.energy + amount.max(0.0)).min(max_energy.max(0.0));
    }

    /// Spend energy, never going below zero
    pub fn spend(&mut self, amount: f32) {
        self.energy = (self.energy - amount.max(0.0)).max(0.0);
    }

    /// First matching cause of death, in priority order
    pub fn death_cause(&self, config: &CreatureConfig) -> Option<DeathCause> {
        if self.energy <= config.death_energy_threshold {
            Some(DeathCause::Starvation)
        } else if self.integrity <= config.death_integrity_threshold {
            Some(DeathCause::Integrity)
        } else if self.temperature_deviation() > LETHAL_TEMPERATURE_DEVIATION
            && self.integrity < LETHAL_TEMPERATURE_INTEGRITY
        {
            Some(DeathCause::Temperature)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::GenomeRanges;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;

    fn setup() -> (CreatureConfig, Genome, DerivedStats) {
        let config = CreatureConfig::default();
        let genome = Genome::create_default(&GenomeRanges::default());
        let stats = DerivedStats::compute(&genome, 1.0);
        (config, genome, stats)
    }

    #[test]
    fn test_temperature_drifts_toward_ambient() {
        let (config, genome, stats) = setup();
        let mut body = Physiology::new(&config, &genome);
        let hot = Surroundings {
            ambient_temperature: 1.0,
            sheltered: false,
        };

        body.regulate(1.0, hot, &stats);
        assert!((body.temperature - 0.55).abs() < 1e-6);

        for _ in 0..200 {
            body.regulate(1.0, hot, &stats);
        }
        assert!(body.temperature <= 1.0);
        assert!(body.temperature > 0.99);
    }

    #[test]
    fn test_comfortable_temperature_causes_no_damage() {
        let (config, genome, stats) = setup();
        let mut body = Physiology::new(&config, &genome);
        body.integrity = 0.5;
        body.energy = 10.0;
        body.temperature = 0.75;

        body.regulate(
            1.0,
            Surroundings {
                ambient_temperature: 0.75,
                sheltered: false,
            },
            &stats,
        );
        // Energy below the regeneration gate and deviation inside the band
        assert_eq!(body.integrity, 0.5);
    }

    #[test]
    fn test_temperature_excess_damages_integrity() {
        let (config, genome, stats) = setup();
        let mut body = Physiology::new(&config, &genome);
        body.temperature = 1.0;
        body.energy = 10.0;

        body.regulate(
            1.0,
            Surroundings {
                ambient_temperature: 1.0,
                sheltered: false,
            },
            &stats,
        );
        // deviation 0.5 -> excess 0.2 -> 0.02 damage
        assert!((body.integrity - 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_shelter_halves_drain() {
        let (config, genome, stats) = setup();
        let mut open = Physiology::new(&config, &genome);
        let mut sheltered = open;

        open.regulate(1.0, Surroundings::default(), &stats);
        sheltered.regulate(
            1.0,
            Surroundings {
                sheltered: true,
                ..Surroundings::default()
            },
            &stats,
        );

        let open_drain = config.initial_energy - open.energy;
        let sheltered_drain = config.initial_energy - sheltered.energy;
        assert!((open_drain - stats.basal_metabolism).abs() < 1e-5);
        assert!((sheltered_drain - stats.basal_metabolism * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_regeneration_gated_by_energy_and_doubled_in_shelter() {
        let (config, genome, stats) = setup();
        let mut body = Physiology::new(&config, &genome);
        body.integrity = 0.5;

        body.regulate(1.0, Surroundings::default(), &stats);
        assert!((body.integrity - 0.55).abs() < 1e-6);

        body.regulate(
            1.0,
            Surroundings {
                sheltered: true,
                ..Surroundings::default()
            },
            &stats,
        );
        assert!((body.integrity - 0.65).abs() < 1e-6);

        body.energy = stats.max_energy * 0.2;
        body.regulate(1.0, Surroundings::default(), &stats);
        assert!((body.integrity - 0.65).abs() < 1e-6);
    }

    #[test]
    fn test_regulate_keeps_state_in_bounds() {
        let (config, genome, stats) = setup();
        let mut rng = Xoshiro256StarStar::seed_from_u64(11);
        let mut body = Physiology::new(&config, &genome);

        for _ in 0..1000 {
            body.energy = rng.random_range(-50.0..250.0);
            body.integrity = rng.random_range(-0.5..1.5);
            let surroundings = Surroundings {
                ambient_temperature: rng.random_range(0.0..=1.0),
                sheltered: rng.random_bool(0.5),
            };
            body.regulate(rng.random_range(0.0..2.0), surroundings, &stats);

            assert!(body.energy >= 0.0 && body.energy <= stats.max_energy);
            assert!(body.integrity >= 0.0 && body.integrity <= 1.0);
            assert!(body.temperature >= 0.0 && body.temperature <= 1.0);
        }
    }

    #[test]
    fn test_starvation_scenario() {
        let (_, genome, stats) = setup();
        // Starvation threshold above 10% of capacity
        let config = CreatureConfig {
            death_energy_threshold: stats.max_energy * 0.15,
            ..CreatureConfig::default()
        };
        let mut body = Physiology::new(&config, &genome);
        body.energy = stats.max_energy * 0.1;
        body.integrity = 1.0;

        assert_eq!(body.death_cause(&config), Some(DeathCause::Starvation));
    }

    #[test]
    fn test_death_cause_priority() {
        let (config, genome, _) = setup();
        let mut body = Physiology::new(&config, &genome);
        assert_eq!(body.death_cause(&config), None);

        body.integrity = 0.0;
        body.energy = 0.0;
        assert_eq!(body.death_cause(&config), Some(DeathCause::Starvation));

        body.energy = 50.0;
        assert_eq!(body.death_cause(&config), Some(DeathCause::Integrity));

        body.integrity = 0.1;
        body.temperature = 1.0;
        assert_eq!(body.death_cause(&config), None);

        let cold_adapted = Genome {
            temperature_tolerance: 0.1,
            ..genome
        };
        let mut body = Physiology::new(&config, &cold_adapted);
        body.temperature = 0.95;
        body.integrity = 0.1;
        assert_eq!(body.death_cause(&config), Some(DeathCause::Temperature));
    }

    #[test]
    fn test_feed_and_spend_bounds() {
        let (config, genome, stats) = setup();
        let mut body = Physiology::new(&config, &genome);
        body.feed(500.0, stats.max_energy);
        assert_eq!(body.energy, stats.max_energy);
        body.spend(1000.0);
        assert_eq!(body.energy, 0.0);
        body.damage(2.0);
        assert_eq!(body.integrity, 0.0);
    }
}
