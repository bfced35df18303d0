//! Headless simulation runs
//!
//! Drives a [`Simulation`] for a fixed number of ticks with the wandering
//! policy and a food replenisher, logging progress and a final summary.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use synlife_core::{EpisodeSummary, MovementProvider, Simulation};
use synlife_creature::Policy;

use crate::config::{FoodSpawnerConfig, RunConfig};
use crate::policy::WanderPolicy;

/// Stream offsets so policy and food draws never share the founders' stream
const POLICY_STREAM: u64 = 0x0b5e_55ed;
const FOOD_STREAM: u64 = 0xf00d;

/// Keeps the arena stocked with food
pub struct FoodSpawner {
    config: FoodSpawnerConfig,
    rng: Xoshiro256StarStar,
    next_spawn: f64,
}

impl FoodSpawner {
    pub fn new(config: FoodSpawnerConfig, seed: u64) -> Self {
        let next_spawn = config.spawn_interval.max(0.0) as f64;
        Self {
            config,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            next_spawn,
        }
    }

    /// Place the initial stock, skipping spots too close to existing food
    pub fn seed_arena<M: MovementProvider>(&mut self, sim: &mut Simulation<M>) -> usize {
        let mut placed = 0;
        for _ in 0..self.config.initial_items.min(self.config.max_items) {
            if self.try_spawn(sim) {
                placed += 1;
            }
        }
        log::info!("Placed {} initial food items", placed);
        placed
    }

    /// One placement attempt once the interval has elapsed. Returns whether an item was placed.
    pub fn update<M: MovementProvider>(&mut self, sim: &mut Simulation<M>) -> bool {
        if !self.config.enabled
            || sim.food().len() >= self.config.max_items
            || sim.time() < self.next_spawn
        {
            return false;
        }
        self.next_spawn = sim.time() + self.config.spawn_interval.max(0.0) as f64;
        self.try_spawn(sim)
    }

    fn try_spawn<M: MovementProvider>(&mut self, sim: &mut Simulation<M>) -> bool {
        let h = sim.config().arena.half_extent();
        let position = Vec2::new(
            self.rng.random_range(-h..=h),
            self.rng.random_range(-h..=h),
        );
        if sim.food().any_within(position, self.config.min_distance) {
            return false;
        }
        let phi = sim.field().sample_phi(position);
        let nutrient = (self.config.base_nutrient * (1.0 + phi * self.config.phi_multiplier)).max(0.0);
        match sim.place_food(position, nutrient) {
            Some(id) => {
                log::trace!("Food {:?} at {} with nutrient {:.2}", id, position, nutrient);
                true
            }
            None => false,
        }
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub births: usize,
    pub deaths: usize,
    pub evictions: usize,
    pub survivors: usize,
    pub max_generation: u32,
    pub total_reward: f64,
}

/// Run `config.run.ticks` ticks of `sim` and return the totals
pub fn run<M: MovementProvider>(
    sim: &mut Simulation<M>,
    config: &RunConfig,
    policy: &mut dyn Policy,
    food: &mut FoodSpawner,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let interval = config.run.report_interval;

    for _ in 0..config.run.ticks {
        food.update(sim);
        let report = sim.tick(config.run.dt, policy);

        summary.ticks += 1;
        summary.births += report.births.len();
        summary.deaths += report.deaths.len();
        summary.evictions += report.evictions.len();
        summary.total_reward += report.total_reward() as f64;

        if interval > 0 && (report.tick + 1) % interval == 0 {
            log::info!(
                "Tick {}: {} alive, {} food, {} births, {} deaths so far",
                report.tick + 1,
                sim.live_count(),
                sim.food().len(),
                summary.births,
                summary.deaths
            );
        }

        if config.run.stop_on_extinction && sim.live_count() == 0 {
            log::warn!("Population extinct after {} ticks", summary.ticks);
            break;
        }
    }

    summary.survivors = sim.live_count();
    summary.max_generation = sim.lineage().max_generation();
    summary
}

/// Build a simulation from `config`, run it, and log the summary
pub fn run_headless(config: &RunConfig) -> anyhow::Result<(RunSummary, Vec<EpisodeSummary>)> {
    let sim_config = config.preset.resolve()?;
    let seed = sim_config.seed;
    let mut sim = Simulation::new(sim_config);
    sim.spawn_founders();

    let mut policy = WanderPolicy::new(config.policy.clone(), seed ^ POLICY_STREAM);
    let mut food = FoodSpawner::new(config.food.clone(), seed ^ FOOD_STREAM);
    if config.food.enabled {
        food.seed_arena(&mut sim);
    }

    let summary = run(&mut sim, config, &mut policy, &mut food);
    log_summary(&sim, &summary);

    let episodes = sim.telemetry().summaries().cloned().collect();
    Ok((summary, episodes))
}

fn log_summary<M: MovementProvider>(sim: &Simulation<M>, summary: &RunSummary) {
    log::info!(
        "Run finished after {} ticks ({:.1}s simulated)",
        summary.ticks,
        sim.time()
    );
    log::info!(
        "Population: {} survivors, {} births, {} deaths ({} evicted), max generation {}",
        summary.survivors,
        summary.births,
        summary.deaths,
        summary.evictions,
        summary.max_generation
    );
    for (cause, count) in sim.telemetry().deaths_by_cause() {
        log::info!("  {}: {}", cause, count);
    }
    if let Some(lifespan) = sim.telemetry().mean_lifespan() {
        log::info!("Mean lifespan: {:.1} ticks", lifespan);
    }
    log::info!(
        "Events: {} eaten, {} scans, {} reproductions",
        sim.telemetry().event_count("EAT"),
        sim.telemetry().event_count("SCAN"),
        sim.telemetry().event_count("REPRODUCE_SUCCESS")
    );
    log::info!("Total reward: {:.3}", summary.total_reward);
}

#[cfg(test)]
mod tests {
    use super::*;
    use synlife_core::SimulationConfig;
    use synlife_creature::IdlePolicy;

    fn small_run(ticks: u64) -> RunConfig {
        let mut config = RunConfig::default();
        config.run.ticks = ticks;
        config.run.report_interval = 0;
        config.preset.capacity = Some(6);
        config.preset.initial_population = Some(4);
        config
    }

    #[test]
    fn test_spawner_respects_interval_and_max() {
        let mut sim = Simulation::new(SimulationConfig::default());
        let config = FoodSpawnerConfig {
            max_items: 2,
            spawn_interval: 1.0,
            min_distance: 0.0,
            ..FoodSpawnerConfig::default()
        };
        let mut spawner = FoodSpawner::new(config, 5);

        // Nothing before the first interval
        assert!(!spawner.update(&mut sim));
        for _ in 0..100 {
            sim.tick(0.1, &mut IdlePolicy);
            spawner.update(&mut sim);
        }
        assert_eq!(sim.food().len(), 2);
    }

    #[test]
    fn test_spawner_keeps_min_distance() {
        let mut sim = Simulation::new(SimulationConfig::default());
        let config = FoodSpawnerConfig {
            max_items: 50,
            initial_items: 50,
            min_distance: 100.0,
            ..FoodSpawnerConfig::default()
        };
        let mut spawner = FoodSpawner::new(config, 5);
        // The arena is 50 wide, so only the first item fits
        assert_eq!(spawner.seed_arena(&mut sim), 1);
    }

    #[test]
    fn test_disabled_spawner_places_nothing() {
        let mut sim = Simulation::new(SimulationConfig::default());
        let config = FoodSpawnerConfig {
            enabled: false,
            spawn_interval: 0.0,
            ..FoodSpawnerConfig::default()
        };
        let mut spawner = FoodSpawner::new(config, 5);
        assert!(!spawner.update(&mut sim));
        assert!(sim.food().is_empty());
    }

    #[test]
    fn test_run_headless_is_reproducible() {
        let config = small_run(50);
        let (a, episodes_a) = run_headless(&config).unwrap();
        let (b, episodes_b) = run_headless(&config).unwrap();
        assert_eq!(a, b);
        assert_eq!(episodes_a, episodes_b);
        assert!(a.ticks <= 50);
        assert!(episodes_a.len() >= 4);
    }
}
