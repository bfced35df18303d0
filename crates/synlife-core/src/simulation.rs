//! Simulation driver
//!
//! Owns every world-side system and runs one fixed tick order:
//! 1. advance the field
//! 2. update each live creature in ascending id order
//! 3. place newborns
//! 4. remove the dead
//! 5. capacity sweep
//! 6. fold events and vitals into telemetry
//!
//! Newborns are registered at birth and so can be evicted in their birth
//! tick, but they are not updated until the next one.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use synlife_creature::{
    BodyState, Creature, DeathCause, EntityId, EventBuffer, EventKind, EventSink, Eviction,
    FoodId, Genome, LifecycleEvent, Lineage, Policy, PopulationManager, PopulationView, Tee,
    TickContext, ZoneRegistry,
};

use crate::config::SimulationConfig;
use crate::field::PhiField;
use crate::food::FoodStore;
use crate::motion::{KinematicMover, MovementProvider};
use crate::telemetry::{EpisodeTracker, LineageTree};
use crate::zones::build_registry;

/// Offset applied to the run seed for founder placement and newborn headings
const PLACEMENT_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: u64,
    /// Simulation time at the start of the tick
    pub time: f64,
    /// Reward earned by each creature updated this tick
    pub rewards: Vec<(EntityId, f32)>,
    pub events: Vec<LifecycleEvent>,
    pub births: Vec<EntityId>,
    /// Deaths in order, evictions last
    pub deaths: Vec<(EntityId, DeathCause)>,
    pub evictions: Vec<Eviction>,
}

impl TickReport {
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().map(|(_, reward)| reward).sum()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.kind.name() == name).count()
    }
}

/// Integrity lookup over the creature arena for the capacity sweep
struct Roster<'a>(&'a BTreeMap<EntityId, Creature>);

impl PopulationView for Roster<'_> {
    fn integrity_of(&self, id: EntityId) -> Option<f32> {
        self.0
            .get(&id)
            .filter(|creature| creature.is_alive())
            .map(|creature| creature.physiology.integrity)
    }
}

/// A complete simulation run
pub struct Simulation<M: MovementProvider = KinematicMover> {
    config: SimulationConfig,
    field: PhiField,
    zones: ZoneRegistry,
    food: FoodStore,
    population: PopulationManager,
    creatures: BTreeMap<EntityId, Creature>,
    mover: M,
    events: EventBuffer,
    telemetry: EpisodeTracker,
    lineage: LineageTree,
    rng: Xoshiro256StarStar,
    tick: u64,
    time: f64,
}

impl Simulation<KinematicMover> {
    /// Simulation with the kinematic mover and no creatures
    pub fn new(config: SimulationConfig) -> Self {
        let config = config.sanitized();
        let mover = KinematicMover::new(
            config.creature.move_speed,
            config.creature.turn_speed,
            config.arena.size,
        );
        Self::build(config, mover)
    }
}

impl<M: MovementProvider> Simulation<M> {
    pub fn with_mover(config: SimulationConfig, mover: M) -> Self {
        Self::build(config.sanitized(), mover)
    }

    /// `config` must already be sanitized
    fn build(config: SimulationConfig, mover: M) -> Self {
        let zones = build_registry(&config.zones);
        log::info!(
            "Created simulation: seed {}, capacity {}, {} zones",
            config.seed,
            config.population.capacity,
            zones.len()
        );
        Self {
            field: PhiField::new(config.phi_field.clone()),
            zones,
            food: FoodStore::new(),
            population: PopulationManager::new(config.population.capacity, config.seed),
            creatures: BTreeMap::new(),
            mover,
            events: EventBuffer::new(),
            telemetry: EpisodeTracker::new(),
            lineage: LineageTree::new(),
            rng: Xoshiro256StarStar::seed_from_u64(config.seed ^ PLACEMENT_STREAM),
            tick: 0,
            time: 0.0,
            config,
        }
    }

    /// Spawn `initial_population` founders at seeded positions
    ///
    /// Founder genomes are seeded mutations of the default genome. Stops
    /// early if the population is full.
    pub fn spawn_founders(&mut self) -> Vec<EntityId> {
        let ranges = self.config.genome_ranges;
        let base = Genome::create_default(&ranges);
        let h = self.config.arena.half_extent();

        let mut spawned = Vec::new();
        for _ in 0..self.config.population.initial_population {
            let genome = Genome::mutate(
                &mut self.rng,
                &base,
                &ranges,
                self.config.creature.mutation_rate,
                self.config.creature.mutation_strength,
            );
            let position = Vec2::new(
                self.rng.random_range(-h..=h),
                self.rng.random_range(-h..=h),
            );
            let heading = self.rng.random_range(0.0..TAU);
            match self.spawn_founder(genome, position, heading) {
                Some(id) => spawned.push(id),
                None => break,
            }
        }
        log::info!("Spawned {} founders", spawned.len());
        spawned
    }

    /// Spawn one generation-zero creature. `None` if the population is full.
    pub fn spawn_founder(
        &mut self,
        genome: Genome,
        position: Vec2,
        heading_angle: f32,
    ) -> Option<EntityId> {
        if !self.population.can_spawn() {
            log::warn!(
                "Population full ({}/{}), founder not spawned",
                self.population.count(),
                self.population.capacity()
            );
            return None;
        }

        let id = self.population.allocate_id();
        let genome = genome.clamp(&self.config.genome_ranges);
        let creature = Creature::spawn(
            id,
            genome,
            Lineage::founder(),
            &self.config.creature,
            self.time,
        );
        self.population.register(id, self.time);
        self.mover.spawn(id, position, heading_angle);
        let position = self.mover.body(id).map_or(position, |body| body.position);

        self.events.record(LifecycleEvent {
            id,
            tick: self.tick,
            time: self.time,
            position,
            kind: EventKind::Birth {
                parent: None,
                generation: 0,
                genome_signature: creature.birth_signature,
            },
        });
        self.creatures.insert(id, creature);
        Some(id)
    }

    /// Advance the whole simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32, policy: &mut dyn Policy) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let tick = self.tick;
        let time = self.time;

        // 1. Field time and patch expiry
        self.field.advance(dt);

        // 2. Creature updates
        let mut rewards = Vec::with_capacity(self.creatures.len());
        let mut newborns = Vec::new();
        let mut deaths = Vec::new();
        let ids: Vec<EntityId> = self.creatures.keys().copied().collect();
        for id in ids {
            let Some(creature) = self.creatures.get_mut(&id) else {
                continue;
            };
            if !creature.is_alive() {
                continue;
            }

            let body = self.mover.body(id).unwrap_or_default();
            let observation =
                creature.observe(&self.config.creature, &body, &self.zones, &mut self.field);
            let action = policy.act(id, &observation);
            let contacts: Vec<FoodId> = self
                .food
                .within(body.position, self.config.arena.eat_radius);

            let mut ctx = TickContext {
                dt,
                time,
                tick,
                config: &self.config.creature,
                rewards: &self.config.rewards,
                ranges: &self.config.genome_ranges,
                body,
                field: &mut self.field,
                zones: &self.zones,
                population: &mut self.population,
                events: &mut self.events,
                food: &mut self.food,
                contacts: &contacts,
            };
            let outcome = creature.tick(&mut ctx, &action);

            rewards.push((id, outcome.reward));
            if let Some(offspring) = outcome.offspring {
                newborns.push(offspring);
            }
            match outcome.death {
                Some(cause) => deaths.push((id, cause)),
                None => self.mover.apply(id, outcome.movement, dt),
            }
        }

        // 3. Newborns
        let mut births = Vec::with_capacity(newborns.len());
        for offspring in newborns {
            let id = offspring.creature.id;
            let heading = self.rng.random_range(0.0..TAU);
            self.mover.spawn(id, offspring.position, heading);
            self.creatures.insert(id, offspring.creature);
            births.push(id);
        }

        // 4. The dead leave the arena
        for &(id, _) in &deaths {
            self.remove_creature(id);
        }

        // 5. Capacity sweep, strictly after every update
        let evictions = self
            .population
            .enforce_capacity(&Roster(&self.creatures));
        for eviction in &evictions {
            let id = eviction.id;
            if let Some(creature) = self.creatures.get_mut(&id) {
                if creature.end(DeathCause::Evicted) {
                    let position = self
                        .mover
                        .body(id)
                        .map_or(Vec2::ZERO, |body| body.position);
                    self.events.record(LifecycleEvent {
                        id,
                        tick,
                        time,
                        position,
                        kind: EventKind::Death {
                            cause: DeathCause::Evicted,
                            age: creature.growth.age,
                        },
                    });
                    deaths.push((id, DeathCause::Evicted));
                }
            }
            self.remove_creature(id);
        }

        // 6. Telemetry
        let events = self.events.drain();
        {
            let mut sinks = Tee::new(&mut self.telemetry, &mut self.lineage);
            for event in &events {
                sinks.record(*event);
            }
        }
        for (id, _) in &rewards {
            if let Some(creature) = self.creatures.get(id) {
                self.telemetry.record_vitals(
                    *id,
                    &creature.physiology,
                    creature.growth.stage,
                    creature.genome().signature(),
                );
            }
        }

        log::debug!(
            "Tick {}: {} alive, {} births, {} deaths",
            tick,
            self.creatures.len(),
            births.len(),
            deaths.len()
        );

        self.tick += 1;
        self.time += dt as f64;

        TickReport {
            tick,
            time,
            rewards,
            events,
            births,
            deaths,
            evictions,
        }
    }

    fn remove_creature(&mut self, id: EntityId) {
        self.population.unregister(id);
        self.mover.despawn(id);
        self.creatures.remove(&id);
    }

    /// Change the population capacity; the next tick's sweep enforces it
    pub fn set_capacity(&mut self, capacity: usize) {
        self.population.set_capacity(capacity);
        self.config.population.capacity = self.population.capacity();
        log::info!(
            "Population capacity set to {} ({} alive)",
            self.population.capacity(),
            self.creatures.len()
        );
    }

    /// Place a food item, clamped into the arena
    pub fn place_food(&mut self, position: Vec2, nutrient_value: f32) -> Option<FoodId> {
        self.food
            .place(self.config.arena.clamp(position), nutrient_value)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn field(&self) -> &PhiField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut PhiField {
        &mut self.field
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    pub fn food(&self) -> &FoodStore {
        &self.food
    }

    pub fn food_mut(&mut self) -> &mut FoodStore {
        &mut self.food
    }

    pub fn population(&self) -> &PopulationManager {
        &self.population
    }

    pub fn mover(&self) -> &M {
        &self.mover
    }

    pub fn creature(&self, id: EntityId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    pub fn creature_mut(&mut self, id: EntityId) -> Option<&mut Creature> {
        self.creatures.get_mut(&id)
    }

    /// Live creatures in ascending id order
    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values()
    }

    pub fn body(&self, id: EntityId) -> Option<BodyState> {
        self.mover.body(id)
    }

    pub fn live_count(&self) -> usize {
        self.creatures.len()
    }

    pub fn telemetry(&self) -> &EpisodeTracker {
        &self.telemetry
    }

    pub fn lineage(&self) -> &LineageTree {
        &self.lineage
    }

    /// Events recorded since the last tick, such as founder births
    pub fn pending_events(&self) -> &[LifecycleEvent] {
        self.events.events()
    }

    /// Number of completed ticks
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synlife_creature::IdlePolicy;

    fn config(capacity: usize, founders: usize) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.population.capacity = capacity;
        config.population.initial_population = founders;
        config
    }

    #[test]
    fn test_spawn_founders_respects_capacity() {
        let mut sim = Simulation::new(config(3, 5));
        let founders = sim.spawn_founders();

        assert_eq!(founders.len(), 3);
        assert_eq!(sim.live_count(), 3);
        assert_eq!(sim.population().count(), 3);
        assert_eq!(sim.pending_events().len(), 3);
        for id in founders {
            let body = sim.body(id).unwrap();
            assert!(body.position.abs().max_element() <= 25.0);
        }
    }

    #[test]
    fn test_tick_advances_time_and_counts() {
        let mut sim = Simulation::new(config(5, 2));
        sim.spawn_founders();
        let report = sim.tick(0.1, &mut IdlePolicy);

        assert_eq!(report.tick, 0);
        assert_eq!(report.rewards.len(), 2);
        assert_eq!(report.count("BIRTH"), 2);
        assert_eq!(sim.tick_count(), 1);
        assert!((sim.time() - 0.1).abs() < 1e-9);
        assert!((sim.field().time() - 0.1).abs() < 1e-6);
        assert!(sim.pending_events().is_empty());
        assert_eq!(sim.lineage().len(), 2);
    }

    #[test]
    fn test_non_finite_dt_is_zero() {
        let mut sim = Simulation::new(config(5, 1));
        sim.spawn_founders();
        sim.tick(f32::NAN, &mut IdlePolicy);
        assert_eq!(sim.time(), 0.0);
    }

    #[test]
    fn test_constructors_sanitize_config() {
        let mut degenerate = config(0, 0);
        degenerate.arena.size = -50.0;
        degenerate.arena.eat_radius = -1.0;

        let sim = Simulation::new(degenerate.clone());
        assert_eq!(sim.config().population.capacity, 1);
        assert_eq!(sim.config().arena.size, 50.0);
        assert_eq!(sim.config().arena.eat_radius, 0.0);

        let mover = KinematicMover::new(1.0, 90.0, 50.0);
        let sim = Simulation::with_mover(degenerate, mover);
        assert_eq!(sim.config().arena.size, 50.0);
        assert_eq!(sim.population().capacity(), 1);
    }

    #[test]
    fn test_roster_hides_dead() {
        let mut sim = Simulation::new(config(5, 1));
        let id = sim.spawn_founders()[0];
        assert!(Roster(&sim.creatures).integrity_of(id).is_some());
        sim.creature_mut(id).unwrap().end(DeathCause::Integrity);
        assert!(Roster(&sim.creatures).integrity_of(id).is_none());
    }

    #[test]
    fn test_place_food_is_clamped() {
        let mut sim = Simulation::new(config(5, 0));
        let id = sim.place_food(Vec2::new(100.0, 0.0), 10.0).unwrap();
        assert_eq!(sim.food().get(id).unwrap().position, Vec2::new(25.0, 0.0));
    }
}
