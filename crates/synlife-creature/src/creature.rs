//! Main creature entity
//!
//! Combines genome, growth, physiology, reproduction and reward state into a
//! single aggregate with one [`Creature::tick`] entry point.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::behavior::{Action, MovementIntent};
use crate::config::{CreatureConfig, RewardConfig};
use crate::events::{EventKind, EventSink, LifecycleEvent};
use crate::genome::{Genome, GenomeRanges};
use crate::growth::GrowthSystem;
use crate::homeostasis::{Physiology, Surroundings};
use crate::population::PopulationManager;
use crate::reproduction::{Conception, ReproductionController};
use crate::rewards::RewardTracker;
use crate::sensors::{Observation, SensorState};
use crate::traits::{FieldAccess, NutrientSource};
use crate::types::{BodyState, DeathCause, EntityId, FoodId, Lineage};
use crate::world_interaction::{consume_food, ZoneRegistry};

/// Offspring are placed this far to the parent's right
const OFFSPRING_OFFSET: f32 = 2.0;

/// Everything a creature reads or writes during one tick
pub struct TickContext<'a> {
    pub dt: f32,
    /// Simulation time at the start of the tick, seconds
    pub time: f64,
    pub tick: u64,
    pub config: &'a CreatureConfig,
    pub rewards: &'a RewardConfig,
    pub ranges: &'a GenomeRanges,
    /// Body state reported by the movement provider
    pub body: BodyState,
    pub field: &'a mut dyn FieldAccess,
    pub zones: &'a ZoneRegistry,
    pub population: &'a mut PopulationManager,
    pub events: &'a mut dyn EventSink,
    pub food: &'a mut dyn NutrientSource,
    /// Food items overlapping the creature this tick
    pub contacts: &'a [FoodId],
}

impl TickContext<'_> {
    fn emit(&mut self, id: EntityId, position: Vec2, kind: EventKind) {
        self.events.record(LifecycleEvent {
            id,
            tick: self.tick,
            time: self.time,
            position,
            kind,
        });
    }
}

/// A newborn and where to place it
#[derive(Debug, Clone)]
pub struct Offspring {
    pub creature: Creature,
    pub position: Vec2,
}

/// Result of one creature tick
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    pub movement: MovementIntent,
    /// Reward accumulated during this tick
    pub reward: f32,
    pub offspring: Option<Offspring>,
    pub death: Option<DeathCause>,
}

/// Main creature entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub id: EntityId,
    pub lineage: Lineage,
    pub physiology: Physiology,
    pub growth: GrowthSystem,
    pub reproduction: ReproductionController,
    pub rewards: RewardTracker,
    pub sensors: SensorState,

    pub scan_count: u32,
    pub spawn_time: f64,
    pub ticks_alive: u64,
    /// Genome signature at spawn
    pub birth_signature: i64,

    death: Option<DeathCause>,
}

impl Creature {
    /// Create a creature with initialized growth and physiology
    pub fn spawn(
        id: EntityId,
        genome: Genome,
        lineage: Lineage,
        config: &CreatureConfig,
        time: f64,
    ) -> Self {
        let growth = GrowthSystem::new(config, genome);
        let mut physiology = Physiology::new(config, &genome);
        physiology.clamp(growth.stats().max_energy);
        Self {
            id,
            lineage,
            physiology,
            growth,
            reproduction: ReproductionController::new(),
            rewards: RewardTracker::new(),
            sensors: SensorState::default(),
            scan_count: 0,
            spawn_time: time,
            ticks_alive: 0,
            birth_signature: genome.signature(),
            death: None,
        }
    }

    /// Instantiate the creature described by a conception
    pub fn from_conception(conception: &Conception, config: &CreatureConfig, time: f64) -> Self {
        Self::spawn(
            conception.id,
            conception.genome,
            conception.lineage,
            config,
            time,
        )
    }

    pub fn genome(&self) -> &Genome {
        self.growth.genome()
    }

    /// Replace the genome; derived stats follow, the temperature target does not
    pub fn set_genome(&mut self, genome: Genome) {
        self.growth.set_genome(genome);
    }

    pub fn max_energy(&self) -> f32 {
        self.growth.stats().max_energy
    }

    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death
    }

    /// End the lifecycle from outside, e.g. on eviction. Returns false if already dead.
    pub fn end(&mut self, cause: DeathCause) -> bool {
        if self.death.is_some() {
            return false;
        }
        self.death = Some(cause);
        true
    }

    /// Build the policy observation for the current state
    pub fn observe(
        &mut self,
        config: &CreatureConfig,
        body: &BodyState,
        zones: &ZoneRegistry,
        field: &mut dyn FieldAccess,
    ) -> Observation {
        Observation::gather(
            &self.physiology,
            &self.growth,
            self.reproduction.cooldown,
            config,
            body,
            zones.is_sheltered(body.position),
            field,
            &mut self.sensors,
        )
    }

    /// Advance this creature by one tick
    ///
    /// Applies locomotion cost, eats overlapping food, scans, attempts
    /// reproduction, takes hazard damage, runs homeostasis and growth, then
    /// checks for death. A dead or uninitialized creature does nothing.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>, action: &Action) -> TickOutcome {
        if !self.is_alive() || !self.growth.is_initialized() {
            return TickOutcome::default();
        }

        let action = action.sanitized();
        let dt = ctx.dt.max(0.0);
        let position = ctx.body.position;
        let mut outcome = TickOutcome {
            movement: MovementIntent {
                forward: action.move_intent,
                turn: action.turn_intent,
            },
            ..Default::default()
        };

        // Locomotion
        let move_cost = action.move_intent.abs() * self.growth.stats().locomotion_cost * dt;
        self.physiology.spend(move_cost);

        self.eat(ctx, position);

        // Scan
        self.sensors.scanned_last_step = false;
        let scan_cost = self.growth.stats().scan_cost;
        if action.scan && self.physiology.energy > scan_cost {
            self.physiology.spend(scan_cost);
            self.scan_count += 1;
            self.sensors.scanned_last_step = true;
            ctx.field.trigger_back_action(position);
            ctx.emit(
                self.id,
                position,
                EventKind::Scan {
                    cost: scan_cost,
                    total_scans: self.scan_count,
                },
            );
        }

        if action.reproduce {
            outcome.offspring = self.try_reproduce(ctx);
        }

        // Hazards
        let damage = ctx.zones.hazard_damage_rate(position) * dt;
        if damage > 0.0 {
            self.physiology.damage(damage);
            self.rewards.penalize_damage(ctx.rewards, dt);
            ctx.emit(self.id, position, EventKind::Damage { amount: damage });
        }

        let surroundings = Surroundings {
            ambient_temperature: ctx.zones.ambient_temperature(position),
            sheltered: ctx.zones.is_sheltered(position),
        };
        self.physiology
            .regulate(dt, surroundings, self.growth.stats());

        let transition = self.growth.update(
            dt,
            self.physiology.energy,
            self.physiology.integrity,
            surroundings.ambient_temperature,
            self.physiology.target_temperature(),
        );
        if let Some(transition) = transition {
            ctx.emit(
                self.id,
                position,
                EventKind::StageChange {
                    from: transition.from,
                    to: transition.to,
                },
            );
        }
        // Size may have shrunk the capacity
        self.physiology.clamp(self.growth.stats().max_energy);

        self.reproduction.tick_cooldown(dt);
        self.ticks_alive += 1;

        if let Some(cause) = self.physiology.death_cause(ctx.config) {
            self.death = Some(cause);
            // Frees the slot for creatures updated later in the same tick
            ctx.population.unregister(self.id);
            self.rewards.penalize_death(ctx.rewards);
            log::info!(
                "{} died of {} at age {:.1} (generation {})",
                self.id,
                cause,
                self.growth.age,
                self.lineage.generation
            );
            ctx.emit(
                self.id,
                position,
                EventKind::Death {
                    cause,
                    age: self.growth.age,
                },
            );
            outcome.death = Some(cause);
        } else {
            self.rewards.reward_vitals(
                ctx.rewards,
                &self.physiology,
                self.growth.stats().max_energy,
                dt,
            );
            self.rewards.reward_exploration(ctx.rewards, position);
        }

        outcome.reward = self.rewards.take_step_reward();
        outcome
    }

    fn eat(&mut self, ctx: &mut TickContext<'_>, position: Vec2) {
        for &item in ctx.contacts {
            let Some(nutrient) = consume_food(
                ctx.food,
                &*ctx.field,
                item,
                position,
                self.genome().field_affinity,
            ) else {
                continue;
            };
            self.physiology
                .feed(nutrient, self.growth.stats().max_energy);
            self.rewards.reward_food(ctx.rewards, nutrient);
            ctx.emit(
                self.id,
                position,
                EventKind::Eat {
                    nutrient,
                    total_food: self.rewards.food_count,
                },
            );
        }
    }

    fn try_reproduce(&mut self, ctx: &mut TickContext<'_>) -> Option<Offspring> {
        let position = ctx.body.position;
        let result = self.reproduction.attempt(
            self.id,
            &self.lineage,
            &self.growth,
            &mut self.physiology,
            ctx.config,
            ctx.ranges,
            ctx.population,
            ctx.time,
        );
        ctx.emit(
            self.id,
            position,
            EventKind::ReproduceAttempt {
                outcome: result.map(|_| ()),
            },
        );

        let conception = result.ok()?;
        self.rewards.reward_reproduction(ctx.rewards);
        ctx.emit(
            self.id,
            position,
            EventKind::ReproduceSuccess {
                child: conception.id,
                birth_index: conception.seed.birth_index,
                seed: conception.seed.seed,
            },
        );

        let spawn_position = position + ctx.body.right() * OFFSPRING_OFFSET;
        let child = Creature::from_conception(&conception, ctx.config, ctx.time);
        ctx.emit(
            child.id,
            spawn_position,
            EventKind::Birth {
                parent: child.lineage.parent,
                generation: child.lineage.generation,
                genome_signature: child.birth_signature,
            },
        );

        Some(Offspring {
            creature: child,
            position: spawn_position,
        })
    }
}
