//! Age, size and life-stage progression
//!
//! The growth system is a monotonic state machine over [`LifeStage`]. Each
//! update ages the creature, tracks smoothed nutrition and stress histories,
//! advances the stage at most one step, relaxes size toward an age- and
//! nutrition-dependent target, and recomputes the size-scaled stats.

use serde::{Deserialize, Serialize};

use crate::config::CreatureConfig;
use crate::genome::Genome;
use crate::types::LifeStage;

/// Integrity below which the creature counts as stressed
const STRESS_INTEGRITY: f32 = 0.8;
const NUTRITION_RATE: f32 = 0.1;
const STRESS_RISE_RATE: f32 = 0.2;
const STRESS_FALL_RATE: f32 = 0.1;
/// Elder threshold as a multiple of the maturity age
const ELDER_AGE_FACTOR: f32 = 1.5;

/// Life-history parameters copied out of [`CreatureConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthParams {
    pub initial_age: f32,
    pub initial_energy: f32,
    pub maturity_age_min: f32,
    pub maturity_age_max: f32,
    pub max_age_min: f32,
    pub max_age_max: f32,
    pub size_growth_rate: f32,
    pub max_growth: f32,
    pub nutrition_threshold: f32,
    pub stress_threshold: f32,
}

impl From<&CreatureConfig> for GrowthParams {
    fn from(config: &CreatureConfig) -> Self {
        Self {
            initial_age: config.initial_age,
            initial_energy: config.initial_energy,
            maturity_age_min: config.maturity_age_min,
            maturity_age_max: config.maturity_age_max,
            max_age_min: config.max_age_min,
            max_age_max: config.max_age_max,
            size_growth_rate: config.size_growth_rate,
            max_growth: config.max_growth,
            nutrition_threshold: config.nutrition_threshold,
            stress_threshold: config.stress_threshold,
        }
    }
}

/// Size-scaled physiological stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub max_energy: f32,
    /// Energy drained per second at rest
    pub basal_metabolism: f32,
    /// Energy per second at full move intent
    pub locomotion_cost: f32,
    /// Energy per scan
    pub scan_cost: f32,
}

impl DerivedStats {
    pub fn compute(genome: &Genome, size: f32) -> Self {
        Self {
            max_energy: genome.base_energy_capacity * size,
            basal_metabolism: genome.basal_metabolism * size.powf(0.75),
            locomotion_cost: genome.move_efficiency * size.powf(1.5),
            scan_cost: genome.scan_cost * size,
        }
    }
}

/// A single-step stage advance reported by [`GrowthSystem::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub from: LifeStage,
    pub to: LifeStage,
}

/// Per-creature growth state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthSystem {
    pub age: f32,
    pub stage: LifeStage,
    pub size: f32,
    pub nutrition_history: f32,
    pub stress_history: f32,
    stats: DerivedStats,
    genome: Genome,
    /// `None` until [`GrowthSystem::initialize`] runs; updates are no-ops meanwhile
    params: Option<GrowthParams>,
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

impl GrowthSystem {
    /// Growth system that has not been initialized yet
    pub fn uninitialized(genome: Genome) -> Self {
        Self {
            age: 0.0,
            stage: LifeStage::Juvenile,
            size: 1.0,
            nutrition_history: 0.0,
            stress_history: 0.0,
            stats: DerivedStats::compute(&genome, 1.0),
            genome,
            params: None,
        }
    }

    /// Growth system initialized from `config`
    pub fn new(config: &CreatureConfig, genome: Genome) -> Self {
        let mut growth = Self::uninitialized(genome);
        growth.initialize(config, genome);
        growth
    }

    /// Reset to the configured initial age, unit size and neutral histories
    pub fn initialize(&mut self, config: &CreatureConfig, genome: Genome) {
        let params = GrowthParams::from(config);
        self.genome = genome;
        self.age = params.initial_age;
        self.stage = LifeStage::Juvenile;
        self.size = 1.0;
        self.nutrition_history = 0.5;
        self.stress_history = 0.5;
        self.params = Some(params);
        self.update_derived_stats();
    }

    pub fn is_initialized(&self) -> bool {
        self.params.is_some()
    }

    pub fn params(&self) -> Option<&GrowthParams> {
        self.params.as_ref()
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn stats(&self) -> &DerivedStats {
        &self.stats
    }

    /// Replace the genome and recompute derived stats
    pub fn set_genome(&mut self, genome: Genome) {
        self.genome = genome;
        self.update_derived_stats();
    }

    /// Age at which the creature stops aging
    pub fn max_age(&self) -> Option<f32> {
        self.params
            .map(|p| lerp(p.max_age_min, p.max_age_max, self.genome.max_age_norm))
    }

    /// Age at which a well-fed juvenile matures
    pub fn maturity_age(&self) -> Option<f32> {
        self.params.map(|p| {
            lerp(
                p.maturity_age_min,
                p.maturity_age_max,
                self.genome.maturity_age_norm,
            )
        })
    }

    /// Advance growth by `dt` seconds
    ///
    /// Returns the stage transition taken this update, if any. Does nothing
    /// before initialization.
    pub fn update(
        &mut self,
        dt: f32,
        current_energy: f32,
        current_integrity: f32,
        ambient_temp: f32,
        target_temp: f32,
    ) -> Option<StageTransition> {
        let params = self.params?;
        let growth_rate = self.genome.growth_rate;

        let max_age = lerp(params.max_age_min, params.max_age_max, self.genome.max_age_norm);
        self.age = (self.age + dt * growth_rate).min(max_age);

        let well_fed = current_energy > params.initial_energy * params.nutrition_threshold;
        let nutrition_target = if well_fed { 1.0 } else { 0.0 };
        self.nutrition_history = lerp(
            self.nutrition_history,
            nutrition_target,
            dt * NUTRITION_RATE,
        );

        let temp_stress = (ambient_temp - target_temp).abs();
        if current_integrity < STRESS_INTEGRITY || temp_stress > params.stress_threshold {
            self.stress_history = lerp(self.stress_history, 1.0, dt * STRESS_RISE_RATE);
        } else {
            self.stress_history = lerp(self.stress_history, 0.0, dt * STRESS_FALL_RATE);
        }

        let transition = self.update_life_stage(&params);

        let target_size = if max_age > 0.0 {
            1.0 + (self.age / max_age) * params.max_growth * self.nutrition_history * growth_rate
        } else {
            1.0
        };
        self.size = lerp(
            self.size,
            target_size,
            dt * params.size_growth_rate * growth_rate,
        )
        .clamp(1.0, 1.0 + params.max_growth);

        self.update_derived_stats();
        transition
    }

    fn update_life_stage(&mut self, params: &GrowthParams) -> Option<StageTransition> {
        let maturity_age = lerp(
            params.maturity_age_min,
            params.maturity_age_max,
            self.genome.maturity_age_norm,
        );

        let next = match self.stage {
            LifeStage::Juvenile
                if self.age >= maturity_age
                    && self.nutrition_history > params.nutrition_threshold =>
            {
                Some(LifeStage::Adult)
            }
            LifeStage::Adult if self.age >= maturity_age * ELDER_AGE_FACTOR => {
                Some(LifeStage::Elder)
            }
            _ => None,
        }?;

        let transition = StageTransition {
            from: self.stage,
            to: next,
        };
        log::debug!(
            "Life stage {} -> {} at age {:.1}",
            transition.from,
            transition.to,
            self.age
        );
        self.stage = next;
        Some(transition)
    }

    fn update_derived_stats(&mut self) {
        self.stats = DerivedStats::compute(&self.genome, self.size);
    }

    /// Growth-side reproduction gate: adult, well fed and not stressed
    pub fn can_reproduce(&self) -> bool {
        let Some(params) = self.params else {
            return false;
        };
        self.stage == LifeStage::Adult
            && self.nutrition_history > params.nutrition_threshold
            && self.stress_history < params.stress_threshold
    }
}
