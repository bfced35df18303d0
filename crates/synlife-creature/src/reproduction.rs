//! Reproduction eligibility and offspring creation

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::config::CreatureConfig;
use crate::genome::{Genome, GenomeRanges};
use crate::growth::GrowthSystem;
use crate::homeostasis::Physiology;
use crate::population::{MutationSeed, PopulationManager};
use crate::types::{EntityId, Lineage};

/// Energy threshold raise per unit of reproduction conservatism
const CONSERVATISM_ENERGY_FACTOR: f32 = 0.2;

/// Why a reproduction attempt was refused, in check order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ineligible {
    /// Not an adult, underfed, or stressed
    Growth,
    Energy,
    Integrity,
    Cooldown,
    /// Inside the post-reproduction vulnerability window
    Vulnerable,
    PopulationFull,
}

impl std::fmt::Display for Ineligible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Ineligible::Growth => "growth not ready",
            Ineligible::Energy => "insufficient energy",
            Ineligible::Integrity => "insufficient integrity",
            Ineligible::Cooldown => "cooling down",
            Ineligible::Vulnerable => "vulnerable",
            Ineligible::PopulationFull => "population full",
        };
        f.write_str(reason)
    }
}

/// Everything needed to instantiate a newborn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conception {
    pub id: EntityId,
    pub genome: Genome,
    pub lineage: Lineage,
    pub seed: MutationSeed,
}

/// Per-creature reproduction state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReproductionController {
    /// Seconds until reproduction is allowed again
    pub cooldown: f32,
    /// End of the vulnerability window, in simulation seconds
    pub vulnerable_until: Option<f64>,
    pub attempts: u32,
    pub successes: u32,
    pub failures: u32,
}

impl ReproductionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum energy for reproduction: `max_energy * (base + conservatism * 0.2)`
    pub fn energy_threshold(config: &CreatureConfig, genome: &Genome, max_energy: f32) -> f32 {
        max_energy
            * (config.reproduction_energy_threshold
                + genome.reproduction_conservatism * CONSERVATISM_ENERGY_FACTOR)
    }

    pub fn is_vulnerable(&self, time: f64) -> bool {
        self.vulnerable_until.is_some_and(|until| time <= until)
    }

    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
    }

    /// Check every reproduction gate, reporting the first that fails
    pub fn check(
        &self,
        growth: &GrowthSystem,
        physiology: &Physiology,
        config: &CreatureConfig,
        population: &PopulationManager,
        time: f64,
    ) -> Result<(), Ineligible> {
        if !growth.can_reproduce() {
            return Err(Ineligible::Growth);
        }
        let threshold =
            Self::energy_threshold(config, growth.genome(), growth.stats().max_energy);
        if physiology.energy < threshold {
            return Err(Ineligible::Energy);
        }
        if physiology.integrity < config.reproduction_integrity_threshold {
            return Err(Ineligible::Integrity);
        }
        if self.cooldown > 0.0 {
            return Err(Ineligible::Cooldown);
        }
        if self.is_vulnerable(time) {
            return Err(Ineligible::Vulnerable);
        }
        if !population.can_spawn() {
            return Err(Ineligible::PopulationFull);
        }
        Ok(())
    }

    /// Check eligibility and reproduce if allowed
    ///
    /// A refused attempt only bumps the failure counter.
    #[allow(clippy::too_many_arguments)]
    pub fn attempt(
        &mut self,
        parent: EntityId,
        lineage: &Lineage,
        growth: &GrowthSystem,
        physiology: &mut Physiology,
        config: &CreatureConfig,
        ranges: &GenomeRanges,
        population: &mut PopulationManager,
        time: f64,
    ) -> Result<Conception, Ineligible> {
        self.attempts += 1;
        if let Err(reason) = self.check(growth, physiology, config, population, time) {
            self.failures += 1;
            log::trace!("{} cannot reproduce: {}", parent, reason);
            return Err(reason);
        }
        Ok(self.reproduce(
            parent,
            lineage,
            growth.genome(),
            physiology,
            config,
            ranges,
            population,
            time,
        ))
    }

    /// Produce exactly one offspring, without checking eligibility
    ///
    /// Deducts the energy cost, starts the cooldown and vulnerability window,
    /// draws a mutation seed from the population, mutates and clamps the
    /// parent genome, and registers the child.
    #[allow(clippy::too_many_arguments)]
    pub fn reproduce(
        &mut self,
        parent: EntityId,
        lineage: &Lineage,
        parent_genome: &Genome,
        physiology: &mut Physiology,
        config: &CreatureConfig,
        ranges: &GenomeRanges,
        population: &mut PopulationManager,
        time: f64,
    ) -> Conception {
        physiology.spend(config.reproduction_energy_cost);
        self.cooldown = config.reproduction_cooldown;
        self.vulnerable_until = Some(time + config.reproduction_vulnerability_duration as f64);

        let seed = population.issue_mutation_seed(parent);
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed.seed);
        let genome = Genome::mutate(
            &mut rng,
            parent_genome,
            ranges,
            config.mutation_rate,
            config.mutation_strength,
        )
        .clamp(ranges);

        let id = population.allocate_id();
        let child_lineage = Lineage::offspring_of(parent, lineage, seed.birth_index);
        population.register(id, time);
        self.successes += 1;

        log::info!(
            "{} reproduced: {} (generation {}, genome {:x})",
            parent,
            id,
            child_lineage.generation,
            genome.signature()
        );

        Conception {
            id,
            genome,
            lineage: child_lineage,
            seed,
        }
    }
}
