//! Inherited trait vector
//!
//! A [`Genome`] is an immutable value: operators return new genomes and
//! inheritance copies. Every trait is kept within the range configured for it
//! in [`GenomeRanges`].

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Names of the genome traits, in signature order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraitKind {
    // Instinct biases
    HungerUrgency,
    DangerAversion,
    ScanCuriosity,
    ExplorationNoise,
    ReproductionConservatism,
    // Life history
    GrowthRate,
    MaturityAgeNorm,
    MaxAgeNorm,
    // Physiology
    BaseEnergyCapacity,
    BasalMetabolism,
    MoveEfficiency,
    TemperatureTolerance,
    AntennaGain,
    ScanCost,
    ScanRadius,
    FieldAffinity,
}

impl TraitKind {
    pub const COUNT: usize = 16;

    pub const ALL: [TraitKind; Self::COUNT] = [
        TraitKind::HungerUrgency,
        TraitKind::DangerAversion,
        TraitKind::ScanCuriosity,
        TraitKind::ExplorationNoise,
        TraitKind::ReproductionConservatism,
        TraitKind::GrowthRate,
        TraitKind::MaturityAgeNorm,
        TraitKind::MaxAgeNorm,
        TraitKind::BaseEnergyCapacity,
        TraitKind::BasalMetabolism,
        TraitKind::MoveEfficiency,
        TraitKind::TemperatureTolerance,
        TraitKind::AntennaGain,
        TraitKind::ScanCost,
        TraitKind::ScanRadius,
        TraitKind::FieldAffinity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TraitKind::HungerUrgency => "hunger_urgency",
            TraitKind::DangerAversion => "danger_aversion",
            TraitKind::ScanCuriosity => "scan_curiosity",
            TraitKind::ExplorationNoise => "exploration_noise",
            TraitKind::ReproductionConservatism => "reproduction_conservatism",
            TraitKind::GrowthRate => "growth_rate",
            TraitKind::MaturityAgeNorm => "maturity_age_norm",
            TraitKind::MaxAgeNorm => "max_age_norm",
            TraitKind::BaseEnergyCapacity => "base_energy_capacity",
            TraitKind::BasalMetabolism => "basal_metabolism",
            TraitKind::MoveEfficiency => "move_efficiency",
            TraitKind::TemperatureTolerance => "temperature_tolerance",
            TraitKind::AntennaGain => "antenna_gain",
            TraitKind::ScanCost => "scan_cost",
            TraitKind::ScanRadius => "scan_radius",
            TraitKind::FieldAffinity => "field_affinity",
        }
    }
}

/// Inclusive `[min, max]` bound for one trait
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitRange {
    pub min: f32,
    pub max: f32,
}

impl TraitRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Project a value into the range. Inverted bounds are treated as swapped
    /// and NaN maps to the lower bound.
    pub fn clamp(&self, value: f32) -> f32 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        if value.is_nan() {
            return lo;
        }
        value.clamp(lo, hi)
    }

    pub fn contains(&self, value: f32) -> bool {
        self.clamp(value) == value
    }
}

/// Per-trait valid ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeRanges {
    pub hunger_urgency: TraitRange,
    pub danger_aversion: TraitRange,
    pub scan_curiosity: TraitRange,
    pub exploration_noise: TraitRange,
    pub reproduction_conservatism: TraitRange,
    pub growth_rate: TraitRange,
    pub maturity_age_norm: TraitRange,
    pub max_age_norm: TraitRange,
    pub base_energy_capacity: TraitRange,
    pub basal_metabolism: TraitRange,
    pub move_efficiency: TraitRange,
    pub temperature_tolerance: TraitRange,
    pub antenna_gain: TraitRange,
    pub scan_cost: TraitRange,
    pub scan_radius: TraitRange,
    pub field_affinity: TraitRange,
}

impl GenomeRanges {
    pub fn range(&self, kind: TraitKind) -> TraitRange {
        match kind {
            TraitKind::HungerUrgency => self.hunger_urgency,
            TraitKind::DangerAversion => self.danger_aversion,
            TraitKind::ScanCuriosity => self.scan_curiosity,
            TraitKind::ExplorationNoise => self.exploration_noise,
            TraitKind::ReproductionConservatism => self.reproduction_conservatism,
            TraitKind::GrowthRate => self.growth_rate,
            TraitKind::MaturityAgeNorm => self.maturity_age_norm,
            TraitKind::MaxAgeNorm => self.max_age_norm,
            TraitKind::BaseEnergyCapacity => self.base_energy_capacity,
            TraitKind::BasalMetabolism => self.basal_metabolism,
            TraitKind::MoveEfficiency => self.move_efficiency,
            TraitKind::TemperatureTolerance => self.temperature_tolerance,
            TraitKind::AntennaGain => self.antenna_gain,
            TraitKind::ScanCost => self.scan_cost,
            TraitKind::ScanRadius => self.scan_radius,
            TraitKind::FieldAffinity => self.field_affinity,
        }
    }
}

impl Default for GenomeRanges {
    fn default() -> Self {
        let unit = TraitRange::new(0.0, 1.0);
        Self {
            hunger_urgency: unit,
            danger_aversion: unit,
            scan_curiosity: unit,
            exploration_noise: unit,
            reproduction_conservatism: unit,
            growth_rate: TraitRange::new(0.5, 2.0),
            maturity_age_norm: unit,
            max_age_norm: unit,
            base_energy_capacity: TraitRange::new(50.0, 200.0),
            basal_metabolism: TraitRange::new(0.1, 5.0),
            move_efficiency: TraitRange::new(0.5, 2.0),
            temperature_tolerance: TraitRange::new(0.1, 0.9),
            antenna_gain: TraitRange::new(0.1, 3.0),
            scan_cost: TraitRange::new(0.5, 10.0),
            scan_radius: TraitRange::new(2.0, 15.0),
            field_affinity: TraitRange::new(-1.0, 1.0),
        }
    }
}

/// Heritable trait vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub hunger_urgency: f32,
    pub danger_aversion: f32,
    pub scan_curiosity: f32,
    pub exploration_noise: f32,
    pub reproduction_conservatism: f32,
    pub growth_rate: f32,
    pub maturity_age_norm: f32,
    pub max_age_norm: f32,
    pub base_energy_capacity: f32,
    pub basal_metabolism: f32,
    pub move_efficiency: f32,
    pub temperature_tolerance: f32,
    pub antenna_gain: f32,
    pub scan_cost: f32,
    pub scan_radius: f32,
    pub field_affinity: f32,
}

impl Genome {
    /// Baseline genome, projected into `ranges`
    pub fn create_default(ranges: &GenomeRanges) -> Self {
        let baseline = Self {
            hunger_urgency: 0.5,
            danger_aversion: 0.5,
            scan_curiosity: 0.5,
            exploration_noise: 0.2,
            reproduction_conservatism: 0.5,
            growth_rate: 1.0,
            maturity_age_norm: 0.5,
            max_age_norm: 0.5,
            base_energy_capacity: 100.0,
            basal_metabolism: 1.0,
            move_efficiency: 1.0,
            temperature_tolerance: 0.5,
            antenna_gain: 1.0,
            scan_cost: 2.0,
            scan_radius: 5.0,
            field_affinity: 0.0,
        };
        baseline.clamp(ranges)
    }

    /// Build a genome from values in [`TraitKind::ALL`] order. Not range checked.
    pub fn from_values(values: [f32; TraitKind::COUNT]) -> Self {
        let mut genome = Self::zeroed();
        for (kind, value) in TraitKind::ALL.iter().zip(values) {
            genome.set(*kind, value);
        }
        genome
    }

    fn zeroed() -> Self {
        Self {
            hunger_urgency: 0.0,
            danger_aversion: 0.0,
            scan_curiosity: 0.0,
            exploration_noise: 0.0,
            reproduction_conservatism: 0.0,
            growth_rate: 0.0,
            maturity_age_norm: 0.0,
            max_age_norm: 0.0,
            base_energy_capacity: 0.0,
            basal_metabolism: 0.0,
            move_efficiency: 0.0,
            temperature_tolerance: 0.0,
            antenna_gain: 0.0,
            scan_cost: 0.0,
            scan_radius: 0.0,
            field_affinity: 0.0,
        }
    }

    pub fn get(&self, kind: TraitKind) -> f32 {
        match kind {
            TraitKind::HungerUrgency => self.hunger_urgency,
            TraitKind::DangerAversion => self.danger_aversion,
            TraitKind::ScanCuriosity => self.scan_curiosity,
            TraitKind::ExplorationNoise => self.exploration_noise,
            TraitKind::ReproductionConservatism => self.reproduction_conservatism,
            TraitKind::GrowthRate => self.growth_rate,
            TraitKind::MaturityAgeNorm => self.maturity_age_norm,
            TraitKind::MaxAgeNorm => self.max_age_norm,
            TraitKind::BaseEnergyCapacity => self.base_energy_capacity,
            TraitKind::BasalMetabolism => self.basal_metabolism,
            TraitKind::MoveEfficiency => self.move_efficiency,
            TraitKind::TemperatureTolerance => self.temperature_tolerance,
            TraitKind::AntennaGain => self.antenna_gain,
            TraitKind::ScanCost => self.scan_cost,
            TraitKind::ScanRadius => self.scan_radius,
            TraitKind::FieldAffinity => self.field_affinity,
        }
    }

    // Private: genomes are only changed by building a new value.
    fn set(&mut self, kind: TraitKind, value: f32) {
        let slot = match kind {
            TraitKind::HungerUrgency => &mut self.hunger_urgency,
            TraitKind::DangerAversion => &mut self.danger_aversion,
            TraitKind::ScanCuriosity => &mut self.scan_curiosity,
            TraitKind::ExplorationNoise => &mut self.exploration_noise,
            TraitKind::ReproductionConservatism => &mut self.reproduction_conservatism,
            TraitKind::GrowthRate => &mut self.growth_rate,
            TraitKind::MaturityAgeNorm => &mut self.maturity_age_norm,
            TraitKind::MaxAgeNorm => &mut self.max_age_norm,
            TraitKind::BaseEnergyCapacity => &mut self.base_energy_capacity,
            TraitKind::BasalMetabolism => &mut self.basal_metabolism,
            TraitKind::MoveEfficiency => &mut self.move_efficiency,
            TraitKind::TemperatureTolerance => &mut self.temperature_tolerance,
            TraitKind::AntennaGain => &mut self.antenna_gain,
            TraitKind::ScanCost => &mut self.scan_cost,
            TraitKind::ScanRadius => &mut self.scan_radius,
            TraitKind::FieldAffinity => &mut self.field_affinity,
        };
        *slot = value;
    }

    /// Values in [`TraitKind::ALL`] order
    pub fn values(&self) -> [f32; TraitKind::COUNT] {
        TraitKind::ALL.map(|kind| self.get(kind))
    }

    /// Produce a mutated copy of `parent`
    ///
    /// Each trait is independently selected with probability `mutation_rate`;
    /// selected traits get uniform noise in `[-strength, strength]` and are
    /// clamped to their range. Unselected traits are copied unchanged. All
    /// randomness comes from `rng`, so identical streams give identical
    /// offspring.
    pub fn mutate<R: Rng + ?Sized>(
        rng: &mut R,
        parent: &Genome,
        ranges: &GenomeRanges,
        mutation_rate: f32,
        mutation_strength: f32,
    ) -> Genome {
        let strength = if mutation_strength.is_finite() {
            mutation_strength.abs()
        } else {
            0.0
        };
        let mut child = *parent;
        for kind in TraitKind::ALL {
            if rng.random::<f32>() < mutation_rate {
                let noise = rng.random_range(-strength..=strength);
                let value = ranges.range(kind).clamp(parent.get(kind) + noise);
                child.set(kind, value);
            }
        }
        child
    }

    /// Project every trait into its range. Idempotent.
    pub fn clamp(&self, ranges: &GenomeRanges) -> Genome {
        let mut clamped = *self;
        for kind in TraitKind::ALL {
            clamped.set(kind, ranges.range(kind).clamp(self.get(kind)));
        }
        clamped
    }

    /// Check every trait against `ranges`
    pub fn is_within(&self, ranges: &GenomeRanges) -> bool {
        TraitKind::ALL
            .iter()
            .all(|&kind| ranges.range(kind).contains(self.get(kind)))
    }

    /// Per-trait linear interpolation, `t` clamped to `[0, 1]`.
    /// The result is not range checked.
    pub fn lerp(a: &Genome, b: &Genome, t: f32) -> Genome {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mut blended = *a;
        for kind in TraitKind::ALL {
            let (va, vb) = (a.get(kind), b.get(kind));
            blended.set(kind, va + (vb - va) * t);
        }
        blended
    }

    /// Order-sensitive hash of all trait values, for logging
    pub fn signature(&self) -> i64 {
        let mut hash: i64 = 17;
        for value in self.values() {
            // -0.0 and 0.0 are the same trait value
            let bits = (value + 0.0).to_bits() as i64;
            hash = hash.wrapping_mul(31).wrapping_add(bits);
        }
        hash
    }
}
