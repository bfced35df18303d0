//! Common types for creatures
//!
//! Identifiers, life stages, lineage and body state shared between the
//! creature crate and the world crate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Unique identifier for a creature
///
/// Identifiers are issued by the [`PopulationManager`](crate::PopulationManager)
/// of a run; there is no process-wide counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Create an EntityId from a raw u64
    pub fn from_raw(id: u64) -> Self {
        EntityId(id)
    }

    /// Get the raw u64 value (useful for debugging/serialization)
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Creature({})", self.0)
    }
}

/// Identifier of a food item owned by a nutrient provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FoodId(pub u64);

/// Discrete maturity category
///
/// Ordered: `Juvenile < Adult < Elder`. A creature only ever advances.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum LifeStage {
    #[default]
    Juvenile,
    Adult,
    Elder,
}

impl LifeStage {
    /// The stage after this one, `None` for the terminal stage
    pub fn next(self) -> Option<LifeStage> {
        match self {
            LifeStage::Juvenile => Some(LifeStage::Adult),
            LifeStage::Adult => Some(LifeStage::Elder),
            LifeStage::Elder => None,
        }
    }

    /// One-hot encoding `[juvenile, adult, elder]`
    pub fn one_hot(self) -> [f32; 3] {
        match self {
            LifeStage::Juvenile => [1.0, 0.0, 0.0],
            LifeStage::Adult => [0.0, 1.0, 0.0],
            LifeStage::Elder => [0.0, 0.0, 1.0],
        }
    }
}

impl std::fmt::Display for LifeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifeStage::Juvenile => "Juvenile",
            LifeStage::Adult => "Adult",
            LifeStage::Elder => "Elder",
        };
        f.write_str(name)
    }
}

/// Why a creature's lifecycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    Integrity,
    Temperature,
    /// Removed by the population capacity sweep
    Evicted,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::Starvation => "starvation",
            DeathCause::Integrity => "integrity",
            DeathCause::Temperature => "temperature",
            DeathCause::Evicted => "evicted",
        }
    }
}

impl std::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ancestry of a creature. Parent links are identifiers only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lineage {
    pub parent: Option<EntityId>,
    pub generation: u32,
    /// Birth index issued with the mutation seed, `None` for founders
    pub birth_index: Option<u64>,
}

impl Lineage {
    /// Lineage of a founder creature
    pub fn founder() -> Self {
        Self::default()
    }

    /// Lineage of an offspring of `parent`
    pub fn offspring_of(parent: EntityId, parent_lineage: &Lineage, birth_index: u64) -> Self {
        Self {
            parent: Some(parent),
            generation: parent_lineage.generation + 1,
            birth_index: Some(birth_index),
        }
    }
}

/// Kinematic state reported by the movement provider
///
/// Positions live in the arena plane; `x`/`y` of the vector map to the
/// world's x/z axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Unit forward vector
    pub heading: Vec2,
}

impl BodyState {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            heading: Vec2::Y,
        }
    }

    /// Unit vector pointing to the creature's right
    pub fn right(&self) -> Vec2 {
        Vec2::new(self.heading.y, -self.heading.x)
    }
}

impl Default for BodyState {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_stage_ordering() {
        assert!(LifeStage::Juvenile < LifeStage::Adult);
        assert!(LifeStage::Adult < LifeStage::Elder);
        assert_eq!(LifeStage::Juvenile.next(), Some(LifeStage::Adult));
        assert_eq!(LifeStage::Elder.next(), None);
    }

    #[test]
    fn test_offspring_lineage() {
        let parent = EntityId::from_raw(7);
        let parent_lineage = Lineage {
            parent: None,
            generation: 3,
            birth_index: None,
        };
        let child = Lineage::offspring_of(parent, &parent_lineage, 12);
        assert_eq!(child.parent, Some(parent));
        assert_eq!(child.generation, 4);
        assert_eq!(child.birth_index, Some(12));
    }

    #[test]
    fn test_body_right_vector() {
        let body = BodyState::at(Vec2::ZERO);
        // Facing +z, right is +x
        assert_eq!(body.right(), Vec2::X);
    }

    #[test]
    fn test_death_cause_names() {
        assert_eq!(DeathCause::Starvation.as_str(), "starvation");
        assert_eq!(DeathCause::Evicted.to_string(), "evicted");
    }
}
