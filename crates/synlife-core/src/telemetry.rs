//! In-memory episode telemetry
//!
//! [`EpisodeTracker`] folds lifecycle events and per-tick vitals into one
//! summary per creature. [`LineageTree`] keeps the parent to child graph
//! built from birth events. Neither does any I/O.

use std::collections::BTreeMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use synlife_creature::{
    DeathCause, EntityId, EventKind, EventSink, LifeStage, LifecycleEvent, Physiology,
};

/// Everything that happened to one creature during the episode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub id: Option<EntityId>,
    pub parent: Option<EntityId>,
    pub generation: u32,
    pub birth_tick: u64,

    pub food_count: u32,
    pub total_nutrients: f32,
    pub scans: u32,
    pub reproduce_attempts: u32,
    pub reproduce_successes: u32,
    pub damage_events: u32,
    pub total_damage: f32,
    pub max_stage: LifeStage,

    energy_sum: f64,
    temperature_sum: f64,
    integrity_sum: f64,
    /// Ticks sampled with [`EpisodeTracker::record_vitals`]
    pub survival_ticks: u64,

    pub cause_of_death: Option<DeathCause>,
    pub death_tick: Option<u64>,
    pub start_signature: i64,
    pub end_signature: i64,
}

impl EpisodeSummary {
    fn mean(&self, sum: f64) -> f32 {
        if self.survival_ticks == 0 {
            0.0
        } else {
            (sum / self.survival_ticks as f64) as f32
        }
    }

    pub fn mean_energy(&self) -> f32 {
        self.mean(self.energy_sum)
    }

    pub fn mean_temperature(&self) -> f32 {
        self.mean(self.temperature_sum)
    }

    pub fn mean_integrity(&self) -> f32 {
        self.mean(self.integrity_sum)
    }

    pub fn is_alive(&self) -> bool {
        self.cause_of_death.is_none()
    }
}

/// Aggregates events and vitals per creature
#[derive(Debug, Default)]
pub struct EpisodeTracker {
    summaries: BTreeMap<EntityId, EpisodeSummary>,
    event_counts: BTreeMap<&'static str, u64>,
}

impl EpisodeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self, id: EntityId) -> Option<&EpisodeSummary> {
        self.summaries.get(&id)
    }

    pub fn summaries(&self) -> impl Iterator<Item = &EpisodeSummary> {
        self.summaries.values()
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Number of events seen with the given name, e.g. `"EAT"`
    pub fn event_count(&self, name: &str) -> u64 {
        self.event_counts.get(name).copied().unwrap_or(0)
    }

    /// Sample a living creature's vitals for the current tick
    pub fn record_vitals(
        &mut self,
        id: EntityId,
        physiology: &Physiology,
        stage: LifeStage,
        signature: i64,
    ) {
        let summary = self.entry(id);
        summary.energy_sum += physiology.energy as f64;
        summary.temperature_sum += physiology.temperature as f64;
        summary.integrity_sum += physiology.integrity as f64;
        summary.survival_ticks += 1;
        summary.max_stage = summary.max_stage.max(stage);
        summary.end_signature = signature;
    }

    /// Deaths grouped by cause name
    pub fn deaths_by_cause(&self) -> BTreeMap<&'static str, usize> {
        let mut deaths = BTreeMap::new();
        for cause in self.summaries.values().filter_map(|s| s.cause_of_death) {
            *deaths.entry(cause.as_str()).or_insert(0) += 1;
        }
        deaths
    }

    /// Mean survival ticks over creatures that have died
    pub fn mean_lifespan(&self) -> Option<f32> {
        let dead: Vec<u64> = self
            .summaries
            .values()
            .filter(|s| !s.is_alive())
            .map(|s| s.survival_ticks)
            .collect();
        if dead.is_empty() {
            return None;
        }
        Some(dead.iter().sum::<u64>() as f32 / dead.len() as f32)
    }

    fn entry(&mut self, id: EntityId) -> &mut EpisodeSummary {
        self.summaries.entry(id).or_insert_with(|| EpisodeSummary {
            id: Some(id),
            ..Default::default()
        })
    }
}

impl EventSink for EpisodeTracker {
    fn record(&mut self, event: LifecycleEvent) {
        *self.event_counts.entry(event.kind.name()).or_insert(0) += 1;
        let summary = self.entry(event.id);
        match event.kind {
            EventKind::Birth {
                parent,
                generation,
                genome_signature,
            } => {
                summary.parent = parent;
                summary.generation = generation;
                summary.birth_tick = event.tick;
                summary.start_signature = genome_signature;
                summary.end_signature = genome_signature;
            }
            EventKind::Eat {
                nutrient,
                total_food,
            } => {
                summary.food_count = total_food;
                summary.total_nutrients += nutrient;
            }
            EventKind::Scan { total_scans, .. } => summary.scans = total_scans,
            EventKind::Damage { amount } => {
                summary.damage_events += 1;
                summary.total_damage += amount;
            }
            EventKind::StageChange { to, .. } => {
                summary.max_stage = summary.max_stage.max(to);
            }
            EventKind::ReproduceAttempt { .. } => summary.reproduce_attempts += 1,
            EventKind::ReproduceSuccess { .. } => summary.reproduce_successes += 1,
            EventKind::Death { cause, .. } => {
                if summary.cause_of_death.is_none() {
                    summary.cause_of_death = Some(cause);
                    summary.death_tick = Some(event.tick);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineageNode {
    pub id: EntityId,
    pub generation: u32,
    pub birth_tick: u64,
}

/// Parent to child graph of every creature born in the episode
#[derive(Debug, Default)]
pub struct LineageTree {
    graph: DiGraph<LineageNode, ()>,
    nodes: BTreeMap<EntityId, NodeIndex>,
}

impl LineageTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Add a creature. Re-adding an id is ignored.
    pub fn add(&mut self, id: EntityId, parent: Option<EntityId>, generation: u32, tick: u64) {
        if self.nodes.contains_key(&id) {
            return;
        }
        let node = self.graph.add_node(LineageNode {
            id,
            generation,
            birth_tick: tick,
        });
        self.nodes.insert(id, node);
        if let Some(parent_node) = parent.and_then(|p| self.nodes.get(&p).copied()) {
            self.graph.add_edge(parent_node, node, ());
        } else if parent.is_some() {
            log::warn!("Lineage parent of {} is unknown", id);
        }
    }

    pub fn generation(&self, id: EntityId) -> Option<u32> {
        self.nodes.get(&id).map(|&n| self.graph[n].generation)
    }

    pub fn max_generation(&self) -> u32 {
        self.graph
            .node_weights()
            .map(|node| node.generation)
            .max()
            .unwrap_or(0)
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        let node = *self.nodes.get(&id)?;
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .next()
            .map(|p| self.graph[p].id)
    }

    /// Direct children in ascending id order
    pub fn children(&self, id: EntityId) -> Vec<EntityId> {
        let Some(&node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut children: Vec<EntityId> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|c| self.graph[c].id)
            .collect();
        children.sort_unstable();
        children
    }

    /// Number of creatures descended from `id`, excluding itself
    pub fn descendant_count(&self, id: EntityId) -> usize {
        let Some(&node) = self.nodes.get(&id) else {
            return 0;
        };
        let mut dfs = Dfs::new(&self.graph, node);
        let mut count = 0;
        while dfs.next(&self.graph).is_some() {
            count += 1;
        }
        count - 1
    }

    /// Ancestors from the parent up to the founder
    pub fn ancestry(&self, id: EntityId) -> Vec<EntityId> {
        let mut ancestors = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            ancestors.push(parent);
            current = parent;
        }
        ancestors
    }

    /// Founder of the line `id` belongs to
    pub fn founder_of(&self, id: EntityId) -> Option<EntityId> {
        if !self.contains(id) {
            return None;
        }
        Some(self.ancestry(id).last().copied().unwrap_or(id))
    }
}

impl EventSink for LineageTree {
    fn record(&mut self, event: LifecycleEvent) {
        if let EventKind::Birth {
            parent, generation, ..
        } = event.kind
        {
            self.add(event.id, parent, generation, event.tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use synlife_creature::{CreatureConfig, Genome, GenomeRanges};

    fn id(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    fn event(raw: u64, tick: u64, kind: EventKind) -> LifecycleEvent {
        LifecycleEvent {
            id: id(raw),
            tick,
            time: tick as f64 * 0.1,
            position: Vec2::ZERO,
            kind,
        }
    }

    fn birth(raw: u64, parent: Option<u64>, generation: u32) -> LifecycleEvent {
        event(
            raw,
            0,
            EventKind::Birth {
                parent: parent.map(id),
                generation,
                genome_signature: raw as i64 * 10,
            },
        )
    }

    #[test]
    fn test_tracker_aggregates_events() {
        let mut tracker = EpisodeTracker::new();
        tracker.record(birth(1, None, 0));
        tracker.record(event(
            1,
            3,
            EventKind::Eat {
                nutrient: 12.0,
                total_food: 1,
            },
        ));
        tracker.record(event(
            1,
            4,
            EventKind::Eat {
                nutrient: 8.0,
                total_food: 2,
            },
        ));
        tracker.record(event(1, 5, EventKind::Damage { amount: 0.25 }));
        tracker.record(event(
            1,
            6,
            EventKind::StageChange {
                from: LifeStage::Juvenile,
                to: LifeStage::Adult,
            },
        ));
        tracker.record(event(
            1,
            9,
            EventKind::Death {
                cause: DeathCause::Starvation,
                age: 3.0,
            },
        ));

        let summary = tracker.summary(id(1)).unwrap();
        assert_eq!(summary.food_count, 2);
        assert!((summary.total_nutrients - 20.0).abs() < 1e-6);
        assert_eq!(summary.damage_events, 1);
        assert_eq!(summary.max_stage, LifeStage::Adult);
        assert_eq!(summary.cause_of_death, Some(DeathCause::Starvation));
        assert_eq!(summary.death_tick, Some(9));
        assert_eq!(summary.start_signature, 10);
        assert_eq!(tracker.event_count("EAT"), 2);
        assert_eq!(tracker.deaths_by_cause().get("starvation"), Some(&1));
    }

    #[test]
    fn test_vitals_means() {
        let config = CreatureConfig::default();
        let genome = Genome::create_default(&GenomeRanges::default());
        let mut physiology = Physiology::new(&config, &genome);
        let mut tracker = EpisodeTracker::new();

        physiology.energy = 100.0;
        tracker.record_vitals(id(1), &physiology, LifeStage::Juvenile, 5);
        physiology.energy = 50.0;
        tracker.record_vitals(id(1), &physiology, LifeStage::Elder, 6);

        let summary = tracker.summary(id(1)).unwrap();
        assert_eq!(summary.survival_ticks, 2);
        assert!((summary.mean_energy() - 75.0).abs() < 1e-4);
        assert_eq!(summary.max_stage, LifeStage::Elder);
        assert_eq!(summary.end_signature, 6);
        assert_eq!(tracker.mean_lifespan(), None);
    }

    #[test]
    fn test_first_death_wins() {
        let mut tracker = EpisodeTracker::new();
        tracker.record(event(
            2,
            1,
            EventKind::Death {
                cause: DeathCause::Integrity,
                age: 1.0,
            },
        ));
        tracker.record(event(
            2,
            2,
            EventKind::Death {
                cause: DeathCause::Evicted,
                age: 1.0,
            },
        ));
        assert_eq!(
            tracker.summary(id(2)).unwrap().cause_of_death,
            Some(DeathCause::Integrity)
        );
    }

    #[test]
    fn test_lineage_queries() {
        let mut tree = LineageTree::new();
        tree.record(birth(1, None, 0));
        tree.record(birth(2, None, 0));
        tree.record(birth(3, Some(1), 1));
        tree.record(birth(4, Some(1), 1));
        tree.record(birth(5, Some(3), 2));

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.children(id(1)), vec![id(3), id(4)]);
        assert_eq!(tree.descendant_count(id(1)), 3);
        assert_eq!(tree.descendant_count(id(2)), 0);
        assert_eq!(tree.ancestry(id(5)), vec![id(3), id(1)]);
        assert_eq!(tree.founder_of(id(5)), Some(id(1)));
        assert_eq!(tree.founder_of(id(2)), Some(id(2)));
        assert_eq!(tree.max_generation(), 2);
        assert_eq!(tree.generation(id(4)), Some(1));
        assert_eq!(tree.parent(id(1)), None);
    }

    #[test]
    fn test_lineage_ignores_duplicates() {
        let mut tree = LineageTree::new();
        tree.add(id(1), None, 0, 0);
        tree.add(id(1), None, 3, 5);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.generation(id(1)), Some(0));
        assert_eq!(tree.founder_of(id(9)), None);
    }
}
