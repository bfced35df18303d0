//! Population registry and capacity control
//!
//! The [`PopulationManager`] is the single owner of the live-creature
//! registry. It admits new members, evicts the weakest creatures when the
//! population exceeds its cap, issues identifiers and hands out
//! deterministic mutation seeds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Registry entry for a live creature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub spawn_time: f64,
    /// Registration order, final tie-break for eviction
    pub sequence: u64,
}

/// Read access to the creatures the registry refers to
pub trait PopulationView {
    /// Current integrity of `id`, `None` if it is dead or gone
    fn integrity_of(&self, id: EntityId) -> Option<f32>;
}

/// A creature removed by the capacity sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eviction {
    pub id: EntityId,
    pub integrity: f32,
    pub spawn_time: f64,
}

/// Seed issued for one offspring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationSeed {
    pub seed: u64,
    pub birth_index: u64,
}

/// Replay log entry for an issued mutation seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRecord {
    pub run_seed: u64,
    pub parent: EntityId,
    pub birth_index: u64,
    pub seed: u64,
}

/// Manages the live population
pub struct PopulationManager {
    registry: BTreeMap<EntityId, SpawnRecord>,
    capacity: usize,
    run_seed: u64,
    next_id: u64,
    next_sequence: u64,
    next_birth_index: u64,
    seed_log: Vec<SeedRecord>,
}

impl PopulationManager {
    /// Create an empty population. A capacity of zero is raised to one.
    pub fn new(capacity: usize, run_seed: u64) -> Self {
        Self {
            registry: BTreeMap::new(),
            capacity: capacity.max(1),
            run_seed,
            next_id: 1,
            next_sequence: 0,
            next_birth_index: 0,
            seed_log: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity. Excess members are removed by the next sweep.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    /// Number of registered creatures
    pub fn count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.registry.contains_key(&id)
    }

    pub fn spawn_record(&self, id: EntityId) -> Option<&SpawnRecord> {
        self.registry.get(&id)
    }

    /// Registered ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.registry.keys().copied()
    }

    /// Issue a fresh creature identifier
    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    /// Whether a new member can be admitted
    ///
    /// A creature unregisters itself at the moment it dies, so a slot freed
    /// earlier in a tick is available to creatures updated later in it.
    pub fn can_spawn(&self) -> bool {
        self.registry.len() < self.capacity
    }

    /// Add `id` with spawn time `time`. Registering twice keeps the first record.
    pub fn register(&mut self, id: EntityId, time: f64) {
        if self.registry.contains_key(&id) {
            return;
        }
        let record = SpawnRecord {
            spawn_time: time,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.registry.insert(id, record);
        log::debug!(
            "Registered {} at t={:.2}. Population: {}/{}",
            id,
            time,
            self.registry.len(),
            self.capacity
        );
    }

    /// Remove `id`; returns whether it was registered
    pub fn unregister(&mut self, id: EntityId) -> bool {
        let removed = self.registry.remove(&id).is_some();
        if removed {
            log::debug!(
                "Unregistered {}. Population: {}/{}",
                id,
                self.registry.len(),
                self.capacity
            );
        }
        removed
    }

    /// Drop entries the view no longer knows about
    pub fn purge_dead(&mut self, view: &dyn PopulationView) -> usize {
        let before = self.registry.len();
        self.registry.retain(|id, _| view.integrity_of(*id).is_some());
        before - self.registry.len()
    }

    /// Capacity sweep
    ///
    /// Purges dead entries, then while the population is over capacity
    /// removes the creature with the lowest integrity (ties: earliest spawn
    /// time, then registration order). Evicted creatures are returned in
    /// removal order; the caller ends their lifecycle.
    pub fn enforce_capacity(&mut self, view: &dyn PopulationView) -> Vec<Eviction> {
        let purged = self.purge_dead(view);
        if purged > 0 {
            log::debug!("Purged {} dead registry entries", purged);
        }

        let mut evicted = Vec::new();
        while self.registry.len() > self.capacity {
            let weakest = self
                .registry
                .iter()
                .filter_map(|(id, record)| {
                    view.integrity_of(*id)
                        .map(|integrity| (*id, integrity, *record))
                })
                .min_by(|a, b| {
                    a.1.total_cmp(&b.1)
                        .then(a.2.spawn_time.total_cmp(&b.2.spawn_time))
                        .then(a.2.sequence.cmp(&b.2.sequence))
                });

            let Some((id, integrity, record)) = weakest else {
                break;
            };
            self.registry.remove(&id);
            log::info!(
                "Evicted {} (integrity {:.2}). Population: {}/{}",
                id,
                integrity,
                self.registry.len(),
                self.capacity
            );
            evicted.push(Eviction {
                id,
                integrity,
                spawn_time: record.spawn_time,
            });
        }
        evicted
    }

    /// Deterministic mutation seed for the next offspring of `parent`
    ///
    /// `seed = run_seed ^ hash(parent) ^ birth_index`. The birth index is a
    /// private counter, so no two offspring share a seed.
    pub fn issue_mutation_seed(&mut self, parent: EntityId) -> MutationSeed {
        let birth_index = self.next_birth_index;
        self.next_birth_index += 1;
        let seed = self.seed_for(parent, birth_index);
        self.seed_log.push(SeedRecord {
            run_seed: self.run_seed,
            parent,
            birth_index,
            seed,
        });
        MutationSeed { seed, birth_index }
    }

    /// Seed that `issue_mutation_seed` gives for `(parent, birth_index)`
    pub fn seed_for(&self, parent: EntityId, birth_index: u64) -> u64 {
        self.run_seed ^ mix64(parent.raw()) ^ birth_index
    }

    pub fn seed_log(&self) -> &[SeedRecord] {
        &self.seed_log
    }

    /// Number of mutation seeds issued so far
    pub fn births(&self) -> u64 {
        self.next_birth_index
    }
}

/// splitmix64 finalizer; fixed arithmetic so seed logs replay on any target
fn mix64(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Integrities(HashMap<EntityId, f32>);

    impl PopulationView for Integrities {
        fn integrity_of(&self, id: EntityId) -> Option<f32> {
            self.0.get(&id).copied()
        }
    }

    fn populate(manager: &mut PopulationManager, view: &mut Integrities, values: &[(f32, f64)]) -> Vec<EntityId> {
        values
            .iter()
            .map(|&(integrity, time)| {
                let id = manager.allocate_id();
                manager.register(id, time);
                view.0.insert(id, integrity);
                id
            })
            .collect()
    }

    #[test]
    fn test_can_spawn_respects_capacity() {
        let mut manager = PopulationManager::new(2, 0);
        assert!(manager.can_spawn());
        let a = manager.allocate_id();
        let b = manager.allocate_id();
        manager.register(a, 0.0);
        assert!(manager.can_spawn());
        manager.register(b, 0.0);
        assert!(!manager.can_spawn());
        manager.unregister(a);
        assert!(manager.can_spawn());
    }

    #[test]
    fn test_lowered_capacity_evicts_on_sweep() {
        let mut manager = PopulationManager::new(3, 0);
        let mut view = Integrities::default();
        let ids = populate(&mut manager, &mut view, &[(0.9, 0.0), (0.4, 1.0), (0.7, 2.0)]);

        manager.set_capacity(0);
        assert_eq!(manager.capacity(), 1);
        let evicted: Vec<EntityId> = manager
            .enforce_capacity(&view)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(evicted, vec![ids[1], ids[2]]);
        assert!(manager.contains(ids[0]));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut manager = PopulationManager::new(5, 0);
        let id = manager.allocate_id();
        manager.register(id, 1.0);
        manager.register(id, 9.0);
        assert_eq!(manager.count(), 1);
        assert_eq!(manager.spawn_record(id).map(|r| r.spawn_time), Some(1.0));
        assert!(manager.unregister(id));
        assert!(!manager.unregister(id));
    }

    #[test]
    fn test_zero_capacity_raised() {
        let manager = PopulationManager::new(0, 0);
        assert_eq!(manager.capacity(), 1);
    }

    #[test]
    fn test_enforce_capacity_evicts_lowest_integrity() {
        let mut manager = PopulationManager::new(2, 0);
        let mut view = Integrities::default();
        let ids = populate(
            &mut manager,
            &mut view,
            &[(0.9, 0.0), (0.2, 1.0), (0.5, 2.0), (0.7, 3.0)],
        );

        let evicted = manager.enforce_capacity(&view);
        let removed: Vec<_> = evicted.iter().map(|e| e.id).collect();
        assert_eq!(removed, vec![ids[1], ids[2]]);
        assert_eq!(manager.count(), 2);
        assert!(manager.contains(ids[0]));
        assert!(manager.contains(ids[3]));
    }

    #[test]
    fn test_enforce_capacity_tie_breaks_on_spawn_time() {
        let mut manager = PopulationManager::new(1, 0);
        let mut view = Integrities::default();
        // Registered later but spawned earlier
        let ids = populate(&mut manager, &mut view, &[(0.4, 5.0), (0.4, 2.0)]);

        let evicted = manager.enforce_capacity(&view);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, ids[1]);
    }

    #[test]
    fn test_enforce_capacity_purges_dead_first() {
        let mut manager = PopulationManager::new(2, 0);
        let mut view = Integrities::default();
        let ids = populate(&mut manager, &mut view, &[(0.9, 0.0), (0.1, 0.0), (0.8, 0.0)]);
        view.0.remove(&ids[1]);

        let evicted = manager.enforce_capacity(&view);
        assert!(evicted.is_empty());
        assert_eq!(manager.count(), 2);
        assert!(!manager.contains(ids[1]));
    }

    #[test]
    fn test_capacity_invariant_after_sweep() {
        for capacity in 1..6 {
            let mut manager = PopulationManager::new(capacity, 3);
            let mut view = Integrities::default();
            let values: Vec<_> = (0..10)
                .map(|i| (((i * 7) % 10) as f32 / 10.0, i as f64))
                .collect();
            populate(&mut manager, &mut view, &values);

            let evicted = manager.enforce_capacity(&view);
            assert!(manager.count() <= capacity);
            assert_eq!(evicted.len(), 10 - capacity);

            // Every evicted creature was no stronger than every survivor
            let weakest_survivor = manager
                .ids()
                .filter_map(|id| view.integrity_of(id))
                .fold(f32::INFINITY, f32::min);
            assert!(evicted.iter().all(|e| e.integrity <= weakest_survivor));
        }
    }

    #[test]
    fn test_mutation_seeds_are_unique_and_logged() {
        let mut manager = PopulationManager::new(10, 1234);
        let parent = manager.allocate_id();

        let first = manager.issue_mutation_seed(parent);
        let second = manager.issue_mutation_seed(parent);
        assert_ne!(first.seed, second.seed);
        assert_eq!(second.birth_index, first.birth_index + 1);

        assert_eq!(manager.seed_log().len(), 2);
        assert_eq!(manager.seed_log()[1].seed, second.seed);
        assert_eq!(manager.seed_for(parent, first.birth_index), first.seed);
        assert_eq!(manager.births(), 2);
    }

    #[test]
    fn test_mutation_seed_values_are_pinned() {
        // Seed logs must replay on any machine, so the values never change
        let mut manager = PopulationManager::new(10, 99);
        let parent = EntityId::from_raw(4);
        assert_eq!(manager.issue_mutation_seed(parent).seed, 0xb7a4_712c_7456_2977);
        assert_eq!(manager.seed_for(parent, 3), 0xb7a4_712c_7456_2974);
    }

    #[test]
    fn test_mutation_seeds_reproducible_across_runs() {
        let mut a = PopulationManager::new(10, 99);
        let mut b = PopulationManager::new(10, 99);
        let parent = EntityId::from_raw(4);

        for _ in 0..5 {
            assert_eq!(a.issue_mutation_seed(parent), b.issue_mutation_seed(parent));
        }

        let mut other_run = PopulationManager::new(10, 100);
        assert_ne!(
            other_run.issue_mutation_seed(parent).seed,
            PopulationManager::new(10, 99).issue_mutation_seed(parent).seed
        );
    }
}
