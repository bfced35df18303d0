//! Food items available to creatures
//!
//! The store owns every food item and keeps an R-tree over their positions
//! for overlap queries. Placement policy lives with the caller.

use std::collections::BTreeMap;

use glam::Vec2;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use synlife_creature::{FoodId, NutrientSource};

type IndexedFood = GeomWithData<[f32; 2], FoodId>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub position: Vec2,
    pub nutrient_value: f32,
}

/// Food items with a spatial index
#[derive(Default)]
pub struct FoodStore {
    items: BTreeMap<FoodId, FoodItem>,
    spatial_index: RTree<IndexedFood>,
    next_id: u64,
}

impl FoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: FoodId) -> Option<&FoodItem> {
        self.items.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FoodId, &FoodItem)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    /// Add a food item; non-finite positions are rejected
    pub fn place(&mut self, position: Vec2, nutrient_value: f32) -> Option<FoodId> {
        if !position.is_finite() {
            return None;
        }
        let id = FoodId(self.next_id);
        self.next_id += 1;
        self.items.insert(
            id,
            FoodItem {
                position,
                nutrient_value: nutrient_value.max(0.0),
            },
        );
        self.spatial_index
            .insert(GeomWithData::new(position.to_array(), id));
        Some(id)
    }

    /// Ids of items within `radius` of `position`, ascending
    pub fn within(&self, position: Vec2, radius: f32) -> Vec<FoodId> {
        let radius = radius.max(0.0);
        let mut found: Vec<FoodId> = self
            .spatial_index
            .locate_within_distance(position.to_array(), radius * radius)
            .map(|entry| entry.data)
            .collect();
        found.sort_unstable();
        found
    }

    /// Whether any item lies within `distance` of `position`
    pub fn any_within(&self, position: Vec2, distance: f32) -> bool {
        !self.within(position, distance).is_empty()
    }

    pub fn take(&mut self, id: FoodId) -> Option<FoodItem> {
        let item = self.items.remove(&id)?;
        self.spatial_index
            .remove(&GeomWithData::new(item.position.to_array(), id));
        Some(item)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.spatial_index = RTree::new();
    }
}

impl NutrientSource for FoodStore {
    fn nutrient_at(&self, item: FoodId) -> Option<f32> {
        self.items.get(&item).map(|food| food.nutrient_value)
    }

    fn remove(&mut self, item: FoodId) {
        self.take(item);
    }
}
