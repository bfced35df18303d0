//! Structured lifecycle events
//!
//! Creatures report what happens to them through an [`EventSink`]. Sinks
//! decide what to do with events (aggregate, buffer, drop); the creature
//! crate does no formatting or I/O.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::reproduction::Ineligible;
use crate::types::{DeathCause, EntityId, LifeStage};

/// Event-specific payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    Birth {
        parent: Option<EntityId>,
        generation: u32,
        genome_signature: i64,
    },
    Eat {
        nutrient: f32,
        total_food: u32,
    },
    Scan {
        cost: f32,
        total_scans: u32,
    },
    Damage {
        amount: f32,
    },
    StageChange {
        from: LifeStage,
        to: LifeStage,
    },
    ReproduceAttempt {
        outcome: Result<(), Ineligible>,
    },
    ReproduceSuccess {
        child: EntityId,
        birth_index: u64,
        seed: u64,
    },
    Death {
        cause: DeathCause,
        age: f32,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Birth { .. } => "BIRTH",
            EventKind::Eat { .. } => "EAT",
            EventKind::Scan { .. } => "SCAN",
            EventKind::Damage { .. } => "DAMAGE",
            EventKind::StageChange { .. } => "STAGE_CHANGE",
            EventKind::ReproduceAttempt { .. } => "REPRODUCE_ATTEMPT",
            EventKind::ReproduceSuccess { .. } => "REPRODUCE_SUCCESS",
            EventKind::Death { .. } => "DEATH",
        }
    }
}

/// An event with the creature, tick and place it happened at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub id: EntityId,
    pub tick: u64,
    pub time: f64,
    pub position: Vec2,
    pub kind: EventKind,
}

/// Trait for receiving lifecycle events
///
/// This allows the creature crate to emit telemetry without depending on
/// any particular collection implementation.
pub trait EventSink {
    fn record(&mut self, event: LifecycleEvent);
}

/// A no-op sink for when events are not needed
#[derive(Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&mut self, _event: LifecycleEvent) {}
}

/// Sink that keeps events in order until drained
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<LifecycleEvent>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take all buffered events, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventBuffer {
    fn record(&mut self, event: LifecycleEvent) {
        log::trace!("{} {} at tick {}", event.kind.name(), event.id, event.tick);
        self.events.push(event);
    }
}

/// Sink that forwards every event to two sinks
pub struct Tee<'a> {
    first: &'a mut dyn EventSink,
    second: &'a mut dyn EventSink,
}

impl<'a> Tee<'a> {
    pub fn new(first: &'a mut dyn EventSink, second: &'a mut dyn EventSink) -> Self {
        Self { first, second }
    }
}

impl EventSink for Tee<'_> {
    fn record(&mut self, event: LifecycleEvent) {
        self.first.record(event);
        self.second.record(event);
    }
}
