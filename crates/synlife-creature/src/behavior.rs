//! Action interface between creatures and the external decision policy

use serde::{Deserialize, Serialize};

use crate::sensors::Observation;
use crate::types::EntityId;

/// Per-tick decision for one creature
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    /// Forward intent, -1 (reverse) to 1 (full speed)
    pub move_intent: f32,
    /// Turn intent, -1 (left) to 1 (right)
    pub turn_intent: f32,
    pub scan: bool,
    pub reproduce: bool,
}

impl Action {
    /// Copy with intents clamped to `[-1, 1]`; NaN becomes 0
    pub fn sanitized(&self) -> Self {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        Self {
            move_intent: clamp(self.move_intent),
            turn_intent: clamp(self.turn_intent),
            ..*self
        }
    }
}

/// Movement request forwarded to the movement provider
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementIntent {
    pub forward: f32,
    pub turn: f32,
}

/// External decision-making policy
pub trait Policy {
    fn act(&mut self, id: EntityId, observation: &Observation) -> Action;
}

/// Policy that never moves or acts
#[derive(Debug, Default, Clone, Copy)]
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn act(&mut self, _id: EntityId, _observation: &Observation) -> Action {
        Action::default()
    }
}
