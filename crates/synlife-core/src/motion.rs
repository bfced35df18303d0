//! Kinematic movement - no external physics engine
//!
//! Creatures are points with a heading. Each tick the mover translates a
//! [`MovementIntent`] into a displacement along the heading followed by a
//! rotation, clamped to the arena.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use synlife_creature::{BodyState, EntityId, MovementIntent};

/// Owner of creature bodies
///
/// The simulation asks the provider where a creature is before its tick and
/// hands back the movement intent afterwards.
pub trait MovementProvider {
    fn spawn(&mut self, id: EntityId, position: Vec2, heading_angle: f32);
    fn despawn(&mut self, id: EntityId);
    fn body(&self, id: EntityId) -> Option<BodyState>;
    fn apply(&mut self, id: EntityId, intent: MovementIntent, dt: f32);
}

/// Body of one creature
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct KinematicBody {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians clockwise from +y
    pub heading_angle: f32,
}

impl KinematicBody {
    pub fn heading(&self) -> Vec2 {
        Vec2::new(self.heading_angle.sin(), self.heading_angle.cos())
    }

    fn state(&self) -> BodyState {
        BodyState {
            position: self.position,
            velocity: self.velocity,
            heading: self.heading(),
        }
    }
}

/// Position-based mover with fixed linear and angular speed
#[derive(Clone, Debug)]
pub struct KinematicMover {
    bodies: BTreeMap<EntityId, KinematicBody>,
    /// Units per second at full forward intent
    move_speed: f32,
    /// Degrees per second at full turn intent
    turn_speed: f32,
    half_extent: f32,
}

impl KinematicMover {
    pub fn new(move_speed: f32, turn_speed: f32, arena_size: f32) -> Self {
        Self {
            bodies: BTreeMap::new(),
            move_speed: move_speed.max(0.0),
            turn_speed,
            half_extent: arena_size.abs() * 0.5,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&KinematicBody> {
        self.bodies.get(&id)
    }

    fn clamp_to_arena(&self, position: Vec2) -> Vec2 {
        let h = self.half_extent;
        position.clamp(Vec2::splat(-h), Vec2::splat(h))
    }
}

impl MovementProvider for KinematicMover {
    fn spawn(&mut self, id: EntityId, position: Vec2, heading_angle: f32) {
        let position = if position.is_finite() {
            self.clamp_to_arena(position)
        } else {
            Vec2::ZERO
        };
        self.bodies.insert(
            id,
            KinematicBody {
                position,
                velocity: Vec2::ZERO,
                heading_angle: if heading_angle.is_finite() {
                    heading_angle
                } else {
                    0.0
                },
            },
        );
    }

    fn despawn(&mut self, id: EntityId) {
        self.bodies.remove(&id);
    }

    fn body(&self, id: EntityId) -> Option<BodyState> {
        self.bodies.get(&id).map(KinematicBody::state)
    }

    fn apply(&mut self, id: EntityId, intent: MovementIntent, dt: f32) {
        let h = self.half_extent;
        let move_speed = self.move_speed;
        let turn_rate = self.turn_speed.to_radians();
        let Some(body) = self.bodies.get_mut(&id) else {
            return;
        };
        if dt <= 0.0 {
            body.velocity = Vec2::ZERO;
            return;
        }

        let forward = intent.forward.clamp(-1.0, 1.0);
        let turn = intent.turn.clamp(-1.0, 1.0);

        let old = body.position;
        let target = old + body.heading() * forward * move_speed * dt;
        body.position = target.clamp(Vec2::splat(-h), Vec2::splat(h));
        body.velocity = (body.position - old) / dt;

        body.heading_angle = (body.heading_angle + turn * turn_rate * dt)
            .rem_euclid(std::f32::consts::TAU);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn id(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    #[test]
    fn test_forward_moves_along_heading() {
        let mut mover = KinematicMover::new(5.0, 180.0, 50.0);
        mover.spawn(id(1), Vec2::ZERO, 0.0);

        mover.apply(id(1), MovementIntent { forward: 1.0, turn: 0.0 }, 0.5);

        let body = mover.body(id(1)).unwrap();
        assert!((body.position - Vec2::new(0.0, 2.5)).length() < 1e-5);
        assert!((body.velocity - Vec2::new(0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_turn_right_rotates_clockwise() {
        let mut mover = KinematicMover::new(5.0, 90.0, 50.0);
        mover.spawn(id(1), Vec2::ZERO, 0.0);

        mover.apply(id(1), MovementIntent { forward: 0.0, turn: 1.0 }, 1.0);

        let body = mover.get(id(1)).unwrap();
        assert!((body.heading_angle - FRAC_PI_2).abs() < 1e-5);
        assert!((body.heading() - Vec2::new(1.0, 0.0)).length() < 1e-5);
        // Heading matches the right-hand vector of the previous state
        assert!((BodyState::at(Vec2::ZERO).right() - body.heading()).length() < 1e-5);
    }

    #[test]
    fn test_clamped_to_arena() {
        let mut mover = KinematicMover::new(100.0, 0.0, 10.0);
        mover.spawn(id(1), Vec2::new(4.0, 4.0), 0.0);

        mover.apply(id(1), MovementIntent { forward: 1.0, turn: 0.0 }, 1.0);

        let body = mover.body(id(1)).unwrap();
        assert_eq!(body.position, Vec2::new(4.0, 5.0));
    }

    #[test]
    fn test_unknown_and_despawned_bodies() {
        let mut mover = KinematicMover::new(5.0, 180.0, 50.0);
        mover.apply(id(9), MovementIntent::default(), 1.0);
        assert!(mover.body(id(9)).is_none());

        mover.spawn(id(2), Vec2::new(f32::NAN, 0.0), f32::INFINITY);
        assert_eq!(mover.body(id(2)).unwrap().position, Vec2::ZERO);
        mover.despawn(id(2));
        assert!(mover.is_empty());
    }
}
