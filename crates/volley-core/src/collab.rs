//! Capability traits for the engine pieces a game talks to but does not own.
//!
//! A physics world, an animation player, and a HUD are all external to the
//! game. Each capability is a separate trait so a game only names what it
//! actually needs, and test doubles can implement them piecemeal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::player::Side;

/// Opaque handle for a body owned by the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

/// 2D vector in screen space (y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bitmask collision category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionCategory(pub u32);

impl CollisionCategory {
    pub const NONE: CollisionCategory = CollisionCategory(0);
    pub const PLAYER: CollisionCategory = CollisionCategory(0x0001);
    pub const BALL: CollisionCategory = CollisionCategory(0x0002);
    pub const KICK: CollisionCategory = CollisionCategory(0x0004);
    pub const TERRAIN: CollisionCategory = CollisionCategory(0x0008);
    pub const ALL: CollisionCategory = CollisionCategory(u32::MAX);

    pub const fn union(self, other: CollisionCategory) -> Self {
        CollisionCategory(self.0 | other.0)
    }

    pub const fn without(self, other: CollisionCategory) -> Self {
        CollisionCategory(self.0 & !other.0)
    }

    pub const fn intersects(self, other: CollisionCategory) -> bool {
        self.0 & other.0 != 0
    }
}

/// Which categories a body belongs to and which it reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub category: CollisionCategory,
    pub mask: CollisionCategory,
}

impl CollisionFilter {
    /// Two filtered bodies interact only if each accepts the other.
    pub fn accepts(&self, other: &CollisionFilter) -> bool {
        self.mask.intersects(other.category) && other.mask.intersects(self.category)
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category: CollisionCategory::NONE,
            mask: CollisionCategory::ALL,
        }
    }
}

/// Whether the physics world integrates a body or keeps it fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Dynamic,
    Static,
}

/// Creation parameters. Everything else is set through [`BodyProperties`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    /// Asset key for the renderer.
    pub key: String,
    pub kind: BodyKind,
    pub position: Vec2,
    pub size: Vec2,
}

/// Contact notification pushed by the physics collaborator while two bodies touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    /// Body is resting on terrain or the floor bound.
    Ground(BodyId),
    /// Two filtered bodies are touching.
    Bodies(BodyId, BodyId),
}

/// Read and command a body's motion.
pub trait Kinematics {
    fn position(&self, body: BodyId) -> Option<Vec2>;

    fn velocity(&self, body: BodyId) -> Option<Vec2>;

    fn set_velocity(&mut self, body: BodyId, velocity: Vec2);

    /// Set horizontal velocity, keeping the vertical component.
    fn set_velocity_x(&mut self, body: BodyId, vx: f32) {
        let vy = self.velocity(body).map_or(0.0, |v| v.y);
        self.set_velocity(body, Vec2::new(vx, vy));
    }

    /// Set vertical velocity, keeping the horizontal component.
    fn set_velocity_y(&mut self, body: BodyId, vy: f32) {
        let vx = self.velocity(body).map_or(0.0, |v| v.x);
        self.set_velocity(body, Vec2::new(vx, vy));
    }
}

/// Physical properties of a live body.
pub trait BodyProperties {
    fn set_bounce(&mut self, body: BodyId, bounce: f32);

    /// `f32::INFINITY` locks rotation.
    fn set_inertia(&mut self, body: BodyId, inertia: f32);

    fn set_mass(&mut self, body: BodyId, mass: f32);

    fn set_ignore_gravity(&mut self, body: BodyId, ignore: bool);

    fn set_collision_category(&mut self, body: BodyId, category: CollisionCategory);

    fn set_collision_filter(&mut self, body: BodyId, filter: CollisionFilter);
}

/// Body lifecycle.
pub trait BodyFactory {
    fn create_body(&mut self, spec: &BodySpec) -> BodyId;

    /// Destroying an already-destroyed body is a no-op.
    fn destroy_body(&mut self, body: BodyId);

    fn is_alive(&self, body: BodyId) -> bool;
}

/// Everything a game needs from the physics engine.
pub trait PhysicsWorld: Kinematics + BodyProperties + BodyFactory {}

impl<T: Kinematics + BodyProperties + BodyFactory> PhysicsWorld for T {}

/// Sprite animation playback.
pub trait Animator {
    fn play_animation(&mut self, body: BodyId, name: &str, restart_if_same: bool);
}

/// Score and banner text.
pub trait Presenter {
    fn set_score_text(&mut self, side: Side, text: &str);

    fn show_goal_text(&mut self, text: &str, duration: Duration);

    fn clear_goal_text(&mut self);
}

/// Borrowed collaborators for a single call into the game.
pub struct Collaborators<'a> {
    pub physics: &'a mut dyn PhysicsWorld,
    pub animator: &'a mut dyn Animator,
    pub presenter: &'a mut dyn Presenter,
}

impl<'a> Collaborators<'a> {
    pub fn new(
        physics: &'a mut dyn PhysicsWorld,
        animator: &'a mut dyn Animator,
        presenter: &'a mut dyn Presenter,
    ) -> Self {
        Self {
            physics,
            animator,
            presenter,
        }
    }
}
