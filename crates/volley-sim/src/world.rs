//! Minimal arcade physics: AABB bodies, gravity, world bounds, and
//! category-filtered contacts. Enough to drive a match headlessly; it makes
//! no attempt at stacking, friction, or rotation.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use volley_core::collab::{
    Animator, BodyFactory, BodyId, BodyKind, BodyProperties, BodySpec, CollisionCategory,
    CollisionFilter, Contact, Kinematics, Presenter, Vec2,
};
use volley_core::player::Side;

/// Tuning for the arcade world.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub width: f32,
    pub height: f32,
    /// Downward acceleration (units/s^2).
    pub gravity: f32,
    /// Velocity a kick hitbox gives the ball: x away from the kicker, y upward.
    pub kick_launch: Vec2,
    /// Share of a player's velocity passed to a ball it touches.
    pub carry: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            gravity: 900.0,
            kick_launch: Vec2::new(450.0, 350.0),
            carry: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
struct ArcadeBody {
    kind: BodyKind,
    category_key: String,
    position: Vec2,
    half: Vec2,
    velocity: Vec2,
    bounce: f32,
    mass: f32,
    ignore_gravity: bool,
    filter: CollisionFilter,
}

impl ArcadeBody {
    fn min(&self) -> Vec2 {
        Vec2::new(self.position.x - self.half.x, self.position.y - self.half.y)
    }

    fn max(&self) -> Vec2 {
        Vec2::new(self.position.x + self.half.x, self.position.y + self.half.y)
    }

    fn overlaps(&self, other: &ArcadeBody) -> bool {
        let (a0, a1, b0, b1) = (self.min(), self.max(), other.min(), other.max());
        a0.x < b1.x && a1.x > b0.x && a0.y < b1.y && a1.y > b0.y
    }

    fn is(&self, category: CollisionCategory) -> bool {
        self.filter.category == category
    }
}

/// Which way a dynamic body was pushed out of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Push {
    Up,
    Down,
    Left,
    Right,
}

/// Smallest push that separates `body` from `obstacle`.
fn separation(body: &ArcadeBody, obstacle: &ArcadeBody) -> (Push, f32) {
    let candidates = [
        (Push::Up, body.max().y - obstacle.min().y),
        (Push::Down, obstacle.max().y - body.min().y),
        (Push::Left, body.max().x - obstacle.min().x),
        (Push::Right, obstacle.max().x - body.min().x),
    ];
    candidates
        .into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap_or((Push::Up, 0.0))
}

/// Move `body` out of `obstacle` and reflect the velocity along the push axis.
fn push_out(body: &mut ArcadeBody, obstacle: &ArcadeBody) -> Push {
    let (dir, depth) = separation(body, obstacle);
    match dir {
        Push::Up => {
            body.position.y -= depth;
            if body.velocity.y > 0.0 {
                body.velocity.y = -body.velocity.y * body.bounce;
            }
        },
        Push::Down => {
            body.position.y += depth;
            if body.velocity.y < 0.0 {
                body.velocity.y = -body.velocity.y * body.bounce;
            }
        },
        Push::Left => {
            body.position.x -= depth;
            if body.velocity.x > 0.0 {
                body.velocity.x = -body.velocity.x * body.bounce;
            }
        },
        Push::Right => {
            body.position.x += depth;
            if body.velocity.x < 0.0 {
                body.velocity.x = -body.velocity.x * body.bounce;
            }
        },
    }
    dir
}

/// Headless physics collaborator.
#[derive(Debug, Default)]
pub struct ArcadeWorld {
    settings: WorldSettings,
    next_id: u64,
    bodies: BTreeMap<BodyId, ArcadeBody>,
    contacts: Vec<Contact>,
}

impl ArcadeWorld {
    pub fn new(settings: WorldSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Live bodies whose asset key matches.
    pub fn bodies_with_key(&self, key: &str) -> Vec<BodyId> {
        self.bodies
            .iter()
            .filter(|(_, b)| b.category_key == key)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Move a body without going through the simulation.
    pub fn teleport(&mut self, body: BodyId, position: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.position = position;
        }
    }

    /// Contacts found since the last drain.
    pub fn drain_contacts(&mut self) -> Vec<Contact> {
        std::mem::take(&mut self.contacts)
    }

    /// Advance every dynamic body by `dt` seconds and collect contacts.
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dynamic: Vec<BodyId> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.kind == BodyKind::Dynamic)
            .map(|(&id, _)| id)
            .collect();

        for &id in &dynamic {
            self.integrate(id, dt);
        }
        self.resolve_statics(&dynamic);
        self.resolve_pairs(&dynamic);
    }

    fn integrate(&mut self, id: BodyId, dt: f32) {
        let gravity = self.settings.gravity;
        let (w, h) = (self.settings.width, self.settings.height);
        let Some(b) = self.bodies.get_mut(&id) else {
            return;
        };
        if !b.ignore_gravity {
            b.velocity.y += gravity * dt;
        }
        b.position.x += b.velocity.x * dt;
        b.position.y += b.velocity.y * dt;

        // Kick hitboxes fly free; everything else stays on the court.
        if b.is(CollisionCategory::KICK) {
            return;
        }
        if b.min().x < 0.0 {
            b.position.x = b.half.x;
            b.velocity.x = b.velocity.x.abs() * b.bounce;
        } else if b.max().x > w {
            b.position.x = w - b.half.x;
            b.velocity.x = -b.velocity.x.abs() * b.bounce;
        }
        if b.min().y < 0.0 {
            b.position.y = b.half.y;
            b.velocity.y = b.velocity.y.abs() * b.bounce;
        }
        if b.max().y >= h {
            b.position.y = h - b.half.y;
            if b.velocity.y > 0.0 {
                b.velocity.y = -b.velocity.y * b.bounce;
            }
            self.contacts.push(Contact::Ground(id));
        }
    }

    fn resolve_statics(&mut self, dynamic: &[BodyId]) {
        let statics: Vec<ArcadeBody> = self
            .bodies
            .values()
            .filter(|b| b.kind == BodyKind::Static)
            .cloned()
            .collect();
        for &id in dynamic {
            let Some(b) = self.bodies.get_mut(&id) else {
                continue;
            };
            for s in &statics {
                if b.filter.accepts(&s.filter) && b.overlaps(s) && push_out(b, s) == Push::Up {
                    self.contacts.push(Contact::Ground(id));
                }
            }
        }
    }

    fn resolve_pairs(&mut self, dynamic: &[BodyId]) {
        for (i, &a) in dynamic.iter().enumerate() {
            for &b in &dynamic[i + 1..] {
                let (Some(ba), Some(bb)) = (self.bodies.get(&a), self.bodies.get(&b)) else {
                    continue;
                };
                if !ba.filter.accepts(&bb.filter) || !ba.overlaps(bb) {
                    continue;
                }
                self.contacts.push(Contact::Bodies(a, b));

                if ba.is(CollisionCategory::BALL) {
                    self.ball_hit(a, b);
                } else if bb.is(CollisionCategory::BALL) {
                    self.ball_hit(b, a);
                }
            }
        }
    }

    /// Ball touched another dynamic body: kicks launch it, players deflect it.
    fn ball_hit(&mut self, ball: BodyId, other: BodyId) {
        let Some(hitter) = self.bodies.get(&other).cloned() else {
            return;
        };
        let launch = self.settings.kick_launch;
        let carry = self.settings.carry;
        let Some(ball) = self.bodies.get_mut(&ball) else {
            return;
        };
        if hitter.is(CollisionCategory::KICK) {
            let dir = if hitter.velocity.x < 0.0 { -1.0 } else { 1.0 };
            ball.velocity = Vec2::new(dir * launch.x, -launch.y);
        } else if hitter.is(CollisionCategory::PLAYER) {
            push_out(ball, &hitter);
            // Equal masses pass exactly `carry`; heavier hitters pass more.
            let share = carry * 2.0 * hitter.mass / (hitter.mass + ball.mass).max(f32::EPSILON);
            ball.velocity.x += hitter.velocity.x * share;
            ball.velocity.y += hitter.velocity.y.min(0.0) * share;
        }
    }
}

impl Kinematics for ArcadeWorld {
    fn position(&self, body: BodyId) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.position)
    }

    fn velocity(&self, body: BodyId) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, body: BodyId, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.velocity = velocity;
        }
    }
}

impl BodyProperties for ArcadeWorld {
    fn set_bounce(&mut self, body: BodyId, bounce: f32) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.bounce = bounce.clamp(0.0, 1.0);
        }
    }

    // Bodies never rotate here; inertia has nothing to act on.
    fn set_inertia(&mut self, _body: BodyId, _inertia: f32) {}

    fn set_mass(&mut self, body: BodyId, mass: f32) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.mass = mass;
        }
    }

    fn set_ignore_gravity(&mut self, body: BodyId, ignore: bool) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.ignore_gravity = ignore;
        }
    }

    fn set_collision_category(&mut self, body: BodyId, category: CollisionCategory) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.filter.category = category;
        }
    }

    fn set_collision_filter(&mut self, body: BodyId, filter: CollisionFilter) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.filter = filter;
        }
    }
}

impl BodyFactory for ArcadeWorld {
    fn create_body(&mut self, spec: &BodySpec) -> BodyId {
        self.next_id += 1;
        let id = BodyId(self.next_id);
        self.bodies.insert(
            id,
            ArcadeBody {
                kind: spec.kind,
                category_key: spec.key.clone(),
                position: spec.position,
                half: Vec2::new(spec.size.x / 2.0, spec.size.y / 2.0),
                velocity: Vec2::ZERO,
                bounce: 0.0,
                mass: 1.0,
                ignore_gravity: false,
                filter: CollisionFilter::default(),
            },
        );
        id
    }

    fn destroy_body(&mut self, body: BodyId) {
        self.bodies.remove(&body);
    }

    fn is_alive(&self, body: BodyId) -> bool {
        self.bodies.contains_key(&body)
    }
}

/// Tracks which animation each body is playing; logs changes.
#[derive(Debug, Default)]
pub struct AnimationTrack {
    current: HashMap<BodyId, String>,
}

impl AnimationTrack {
    pub fn current(&self, body: BodyId) -> Option<&str> {
        self.current.get(&body).map(String::as_str)
    }
}

impl Animator for AnimationTrack {
    fn play_animation(&mut self, body: BodyId, name: &str, restart_if_same: bool) {
        let same = self.current.get(&body).is_some_and(|n| n == name);
        if same && !restart_if_same {
            return;
        }
        tracing::trace!(body = body.0, name, "animation");
        self.current.insert(body, name.to_string());
    }
}

/// Text HUD that logs what a player would see.
#[derive(Debug, Default)]
pub struct Hud {
    pub scores: HashMap<Side, String>,
    pub banner: Option<String>,
}

impl Presenter for Hud {
    fn set_score_text(&mut self, side: Side, text: &str) {
        tracing::debug!(?side, text, "score text");
        self.scores.insert(side, text.to_string());
    }

    fn show_goal_text(&mut self, text: &str, duration: Duration) {
        tracing::info!(text, ?duration, "banner");
        self.banner = Some(text.to_string());
    }

    fn clear_goal_text(&mut self) {
        self.banner = None;
    }
}
