use std::time::Duration;

use serde::{Deserialize, Serialize};

use volley_core::collab::{
    BodyId, BodyKind, BodySpec, CollisionCategory, CollisionFilter, PhysicsWorld, Vec2,
};
use volley_core::player::Side;

use crate::config::KickConfig;
use crate::movement::{CourtPlayer, Facing};

pub const KICK_KEY: &str = "kick";

/// Kick hitboxes only ever touch the ball.
pub const KICK_FILTER: CollisionFilter = CollisionFilter {
    category: CollisionCategory::KICK,
    mask: CollisionCategory::BALL,
};

/// The match's kick hitbox. At most one exists at a time, whoever kicked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveKick {
    pub body: BodyId,
    pub owner: Side,
    pub facing: Facing,
    pub spawned_at: Duration,
    pub expires_at: Duration,
}

/// Hitbox center for a player at `player_pos` looking toward `facing`.
pub fn kick_origin(player_pos: Vec2, facing: Facing, cfg: &KickConfig) -> Vec2 {
    Vec2::new(
        player_pos.x + facing.sign() * cfg.offset_x,
        player_pos.y + cfg.offset_y,
    )
}

/// Spawn a kick hitbox in front of `player` and store it in `active`.
///
/// Returns `None` without touching the world if a hitbox is already alive,
/// the player has no body, or the body has no position.
pub fn start_kick(
    active: &mut Option<ActiveKick>,
    player: &CourtPlayer,
    facing: Facing,
    now: Duration,
    physics: &mut dyn PhysicsWorld,
    cfg: &KickConfig,
) -> Option<ActiveKick> {
    if active.is_some() {
        return None;
    }
    let owner = player.body?;
    let pos = physics.position(owner)?;

    let body = physics.create_body(&BodySpec {
        key: KICK_KEY.to_string(),
        kind: BodyKind::Dynamic,
        position: kick_origin(pos, facing, cfg),
        size: Vec2::new(cfg.width, cfg.height),
    });
    physics.set_ignore_gravity(body, true);
    physics.set_mass(body, cfg.mass);
    physics.set_inertia(body, f32::INFINITY);
    physics.set_collision_filter(body, KICK_FILTER);
    physics.set_velocity(body, Vec2::new(facing.sign() * cfg.speed, 0.0));

    let kick = ActiveKick {
        body,
        owner: player.side,
        facing,
        spawned_at: now,
        expires_at: now + cfg.lifetime(),
    };
    *active = Some(kick);
    tracing::debug!(side = ?player.side, body = body.0, "kick started");
    Some(kick)
}

/// Destroy the live hitbox if it is still `body`. Stale expiries are ignored.
pub fn expire_kick(
    active: &mut Option<ActiveKick>,
    body: BodyId,
    physics: &mut dyn PhysicsWorld,
) -> bool {
    match *active {
        Some(k) if k.body == body => {
            physics.destroy_body(body);
            *active = None;
            tracing::debug!(side = ?k.owner, body = body.0, "kick expired");
            true
        },
        _ => {
            tracing::debug!(body = body.0, "stale kick expiry ignored");
            false
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volley_core::collab::{BodyFactory, Kinematics};
    use volley_core::test_helpers::RecordingWorld;

    fn player_in(world: &mut RecordingWorld, side: Side, at: Vec2) -> CourtPlayer {
        let body = world.create_body(&BodySpec {
            key: "character".to_string(),
            kind: BodyKind::Dynamic,
            position: at,
            size: Vec2::new(32.0, 48.0),
        });
        let mut p = CourtPlayer::new(side, 1);
        p.body = Some(body);
        p
    }

    #[test]
    fn hitbox_spawns_in_front_and_below() {
        let cfg = KickConfig::default();
        let mut world = RecordingWorld::default();
        let p = player_in(&mut world, Side::Left, Vec2::new(300.0, 400.0));
        let mut active = None;

        let k = start_kick(&mut active, &p, Facing::Right, Duration::ZERO, &mut world, &cfg)
            .unwrap();
        let hb = world.body(k.body).unwrap();
        assert_eq!(hb.position, Vec2::new(350.0, 430.0));
        assert_eq!(hb.velocity, Vec2::new(15.0, 0.0));
        assert!(hb.ignore_gravity);
        assert_eq!(hb.mass, cfg.mass);
        assert!(hb.inertia.is_infinite());
        assert_eq!(hb.filter, KICK_FILTER);
        assert_eq!(k.expires_at, Duration::from_millis(220));
        assert_eq!(k.owner, Side::Left);
        assert_eq!(active, Some(k));
    }

    #[test]
    fn facing_left_mirrors_offset_and_velocity() {
        let cfg = KickConfig::default();
        let mut world = RecordingWorld::default();
        let p = player_in(&mut world, Side::Left, Vec2::new(300.0, 400.0));
        let mut active = None;

        let k = start_kick(&mut active, &p, Facing::Left, Duration::ZERO, &mut world, &cfg)
            .unwrap();
        assert_eq!(world.position(k.body), Some(Vec2::new(250.0, 430.0)));
        assert_eq!(world.velocity(k.body), Some(Vec2::new(-15.0, 0.0)));
    }

    #[test]
    fn second_kick_while_active_is_noop() {
        let cfg = KickConfig::default();
        let mut world = RecordingWorld::default();
        let p = player_in(&mut world, Side::Left, Vec2::new(300.0, 400.0));
        let mut active = None;

        let first = start_kick(&mut active, &p, Facing::Right, Duration::ZERO, &mut world, &cfg)
            .unwrap();
        let created = world.created.len();
        let later = Duration::from_millis(50);
        assert!(start_kick(&mut active, &p, Facing::Left, later, &mut world, &cfg).is_none());
        assert_eq!(world.created.len(), created);
        assert_eq!(active, Some(first));
    }

    #[test]
    fn other_player_cannot_kick_while_hitbox_alive() {
        let cfg = KickConfig::default();
        let mut world = RecordingWorld::default();
        let left = player_in(&mut world, Side::Left, Vec2::new(300.0, 400.0));
        let right = player_in(&mut world, Side::Right, Vec2::new(500.0, 400.0));
        let mut active = None;

        let first = start_kick(&mut active, &left, Facing::Right, Duration::ZERO, &mut world, &cfg)
            .unwrap();
        assert!(
            start_kick(&mut active, &right, Facing::Left, Duration::ZERO, &mut world, &cfg)
                .is_none()
        );
        assert_eq!(active.map(|k| k.owner), Some(Side::Left));
        assert_eq!(active, Some(first));
    }

    #[test]
    fn expire_then_kick_again() {
        let cfg = KickConfig::default();
        let mut world = RecordingWorld::default();
        let p = player_in(&mut world, Side::Left, Vec2::new(300.0, 400.0));
        let mut active = None;

        let first = start_kick(&mut active, &p, Facing::Right, Duration::ZERO, &mut world, &cfg)
            .unwrap();
        assert!(expire_kick(&mut active, first.body, &mut world));
        assert!(!world.is_alive(first.body));
        assert!(active.is_none());

        let at = Duration::from_millis(220);
        let second = start_kick(&mut active, &p, Facing::Right, at, &mut world, &cfg).unwrap();
        assert_ne!(second.body, first.body);
    }

    #[test]
    fn stale_expiry_leaves_current_kick() {
        let cfg = KickConfig::default();
        let mut world = RecordingWorld::default();
        let p = player_in(&mut world, Side::Left, Vec2::new(300.0, 400.0));
        let mut active = None;

        let k = start_kick(&mut active, &p, Facing::Right, Duration::ZERO, &mut world, &cfg)
            .unwrap();
        assert!(!expire_kick(&mut active, BodyId(9999), &mut world));
        assert_eq!(active, Some(k));
        assert!(world.is_alive(k.body));
    }

    #[test]
    fn no_body_no_kick() {
        let cfg = KickConfig::default();
        let mut world = RecordingWorld::default();
        let p = CourtPlayer::new(Side::Right, 2);
        let mut active = None;
        assert!(start_kick(&mut active, &p, Facing::Left, Duration::ZERO, &mut world, &cfg).is_none());
        assert!(world.created.is_empty());
        assert!(active.is_none());
    }
}
