use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use volley_core::collab::{
    BodyId, BodyKind, BodySpec, CollisionCategory, CollisionFilter, PhysicsWorld, Vec2,
};
use volley_core::player::Side;

use crate::config::VolleyConfig;
use crate::goal_zone::GoalZone;

pub const PLAYER_KEY: &str = "character";
pub const BALL_KEY: &str = "volleyball";
pub const NET_KEY: &str = "net";
pub const GOAL_POST_KEY: &str = "goal-post";

/// Players collide with everything except kick hitboxes.
pub const PLAYER_FILTER: CollisionFilter = CollisionFilter {
    category: CollisionCategory::PLAYER,
    mask: CollisionCategory::ALL.without(CollisionCategory::KICK),
};

pub const BALL_FILTER: CollisionFilter = CollisionFilter {
    category: CollisionCategory::BALL,
    mask: CollisionCategory::ALL,
};

pub const NET_FILTER: CollisionFilter = CollisionFilter {
    category: CollisionCategory::TERRAIN,
    mask: CollisionCategory::ALL,
};

/// Posts are decoration only.
pub const POST_FILTER: CollisionFilter = CollisionFilter {
    category: CollisionCategory::TERRAIN,
    mask: CollisionCategory::NONE,
};

/// Where a player starts: a fixed height above the floor, mirrored around the center.
pub fn player_spawn_point(config: &VolleyConfig, side: Side) -> Vec2 {
    Vec2::new(
        config.arena.width / 2.0 + side.sign() * config.movement.player_spawn_offset_x,
        config.arena.height - config.movement.player_spawn_height,
    )
}

/// Where every ball starts: centered, a quarter of the way down.
pub fn ball_spawn_point(config: &VolleyConfig) -> Vec2 {
    Vec2::new(config.arena.width / 2.0, config.arena.height / 4.0)
}

/// Creates match bodies with their canonical physical properties.
pub struct Spawner {
    rng: StdRng,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn spawn_player(
        &self,
        physics: &mut dyn PhysicsWorld,
        config: &VolleyConfig,
        side: Side,
    ) -> BodyId {
        let body = physics.create_body(&BodySpec {
            key: PLAYER_KEY.to_string(),
            kind: BodyKind::Dynamic,
            position: player_spawn_point(config, side),
            size: Vec2::new(config.movement.player_width, config.movement.player_height),
        });
        physics.set_bounce(body, config.movement.player_bounce);
        physics.set_inertia(body, f32::INFINITY);
        physics.set_collision_filter(body, PLAYER_FILTER);
        body
    }

    /// Every call yields the same position, properties and category; only the
    /// serve velocity varies, within the configured range.
    pub fn spawn_ball(&mut self, physics: &mut dyn PhysicsWorld, config: &VolleyConfig) -> BodyId {
        let body = physics.create_body(&BodySpec {
            key: BALL_KEY.to_string(),
            kind: BodyKind::Dynamic,
            position: ball_spawn_point(config),
            size: Vec2::new(config.ball.diameter, config.ball.diameter),
        });
        physics.set_bounce(body, config.ball.bounce);
        physics.set_inertia(body, f32::INFINITY);
        physics.set_collision_filter(body, BALL_FILTER);
        physics.set_collision_category(body, CollisionCategory::BALL);
        physics.set_velocity(
            body,
            Vec2::new(self.serve_vx(config.ball.serve_speed_x), config.ball.serve_velocity_y),
        );
        body
    }

    fn serve_vx(&mut self, max: f32) -> f32 {
        let max = max.abs();
        if max > 0.0 {
            self.rng.random_range(-max..=max)
        } else {
            0.0
        }
    }

    /// Static divider standing on the floor at the center of the court.
    pub fn spawn_net(physics: &mut dyn PhysicsWorld, config: &VolleyConfig) -> BodyId {
        let body = physics.create_body(&BodySpec {
            key: NET_KEY.to_string(),
            kind: BodyKind::Static,
            position: Vec2::new(
                config.arena.width / 2.0 - 2.0,
                config.arena.height - config.goal.net_height / 2.0,
            ),
            size: Vec2::new(config.goal.net_width, config.goal.net_height),
        });
        physics.set_collision_filter(body, NET_FILTER);
        body
    }

    pub fn spawn_goal_post(physics: &mut dyn PhysicsWorld, zone: &GoalZone) -> BodyId {
        let body = physics.create_body(&BodySpec {
            key: GOAL_POST_KEY.to_string(),
            kind: BodyKind::Static,
            position: zone.bounds.center(),
            size: zone.bounds.size(),
        });
        physics.set_collision_filter(body, POST_FILTER);
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volley_core::collab::BodyFactory;
    use volley_core::test_helpers::RecordingWorld;

    #[test]
    fn player_spawns_above_floor_with_locked_rotation() {
        let cfg = VolleyConfig::default();
        let mut world = RecordingWorld::default();
        let spawner = Spawner::new(1);
        let body = spawner.spawn_player(&mut world, &cfg, Side::Left);

        let b = world.body(body).unwrap();
        assert_eq!(b.position, Vec2::new(400.0, 400.0));
        assert_eq!(b.bounce, 1.0);
        assert!(b.inertia.is_infinite());
        assert_eq!(b.filter, PLAYER_FILTER);
    }

    #[test]
    fn default_spawn_is_centered() {
        let cfg = VolleyConfig::default();
        let w = cfg.arena.width;
        let h = cfg.arena.height;
        assert_eq!(player_spawn_point(&cfg, Side::Left), Vec2::new(w / 2.0, h - 200.0));
        assert_eq!(player_spawn_point(&cfg, Side::Right), Vec2::new(w / 2.0, h - 200.0));
    }

    #[test]
    fn offset_spreads_players_apart() {
        let mut cfg = VolleyConfig::default();
        cfg.movement.player_spawn_offset_x = 200.0;
        assert_eq!(player_spawn_point(&cfg, Side::Left), Vec2::new(200.0, 400.0));
        assert_eq!(player_spawn_point(&cfg, Side::Right), Vec2::new(600.0, 400.0));
    }

    #[test]
    fn respawned_ball_matches_first_ball() {
        let cfg = VolleyConfig::default();
        let mut world = RecordingWorld::default();
        let mut spawner = Spawner::new(9);

        let first = spawner.spawn_ball(&mut world, &cfg);
        world.destroy_body(first);
        let second = spawner.spawn_ball(&mut world, &cfg);

        let b = world.body(second).unwrap();
        assert_eq!(b.position, ball_spawn_point(&cfg));
        assert_eq!(b.position, Vec2::new(400.0, 150.0));
        assert_eq!(b.filter.category, CollisionCategory::BALL);
        assert_eq!(b.bounce, 1.0);
        assert!(b.inertia.is_infinite());
        assert!(b.velocity.x.abs() <= cfg.ball.serve_speed_x);
        assert_eq!(b.velocity.y, cfg.ball.serve_velocity_y);
    }

    #[test]
    fn serve_is_deterministic_per_seed() {
        let cfg = VolleyConfig::default();
        let mut wa = RecordingWorld::default();
        let mut wb = RecordingWorld::default();
        let a = Spawner::new(5).spawn_ball(&mut wa, &cfg);
        let b = Spawner::new(5).spawn_ball(&mut wb, &cfg);
        assert_eq!(wa.body(a).unwrap().velocity, wb.body(b).unwrap().velocity);
    }

    #[test]
    fn zero_serve_speed_gives_still_ball() {
        let mut cfg = VolleyConfig::default();
        cfg.ball.serve_speed_x = 0.0;
        let mut world = RecordingWorld::default();
        let ball = Spawner::new(3).spawn_ball(&mut world, &cfg);
        assert_eq!(world.body(ball).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn net_and_posts_are_static() {
        let cfg = VolleyConfig::default();
        let mut world = RecordingWorld::default();
        let net = Spawner::spawn_net(&mut world, &cfg);
        let zone = GoalZone::for_side(Side::Right, &cfg);
        let post = Spawner::spawn_goal_post(&mut world, &zone);

        assert_eq!(world.body(net).unwrap().spec.kind, BodyKind::Static);
        assert_eq!(world.body(net).unwrap().filter, NET_FILTER);
        assert_eq!(world.body(post).unwrap().filter.mask, CollisionCategory::NONE);
        assert_eq!(world.body(post).unwrap().position, zone.bounds.center());
    }
}
