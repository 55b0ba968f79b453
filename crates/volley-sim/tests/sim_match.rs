use std::collections::HashMap;

use volley_core::collab::{Kinematics, Vec2};
use volley_core::game_trait::{CourtGame, GameEvent};
use volley_core::player::Side;
use volley_match::config::VolleyConfig;
use volley_match::kick::KICK_KEY;
use volley_match::spawner::{BALL_KEY, PLAYER_KEY};
use volley_sim::{MatchRunner, RandomInputs, ScriptedInputs};

fn still_serve() -> VolleyConfig {
    let mut cfg = VolleyConfig::default();
    cfg.ball.serve_speed_x = 0.0;
    cfg
}

fn started(cfg: VolleyConfig) -> MatchRunner {
    let mut runner = MatchRunner::new(cfg);
    runner.start(HashMap::new());
    runner
}

#[test]
fn ball_in_left_goal_scores_for_right_and_reserves() {
    let mut runner = started(still_serve());
    let old_ball = runner.game().state().ball.unwrap();
    runner.world_mut().teleport(old_ball, Vec2::new(20.0, 500.0));
    runner.world_mut().set_velocity(old_ball, Vec2::new(-300.0, 0.0));

    let mut idle = ScriptedInputs::default();
    let events = runner.step(&mut idle);
    assert!(events.contains(&GameEvent::GoalScored {
        scorer: Side::Right,
        zone: Side::Left,
    }));
    assert_eq!(runner.game().state().score(Side::Right), 1);
    assert_eq!(runner.game().state().score(Side::Left), 0);
    assert_eq!(runner.hud().banner.as_deref(), Some("Goal!"));
    assert_eq!(
        runner.hud().scores.get(&Side::Right).map(String::as_str),
        Some("Score: 1")
    );

    // Frozen in the goal while the banner is up; no second goal.
    let mut served = false;
    for _ in 0..170 {
        let events = runner.step(&mut idle);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::GoalScored { .. })));
        served |= events.contains(&GameEvent::BallServed);
    }
    assert!(!served, "reset must wait the full delay");
    assert_eq!(runner.world().velocity(old_ball), Some(Vec2::ZERO));

    for _ in 0..20 {
        served |= runner.step(&mut idle).contains(&GameEvent::BallServed);
    }
    assert!(served);
    let new_ball = runner.game().state().ball.unwrap();
    assert_ne!(new_ball, old_ball);
    assert!(runner.world().position(old_ball).is_none());
    assert_eq!(runner.world().bodies_with_key(BALL_KEY), vec![new_ball]);
    assert!(runner.hud().banner.is_none());
    assert_eq!(runner.game().state().score(Side::Right), 1);
    assert_eq!(runner.summary().goals, 1);
}

#[test]
fn jump_works_after_landing() {
    let mut script = ScriptedInputs::from_toml(
        r#"
[[steps]]
player = "Left"
from_tick = 60
jump = true
"#,
    )
    .unwrap();
    let mut runner = started(still_serve());
    let body = runner.game().state().player(Side::Left).unwrap().body.unwrap();

    for _ in 0..60 {
        runner.step(&mut script);
    }
    assert!(runner.game().state().player(Side::Left).unwrap().touching_ground);

    runner.step(&mut script);
    let vy = runner.world().velocity(body).unwrap().y;
    assert!(vy < -500.0, "expected an upward launch, got {vy}");
    assert!(!runner.game().state().player(Side::Left).unwrap().touching_ground);
}

#[test]
fn random_match_keeps_invariants() {
    let mut runner = started(VolleyConfig::default());
    let mut inputs = RandomInputs::new(1234);

    for _ in 0..3600 {
        runner.step(&mut inputs);
        let kicks = runner.world().bodies_with_key(KICK_KEY);
        assert!(kicks.len() <= 1);
        assert_eq!(
            kicks.first(),
            runner.game().state().kick.as_ref().map(|k| &k.body)
        );
        assert_eq!(runner.world().bodies_with_key(BALL_KEY).len(), 1);
        assert_eq!(runner.world().bodies_with_key(PLAYER_KEY).len(), 2);
    }

    let summary = runner.finish();
    assert_eq!(summary.goals, summary.left_score + summary.right_score);
    assert_eq!(runner.world().body_count(), 0);
    assert_eq!(runner.game().pending_tasks(), 0);
}

#[test]
fn winning_score_override_ends_the_run() {
    let mut runner = MatchRunner::new(still_serve());
    let mut custom = HashMap::new();
    custom.insert("winning_score".to_string(), serde_json::json!(1));
    runner.start(custom);

    let ball = runner.game().state().ball.unwrap();
    runner.world_mut().teleport(ball, Vec2::new(780.0, 500.0));
    let mut idle = ScriptedInputs::default();
    runner.run(&mut idle, 600);

    let summary = runner.summary();
    assert!(summary.round_complete);
    assert_eq!(summary.winner, Some(Side::Left));
    assert!(summary.ticks < 600);
    assert!(runner.game().is_round_complete());
}

#[test]
fn bundled_files_parse() {
    let root = concat!(env!("CARGO_MANIFEST_DIR"), "/../..");
    let config = std::fs::read_to_string(format!("{root}/config/volley.toml")).unwrap();
    let cfg = VolleyConfig::from_toml(&config).unwrap();
    assert_eq!(cfg.kick.lifetime_ms, 220);
    assert_eq!(cfg.goal.reset_delay_ms, 3000);
    assert_eq!(cfg.match_rules.winning_score, None);

    let script = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/scripts/rally.toml"
    ))
    .unwrap();
    let mut script = ScriptedInputs::from_toml(&script).unwrap();
    assert!(script.last_tick().unwrap() >= 120);
}
