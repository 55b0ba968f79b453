use std::collections::HashMap;

use serde::Serialize;

use volley_core::collab::Collaborators;
use volley_core::game_trait::{CourtGame, GameConfig, GameEvent, PlayerInputs};
use volley_core::player::{Player, PlayerColor, Side};
use volley_match::VolleyMatch;
use volley_match::config::VolleyConfig;

use crate::script::InputSource;
use crate::world::{AnimationTrack, ArcadeWorld, Hud, WorldSettings};

/// What a finished run reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub ticks: u64,
    pub goals: u32,
    pub left_score: u32,
    pub right_score: u32,
    pub winner: Option<Side>,
    pub round_complete: bool,
}

/// Owns a match and its collaborators and steps them in lockstep.
pub struct MatchRunner {
    game: VolleyMatch,
    world: ArcadeWorld,
    animator: AnimationTrack,
    hud: Hud,
    players: Vec<Player>,
    dt: f32,
    tick: u64,
    goals: u32,
}

impl MatchRunner {
    pub fn new(config: VolleyConfig) -> Self {
        let settings = WorldSettings {
            width: config.arena.width,
            height: config.arena.height,
            ..WorldSettings::default()
        };
        let dt = 1.0 / config.match_rules.tick_rate_hz.max(1.0);
        let players = Side::BOTH
            .iter()
            .enumerate()
            .map(|(i, side)| Player {
                id: i as u64 + 1,
                display_name: format!("{side:?}"),
                color: PlayerColor::PALETTE[i % PlayerColor::PALETTE.len()],
                is_spectator: false,
            })
            .collect();
        Self {
            game: VolleyMatch::with_config(config),
            world: ArcadeWorld::new(settings),
            animator: AnimationTrack::default(),
            hud: Hud::default(),
            players,
            dt,
            tick: 0,
            goals: 0,
        }
    }

    /// Spawn the court. `custom` is forwarded as the session overrides.
    pub fn start(&mut self, custom: HashMap<String, serde_json::Value>) {
        let config = GameConfig {
            round_duration: self.game.metadata().estimated_round_duration,
            custom,
        };
        let mut collab = Collaborators::new(&mut self.world, &mut self.animator, &mut self.hud);
        self.game.init(&self.players, &config, &mut collab);
    }

    pub fn game(&self) -> &VolleyMatch {
        &self.game
    }

    pub fn world(&self) -> &ArcadeWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut ArcadeWorld {
        &mut self.world
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// One frame: feed inputs, update the match, then integrate physics and
    /// hand the contacts back for the next update.
    pub fn step(&mut self, source: &mut dyn InputSource) -> Vec<GameEvent> {
        let mut inputs = PlayerInputs::default();
        for (player, side) in self.players.iter().zip(Side::BOTH) {
            let input = source.input_for(self.tick, side);
            match rmp_serde::to_vec(&input) {
                Ok(bytes) => {
                    inputs.inputs.insert(player.id, bytes);
                },
                Err(e) => tracing::warn!(error = %e, "failed to encode input"),
            }
        }

        let events = {
            let mut collab =
                Collaborators::new(&mut self.world, &mut self.animator, &mut self.hud);
            self.game.update(self.dt, &inputs, &mut collab)
        };

        self.world.step(self.dt);
        for contact in self.world.drain_contacts() {
            self.game.notify_contact(contact);
        }

        self.goals += events
            .iter()
            .filter(|e| matches!(e, GameEvent::GoalScored { .. }))
            .count() as u32;
        self.tick += 1;
        events
    }

    /// Step until `max_ticks` or the round completes.
    pub fn run(&mut self, source: &mut dyn InputSource, max_ticks: u64) {
        while self.tick < max_ticks && !self.game.is_round_complete() {
            self.step(source);
        }
    }

    pub fn summary(&self) -> MatchSummary {
        let state = self.game.state();
        MatchSummary {
            ticks: self.tick,
            goals: self.goals,
            left_score: state.score(Side::Left),
            right_score: state.score(Side::Right),
            winner: state.winner,
            round_complete: state.round_complete,
        }
    }

    /// Tear the match down and report.
    pub fn finish(&mut self) -> MatchSummary {
        let summary = self.summary();
        let mut collab = Collaborators::new(&mut self.world, &mut self.animator, &mut self.hud);
        self.game.teardown(&mut collab);
        tracing::info!(
            ticks = summary.ticks,
            left = summary.left_score,
            right = summary.right_score,
            "match finished"
        );
        summary
    }
}
