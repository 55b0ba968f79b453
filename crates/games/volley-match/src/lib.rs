pub mod config;
pub mod goal_zone;
pub mod kick;
pub mod movement;
pub mod scoring;
pub mod sequencer;
pub mod spawner;

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use volley_core::collab::{BodyId, Collaborators, Contact};
use volley_core::court_game_boilerplate;
use volley_core::game_trait::{
    CourtGame, GameConfig, GameEvent, GameMetadata, PlayerId, PlayerInputs, PlayerScore,
};
use volley_core::player::{Player, Side};
use volley_core::time::{Scheduler, SimClock};

use config::VolleyConfig;
use goal_zone::{GoalZone, court_goals};
use kick::ActiveKick;
use movement::{CourtInput, CourtPlayer, resolve_intent};
use scoring::ScoreTracker;
use sequencer::GoalSequencer;
use spawner::Spawner;

/// Deferred work, evaluated against the match clock each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTask {
    /// Destroy the kick hitbox at the end of its lifetime.
    ExpireKick { body: BodyId },
    /// Replace a scored ball and resume play.
    ResolveGoal { ball: BodyId },
}

/// Serializable match state, readable by the presentation layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourtState {
    pub players: Vec<CourtPlayer>,
    pub scores: [ScoreTracker; 2],
    pub ball: Option<BodyId>,
    /// The only kick hitbox allowed in the match.
    pub kick: Option<ActiveKick>,
    pub net: Option<BodyId>,
    pub goal: GoalSequencer,
    pub clock: SimClock,
    pub round_complete: bool,
    pub winner: Option<Side>,
}

impl CourtState {
    pub fn player(&self, side: Side) -> Option<&CourtPlayer> {
        self.players.iter().find(|p| p.side == side)
    }

    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()].value()
    }
}

/// The volleyball match loop.
pub struct VolleyMatch {
    config: VolleyConfig,
    state: CourtState,
    zones: [GoalZone; 2],
    spawner: Spawner,
    tasks: Scheduler<MatchTask>,
    contacts: VecDeque<Contact>,
    pending_inputs: HashMap<PlayerId, CourtInput>,
    paused: bool,
}

impl VolleyMatch {
    pub fn new() -> Self {
        Self::with_config(VolleyConfig::default())
    }

    pub fn with_config(config: VolleyConfig) -> Self {
        Self {
            zones: court_goals(&config),
            spawner: Spawner::new(config.match_rules.seed),
            config,
            state: CourtState::default(),
            tasks: Scheduler::new(),
            contacts: VecDeque::new(),
            pending_inputs: HashMap::new(),
            paused: false,
        }
    }

    pub fn state(&self) -> &CourtState {
        &self.state
    }

    pub fn config(&self) -> &VolleyConfig {
        &self.config
    }

    pub fn zones(&self) -> &[GoalZone; 2] {
        &self.zones
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    fn player_id(&self, side: Side) -> Option<PlayerId> {
        self.state.player(side).map(|p| p.player_id)
    }

    fn run_due_tasks(
        &mut self,
        now: Duration,
        collab: &mut Collaborators<'_>,
        events: &mut Vec<GameEvent>,
    ) {
        for task in self.tasks.take_due(now) {
            match task {
                MatchTask::ExpireKick { body } => {
                    kick::expire_kick(&mut self.state.kick, body, &mut *collab.physics);
                },
                MatchTask::ResolveGoal { ball } => {
                    if let Some(new_ball) =
                        self.state
                            .goal
                            .resolve(ball, &mut self.spawner, &self.config, collab)
                    {
                        self.state.ball = Some(new_ball);
                        events.push(GameEvent::BallServed);
                    }
                },
            }
        }
    }

    fn detect_goal(
        &mut self,
        now: Duration,
        collab: &mut Collaborators<'_>,
        events: &mut Vec<GameEvent>,
    ) {
        let Some(ball) = self.state.ball else {
            return;
        };
        let Some(pos) = collab.physics.position(ball) else {
            return;
        };
        let Some(zone) = self.state.goal.detect(&self.zones, pos) else {
            return;
        };
        let Some(goal) = self.state.goal.begin(
            zone,
            ball,
            now,
            &mut self.state.scores,
            &self.config,
            collab,
        ) else {
            return;
        };

        self.tasks
            .schedule(goal.resolve_at, MatchTask::ResolveGoal { ball });
        if let Some(player_id) = self.player_id(goal.scorer) {
            events.push(GameEvent::ScoreUpdate {
                player_id,
                score: goal.score,
            });
        }
        events.push(GameEvent::GoalScored {
            scorer: goal.scorer,
            zone: goal.zone,
        });
    }

    fn process_contacts(&mut self) {
        let charges = self.config.movement.down_boost_charges;
        while let Some(contact) = self.contacts.pop_front() {
            match contact {
                Contact::Ground(body) => {
                    if let Some(player) =
                        self.state.players.iter_mut().find(|p| p.body == Some(body))
                    {
                        player.land(charges);
                    }
                },
                Contact::Bodies(a, b) => {
                    tracing::trace!(a = a.0, b = b.0, "contact");
                },
            }
        }
    }

    fn drive_players(&mut self, now: Duration, collab: &mut Collaborators<'_>) {
        for player in self.state.players.iter_mut() {
            let input = self
                .pending_inputs
                .remove(&player.player_id)
                .unwrap_or_default();
            let Some(body) = player.body else {
                continue;
            };

            let cmd = resolve_intent(player, &input, &self.config.movement);
            collab.physics.set_velocity_x(body, cmd.vx);
            if let Some(vy) = cmd.vy {
                collab.physics.set_velocity_y(body, vy);
            }
            collab
                .animator
                .play_animation(body, cmd.animation.name(), false);

            if let Some(facing) = cmd.kick
                && let Some(k) = kick::start_kick(
                    &mut self.state.kick,
                    player,
                    facing,
                    now,
                    &mut *collab.physics,
                    &self.config.kick,
                )
            {
                self.tasks
                    .schedule(k.expires_at, MatchTask::ExpireKick { body: k.body });
            }
        }
    }

    fn check_round_complete(
        &mut self,
        collab: &mut Collaborators<'_>,
        events: &mut Vec<GameEvent>,
    ) {
        let Some(target) = self.config.match_rules.winning_score else {
            return;
        };
        if let Some(&winner) = Side::BOTH
            .iter()
            .find(|s| self.state.scores[s.index()].value() >= target)
        {
            self.state.round_complete = true;
            self.state.winner = Some(winner);
            // No further update runs, so the pending reset would never clear the banner.
            if !self.state.goal.is_live() {
                collab.presenter.clear_goal_text();
            }
            events.push(GameEvent::RoundComplete);
            tracing::info!(?winner, "match complete");
        }
    }
}

impl Default for VolleyMatch {
    fn default() -> Self {
        Self::new()
    }
}

impl CourtGame for VolleyMatch {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Volley".to_string(),
            description: "Kick the ball into the other side's goal!".to_string(),
            min_players: 2,
            max_players: 2,
            estimated_round_duration: Duration::from_secs(180),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.match_rules.tick_rate_hz
    }

    fn init(&mut self, players: &[Player], config: &GameConfig, collab: &mut Collaborators<'_>) {
        self.teardown(collab);

        self.config.apply_overrides(&config.custom);
        self.spawner = Spawner::new(self.config.match_rules.seed);
        self.zones = court_goals(&self.config);
        self.state = CourtState::default();
        self.paused = false;

        self.state.net = Some(Spawner::spawn_net(&mut *collab.physics, &self.config));
        for zone in self.zones.iter_mut() {
            let post = Spawner::spawn_goal_post(&mut *collab.physics, zone);
            zone.post = Some(post);
        }

        for (player, side) in players.iter().filter(|p| !p.is_spectator).zip(Side::BOTH) {
            let mut court_player = CourtPlayer::new(side, player.id);
            court_player.body = Some(self.spawner.spawn_player(
                &mut *collab.physics,
                &self.config,
                side,
            ));
            self.state.players.push(court_player);
        }
        for side in Side::BOTH {
            collab
                .presenter
                .set_score_text(side, &self.state.scores[side.index()].label());
        }

        self.state.ball = Some(self.spawner.spawn_ball(&mut *collab.physics, &self.config));
        tracing::info!(players = self.state.players.len(), "match started");
    }

    fn update(
        &mut self,
        dt: f32,
        inputs: &PlayerInputs,
        collab: &mut Collaborators<'_>,
    ) -> Vec<GameEvent> {
        if self.paused || self.state.round_complete {
            return Vec::new();
        }
        for (&player_id, data) in &inputs.inputs {
            self.apply_input(player_id, data);
        }

        self.state.clock.advance(dt);
        let now = self.state.clock.now();
        let mut events = Vec::new();

        // Timers first so a resolved goal is live again before detection runs.
        self.run_due_tasks(now, collab, &mut events);
        if self.state.goal.is_live() {
            self.detect_goal(now, collab, &mut events);
        }
        self.process_contacts();
        self.drive_players(now, collab);
        self.check_round_complete(collab, &mut events);

        events
    }

    fn notify_contact(&mut self, contact: Contact) {
        self.contacts.push_back(contact);
    }

    court_game_boilerplate!(state_type: CourtState);

    fn apply_input(&mut self, player_id: PlayerId, input: &[u8]) {
        if !self.state.players.iter().any(|p| p.player_id == player_id) {
            return;
        }
        if let Ok(ci) = rmp_serde::from_slice::<CourtInput>(input) {
            // Latch one-shot actions until the next tick consumes them.
            self.pending_inputs
                .entry(player_id)
                .and_modify(|existing| existing.merge(&ci))
                .or_insert(ci);
        }
    }

    fn round_results(&self) -> Vec<PlayerScore> {
        self.state
            .players
            .iter()
            .map(|p| PlayerScore {
                player_id: p.player_id,
                score: self.state.score(p.side),
            })
            .collect()
    }

    fn teardown(&mut self, collab: &mut Collaborators<'_>) {
        let cancelled = self.tasks.clear();
        if let Some(k) = self.state.kick.take() {
            collab.physics.destroy_body(k.body);
        }
        for player in self.state.players.iter_mut() {
            if let Some(body) = player.body.take() {
                collab.physics.destroy_body(body);
            }
        }
        if let Some(ball) = self.state.ball.take() {
            collab.physics.destroy_body(ball);
        }
        if let Some(net) = self.state.net.take() {
            collab.physics.destroy_body(net);
        }
        for zone in self.zones.iter_mut() {
            if let Some(post) = zone.post.take() {
                collab.physics.destroy_body(post);
            }
        }
        if !self.state.goal.is_live() {
            collab.presenter.clear_goal_text();
        }
        self.contacts.clear();
        self.pending_inputs.clear();
        tracing::debug!(cancelled, "match torn down");
    }
}
