use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collab::{Collaborators, Contact};
use crate::player::Side;

/// Unique identifier for a player in the game.
pub type PlayerId = u64;

/// Core trait every court game implements.
///
/// The driver owns the frame loop, the physics world, and the renderer;
/// the game only decides what happens to its bodies each tick.
pub trait CourtGame {
    /// Game metadata for the launcher.
    fn metadata(&self) -> GameMetadata;

    /// Called once when the match starts. Spawns the game's bodies.
    fn init(
        &mut self,
        players: &[super::player::Player],
        config: &GameConfig,
        collab: &mut Collaborators<'_>,
    );

    /// Called each frame. Returns a list of game events.
    fn update(
        &mut self,
        dt: f32,
        inputs: &PlayerInputs,
        collab: &mut Collaborators<'_>,
    ) -> Vec<GameEvent>;

    /// Queue a contact reported by the physics collaborator.
    /// Contacts are consumed on the next `update`.
    fn notify_contact(&mut self, contact: Contact);

    /// Serialize a snapshot of the game state for the presentation layer.
    fn serialize_state(&self) -> Vec<u8>;

    /// Apply one player's encoded input for the next tick.
    fn apply_input(&mut self, player_id: PlayerId, input: &[u8]);

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Called when the driver suspends the match.
    fn pause(&mut self);

    /// Called when gameplay should resume after a pause.
    fn resume(&mut self);

    /// Whether the current match is complete.
    fn is_round_complete(&self) -> bool;

    /// Final scores for the completed match.
    fn round_results(&self) -> Vec<PlayerScore>;

    /// Cancel pending timers and destroy every body the game created.
    fn teardown(&mut self, collab: &mut Collaborators<'_>);
}

/// Game metadata for the launcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub min_players: u8,
    pub max_players: u8,
    pub estimated_round_duration: Duration,
}

/// Configuration for a game session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    pub round_duration: Duration,
    pub custom: HashMap<String, serde_json::Value>,
}

/// Collected encoded inputs from all players for a single tick.
#[derive(Debug, Default)]
pub struct PlayerInputs {
    pub inputs: HashMap<PlayerId, Vec<u8>>,
}

/// Events emitted by a game during update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreUpdate { player_id: PlayerId, score: u32 },
    GoalScored { scorer: Side, zone: Side },
    BallServed,
    RoundComplete,
}

/// Score entry for a player at the end of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub score: u32,
}

/// Generates the `CourtGame` methods that are identical across games:
/// `serialize_state`, `pause`, `resume`, `is_round_complete`.
///
/// Requires the implementing struct to have `state: $StateType` and `paused: bool` fields,
/// and `$StateType` to have a `round_complete: bool` field.
#[macro_export]
macro_rules! court_game_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).unwrap_or_default()
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_round_complete(&self) -> bool {
            self.state.round_complete
        }
    };
}
