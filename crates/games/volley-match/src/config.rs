use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Arena size in world units. Origin is top-left, y grows downward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Player movement tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Horizontal speed (units/s).
    pub speed: f32,
    /// Upward speed applied on jump (units/s). Applied as `-jump_velocity`.
    pub jump_velocity: f32,
    /// Downward speed applied on fast-drop (units/s).
    pub fast_drop_velocity: f32,
    /// Fast-drop charges restored on each ground contact.
    pub down_boost_charges: u8,
    /// Distance from the horizontal center to each player's spawn point.
    /// Zero spawns both players centered; a positive value spreads them apart.
    pub player_spawn_offset_x: f32,
    /// Height of the spawn point above the floor.
    pub player_spawn_height: f32,
    pub player_bounce: f32,
    pub player_width: f32,
    pub player_height: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 200.0,
            jump_velocity: 600.0,
            fast_drop_velocity: 900.0,
            down_boost_charges: 1,
            player_spawn_offset_x: 0.0,
            player_spawn_height: 200.0,
            player_bounce: 1.0,
            player_width: 32.0,
            player_height: 48.0,
        }
    }
}

/// Kick hitbox tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KickConfig {
    /// Horizontal distance from the player, in the facing direction.
    pub offset_x: f32,
    /// Vertical distance below the player.
    pub offset_y: f32,
    /// Outward horizontal speed.
    pub speed: f32,
    /// Hitbox lifetime in milliseconds.
    pub lifetime_ms: u64,
    /// Large enough that the ball never displaces the hitbox.
    pub mass: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for KickConfig {
    fn default() -> Self {
        Self {
            offset_x: 50.0,
            offset_y: 30.0,
            speed: 15.0,
            lifetime_ms: 220,
            mass: 1000.0,
            width: 40.0,
            height: 20.0,
        }
    }
}

impl KickConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }
}

/// Ball spawn tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Serve vx is drawn uniformly from `[-serve_speed_x, serve_speed_x]`.
    pub serve_speed_x: f32,
    pub serve_velocity_y: f32,
    pub bounce: f32,
    pub diameter: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            serve_speed_x: 200.0,
            serve_velocity_y: 0.0,
            bounce: 1.0,
            diameter: 40.0,
        }
    }
}

/// Goal zone layout and the scored-goal sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Width of each goal band at the court edges.
    pub width: f32,
    /// Top of the goal band as a fraction of arena height.
    pub top_fraction: f32,
    /// Time between a goal and the next serve, in milliseconds.
    pub reset_delay_ms: u64,
    pub banner_text: String,
    pub net_width: f32,
    pub net_height: f32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            top_fraction: 3.0 / 5.0,
            reset_delay_ms: 3000,
            banner_text: "Goal!".to_string(),
            net_width: 8.0,
            net_height: 120.0,
        }
    }
}

impl GoalConfig {
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

/// Match-level rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// First side to reach this many goals wins. `None` plays forever.
    pub winning_score: Option<u32>,
    /// Seed for serve randomness.
    pub seed: u64,
    pub tick_rate_hz: f32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            winning_score: None,
            seed: 42,
            tick_rate_hz: 60.0,
        }
    }
}

/// Top-level volleyball configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VolleyConfig {
    pub arena: ArenaConfig,
    pub movement: MovementConfig,
    pub kick: KickConfig,
    pub ball: BallConfig,
    pub goal: GoalConfig,
    pub match_rules: MatchRules,
}

impl VolleyConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("VOLLEY_CONFIG").unwrap_or_else(|_| "config/volley.toml".to_string());
        Self::load_from(&path)
    }

    /// Load from an explicit path with the same fallback as [`VolleyConfig::load`].
    pub fn load_from(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply per-session overrides from `GameConfig::custom`.
    pub fn apply_overrides(&mut self, custom: &HashMap<String, serde_json::Value>) {
        if let Some(seed) = custom.get("seed").and_then(|v| v.as_u64()) {
            self.match_rules.seed = seed;
        }
        if let Some(target) = custom.get("winning_score").and_then(|v| v.as_u64()) {
            self.match_rules.winning_score = u32::try_from(target).ok().filter(|&t| t > 0);
        }
    }
}
