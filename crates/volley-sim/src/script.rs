//! Where the runner gets each tick's input from.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use volley_core::player::Side;
use volley_match::movement::CourtInput;

/// Supplies per-tick input for each side.
pub trait InputSource {
    fn input_for(&mut self, tick: u64, side: Side) -> CourtInput;
}

/// One held input, active on ticks `from_tick..=to_tick`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptStep {
    pub player: Side,
    pub from_tick: u64,
    #[serde(default)]
    pub to_tick: Option<u64>,
    #[serde(flatten)]
    pub input: CourtInput,
}

impl ScriptStep {
    fn covers(&self, tick: u64) -> bool {
        tick >= self.from_tick && tick <= self.to_tick.unwrap_or(self.from_tick)
    }
}

/// Input read from a TOML script. Overlapping steps for the same side are
/// OR-ed together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptedInputs {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl ScriptedInputs {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Last tick any step is active on.
    pub fn last_tick(&self) -> Option<u64> {
        self.steps
            .iter()
            .map(|s| s.to_tick.unwrap_or(s.from_tick))
            .max()
    }
}

impl InputSource for ScriptedInputs {
    fn input_for(&mut self, tick: u64, side: Side) -> CourtInput {
        self.steps
            .iter()
            .filter(|s| s.player == side && s.covers(tick))
            .fold(CourtInput::default(), |acc, s| CourtInput {
                left: acc.left || s.input.left,
                right: acc.right || s.input.right,
                jump: acc.jump || s.input.jump,
                drop: acc.drop || s.input.drop,
                kick: acc.kick || s.input.kick,
                face_left: acc.face_left || s.input.face_left,
                face_right: acc.face_right || s.input.face_right,
            })
    }
}

/// Seeded button-masher. Holds a direction for a while, presses actions at
/// the configured odds.
#[derive(Debug)]
pub struct RandomInputs {
    rng: StdRng,
    hold_ticks: u64,
    held: [CourtInput; 2],
}

impl RandomInputs {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            hold_ticks: 20,
            held: Default::default(),
        }
    }
}

impl InputSource for RandomInputs {
    fn input_for(&mut self, tick: u64, side: Side) -> CourtInput {
        let held = &mut self.held[side.index()];
        if tick % self.hold_ticks == 0 {
            let dir = self.rng.random_range(0..3u8);
            held.left = dir == 0;
            held.right = dir == 1;
        }
        CourtInput {
            left: held.left,
            right: held.right,
            jump: self.rng.random_bool(0.05),
            drop: self.rng.random_bool(0.03),
            kick: self.rng.random_bool(0.08),
            ..Default::default()
        }
    }
}
