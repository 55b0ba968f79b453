use serde::{Deserialize, Serialize};

/// Authoritative goal count for one side.
///
/// The on-screen label is always derived from `value()`; callers push
/// `label()` to the presenter in the same tick they call `add`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTracker {
    score: u32,
}

impl ScoreTracker {
    pub fn new(score: u32) -> Self {
        Self { score }
    }

    /// Add points and return the new score.
    pub fn add(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    pub fn value(&self) -> u32 {
        self.score
    }

    pub fn label(&self) -> String {
        format_score(self.score)
    }
}

pub fn format_score(score: u32) -> String {
    format!("Score: {score}")
}
