use serde::{Deserialize, Serialize};

use volley_core::collab::{BodyId, Vec2};
use volley_core::player::Side;

use crate::config::VolleyConfig;

/// Axis-aligned rectangle, exclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Bounds {
    pub fn contains(&self, p: Vec2) -> bool {
        self.x_min < p.x && p.x < self.x_max && self.y_min < p.y && p.y < self.y_max
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.x_max - self.x_min, self.y_max - self.y_min)
    }
}

/// The goal a side defends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalZone {
    pub side: Side,
    pub bounds: Bounds,
    /// Visual goal post, if one has been spawned.
    pub post: Option<BodyId>,
}

impl GoalZone {
    pub fn new(side: Side, bounds: Bounds) -> Self {
        Self {
            side,
            bounds,
            post: None,
        }
    }

    /// The goal band at one edge of the court, covering the lower part of its height.
    pub fn for_side(side: Side, config: &VolleyConfig) -> Self {
        let w = config.arena.width;
        let h = config.arena.height;
        let gw = config.goal.width;
        let (x_min, x_max) = match side {
            Side::Left => (0.0, gw),
            Side::Right => (w - gw, w),
        };
        Self::new(
            side,
            Bounds {
                x_min,
                x_max,
                y_min: h * config.goal.top_fraction,
                y_max: h,
            },
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.bounds.contains(p)
    }

    /// The ball in this goal scores for the other side.
    pub fn scoring_side(&self) -> Side {
        self.side.opponent()
    }
}

/// Both goals, left then right.
pub fn court_goals(config: &VolleyConfig) -> [GoalZone; 2] {
    [
        GoalZone::for_side(Side::Left, config),
        GoalZone::for_side(Side::Right, config),
    ]
}
