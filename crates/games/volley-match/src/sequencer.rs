use std::time::Duration;

use serde::{Deserialize, Serialize};

use volley_core::collab::{BodyId, Collaborators, Vec2};
use volley_core::player::Side;

use crate::config::VolleyConfig;
use crate::goal_zone::GoalZone;
use crate::scoring::ScoreTracker;
use crate::spawner::Spawner;

/// Where the goal-scored state machine currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum GoalPhase {
    #[default]
    Live,
    Scored {
        /// The ball that went in; the only one `resolve` will replace.
        ball: BodyId,
        scorer: Side,
        zone: Side,
        resolve_at: Duration,
    },
}

/// Outcome of a detected goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalScored {
    pub scorer: Side,
    pub zone: Side,
    pub score: u32,
    pub resolve_at: Duration,
}

/// Live -> Scored -> Live, one goal per ball.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSequencer {
    phase: GoalPhase,
}

impl GoalSequencer {
    pub fn phase(&self) -> GoalPhase {
        self.phase
    }

    pub fn is_live(&self) -> bool {
        self.phase == GoalPhase::Live
    }

    /// Ball currently being sequenced, if any.
    pub fn sequenced_ball(&self) -> Option<BodyId> {
        match self.phase {
            GoalPhase::Live => None,
            GoalPhase::Scored { ball, .. } => Some(ball),
        }
    }

    /// The zone the ball is in, if a goal may be scored right now.
    /// While a goal is being sequenced this never looks at the zones.
    pub fn detect<'z>(&self, zones: &'z [GoalZone], ball_pos: Vec2) -> Option<&'z GoalZone> {
        if !self.is_live() {
            return None;
        }
        zones.iter().find(|z| z.contains(ball_pos))
    }

    /// Live -> Scored. Credits the opponent of `zone`, updates the HUD, and
    /// freezes the ball where it is. Returns `None` if already sequencing.
    pub fn begin(
        &mut self,
        zone: &GoalZone,
        ball: BodyId,
        now: Duration,
        scores: &mut [ScoreTracker; 2],
        config: &VolleyConfig,
        collab: &mut Collaborators<'_>,
    ) -> Option<GoalScored> {
        if !self.is_live() {
            return None;
        }
        let scorer = zone.scoring_side();
        let tracker = &mut scores[scorer.index()];
        let score = tracker.add(1);
        collab.presenter.set_score_text(scorer, &tracker.label());

        let resolve_at = now + config.goal.reset_delay();
        self.phase = GoalPhase::Scored {
            ball,
            scorer,
            zone: zone.side,
            resolve_at,
        };
        collab
            .presenter
            .show_goal_text(&config.goal.banner_text, config.goal.reset_delay());

        collab.physics.set_velocity(ball, Vec2::ZERO);
        collab.physics.set_ignore_gravity(ball, true);

        tracing::info!(?scorer, zone = ?zone.side, score, "goal");
        Some(GoalScored {
            scorer,
            zone: zone.side,
            score,
            resolve_at,
        })
    }

    /// Scored -> Live. Replaces `captured` with a fresh ball and clears the
    /// banner. Returns the new ball, or `None` if `captured` is not the ball
    /// being sequenced.
    pub fn resolve(
        &mut self,
        captured: BodyId,
        spawner: &mut Spawner,
        config: &VolleyConfig,
        collab: &mut Collaborators<'_>,
    ) -> Option<BodyId> {
        if self.sequenced_ball() != Some(captured) {
            tracing::debug!(ball = captured.0, "stale goal reset ignored");
            return None;
        }
        collab.physics.destroy_body(captured);
        let ball = spawner.spawn_ball(&mut *collab.physics, config);
        collab.presenter.clear_goal_text();
        self.phase = GoalPhase::Live;
        tracing::info!(ball = ball.0, "ball served");
        Some(ball)
    }
}
