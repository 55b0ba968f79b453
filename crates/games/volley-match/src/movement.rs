use serde::{Deserialize, Serialize};

use volley_core::collab::BodyId;
use volley_core::game_trait::PlayerId;
use volley_core::player::Side;

use crate::config::MovementConfig;

/// Input from a single player for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub drop: bool,
    pub kick: bool,
    pub face_left: bool,
    pub face_right: bool,
}

impl CourtInput {
    /// Fold a newer input into one not yet consumed. Held directions take the
    /// latest value; one-shot actions stay set until the tick consumes them.
    pub fn merge(&mut self, newer: &CourtInput) {
        self.left = newer.left;
        self.right = newer.right;
        self.face_left = newer.face_left;
        self.face_right = newer.face_right;
        self.jump |= newer.jump;
        self.drop |= newer.drop;
        self.kick |= newer.kick;
    }
}

/// Direction a player is looking; decides which side a kick lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Players start out looking across the net.
    pub fn toward_net(side: Side) -> Self {
        match side {
            Side::Left => Facing::Right,
            Side::Right => Facing::Left,
        }
    }
}

/// Animation the renderer should be playing for a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationState {
    Left,
    Right,
    #[default]
    Idle,
}

impl AnimationState {
    pub fn name(self) -> &'static str {
        match self {
            AnimationState::Left => "left",
            AnimationState::Right => "right",
            AnimationState::Idle => "turn",
        }
    }
}

/// Match-side state of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtPlayer {
    pub side: Side,
    pub player_id: PlayerId,
    pub body: Option<BodyId>,
    pub vx_command: f32,
    pub touching_ground: bool,
    pub down_boost: u8,
    pub facing: Facing,
    pub animation: AnimationState,
}

impl CourtPlayer {
    pub fn new(side: Side, player_id: PlayerId) -> Self {
        Self {
            side,
            player_id,
            body: None,
            vx_command: 0.0,
            touching_ground: false,
            down_boost: 0,
            facing: Facing::toward_net(side),
            animation: AnimationState::Idle,
        }
    }

    /// Ground contact re-arms the jump and refills the fast-drop charges.
    pub fn land(&mut self, charges: u8) {
        self.touching_ground = true;
        self.down_boost = charges;
    }
}

/// What the match loop must tell the collaborators after resolving intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionCommand {
    pub vx: f32,
    /// `None` leaves the current vertical velocity alone.
    pub vy: Option<f32>,
    pub animation: AnimationState,
    /// Kick requested this tick, toward this direction.
    pub kick: Option<Facing>,
}

/// Turn one tick of input into velocity and animation commands, updating the
/// player's ground, boost and facing state.
pub fn resolve_intent(
    player: &mut CourtPlayer,
    input: &CourtInput,
    movement: &MovementConfig,
) -> MotionCommand {
    let airborne = !player.touching_ground;

    let (vx, animation) = if input.left {
        player.facing = Facing::Left;
        (-movement.speed, AnimationState::Left)
    } else if input.right {
        player.facing = Facing::Right;
        (movement.speed, AnimationState::Right)
    } else {
        (0.0, AnimationState::Idle)
    };
    if input.face_left {
        player.facing = Facing::Left;
    } else if input.face_right {
        player.facing = Facing::Right;
    }
    player.vx_command = vx;
    player.animation = animation;

    let mut vy = None;
    if input.jump && player.touching_ground {
        vy = Some(-movement.jump_velocity);
        player.touching_ground = false;
    }
    if input.drop && airborne && player.down_boost > 0 {
        vy = Some(movement.fast_drop_velocity);
        player.down_boost -= 1;
    }

    MotionCommand {
        vx,
        vy,
        animation,
        kick: input.kick.then_some(player.facing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_player() -> CourtPlayer {
        let mut p = CourtPlayer::new(Side::Left, 1);
        p.land(1);
        p
    }

    fn airborne_player(boost: u8) -> CourtPlayer {
        let mut p = CourtPlayer::new(Side::Left, 1);
        p.down_boost = boost;
        p
    }

    #[test]
    fn idle_by_default() {
        let mut p = grounded_player();
        let cmd = resolve_intent(&mut p, &CourtInput::default(), &MovementConfig::default());
        assert_eq!(cmd.vx, 0.0);
        assert_eq!(cmd.vy, None);
        assert_eq!(cmd.animation, AnimationState::Idle);
        assert_eq!(cmd.animation.name(), "turn");
        assert_eq!(cmd.kick, None);
    }

    #[test]
    fn left_wins_over_right() {
        let mv = MovementConfig::default();
        let mut p = grounded_player();
        let input = CourtInput {
            left: true,
            right: true,
            ..Default::default()
        };
        let cmd = resolve_intent(&mut p, &input, &mv);
        assert_eq!(cmd.vx, -mv.speed);
        assert_eq!(cmd.animation, AnimationState::Left);
        assert_eq!(p.facing, Facing::Left);
    }

    #[test]
    fn moving_right_faces_right() {
        let mv = MovementConfig::default();
        let mut p = CourtPlayer::new(Side::Right, 2);
        assert_eq!(p.facing, Facing::Left);
        let input = CourtInput {
            right: true,
            ..Default::default()
        };
        let cmd = resolve_intent(&mut p, &input, &mv);
        assert_eq!(cmd.vx, mv.speed);
        assert_eq!(cmd.animation.name(), "right");
        assert_eq!(p.facing, Facing::Right);

        // Facing persists after letting go.
        resolve_intent(&mut p, &CourtInput::default(), &mv);
        assert_eq!(p.facing, Facing::Right);
    }

    #[test]
    fn explicit_facing_overrides_movement() {
        let mut p = grounded_player();
        let input = CourtInput {
            right: true,
            face_left: true,
            kick: true,
            ..Default::default()
        };
        let cmd = resolve_intent(&mut p, &input, &MovementConfig::default());
        assert_eq!(cmd.animation, AnimationState::Right);
        assert_eq!(cmd.kick, Some(Facing::Left));
    }

    #[test]
    fn jump_only_from_ground() {
        let mv = MovementConfig::default();
        let jump = CourtInput {
            jump: true,
            ..Default::default()
        };

        let mut p = grounded_player();
        let cmd = resolve_intent(&mut p, &jump, &mv);
        assert_eq!(cmd.vy, Some(-mv.jump_velocity));
        assert!(!p.touching_ground);
        assert_eq!(p.down_boost, 1, "jumping must not touch the boost");

        let cmd = resolve_intent(&mut p, &jump, &mv);
        assert_eq!(cmd.vy, None, "no second jump while airborne");
    }

    #[test]
    fn fast_drop_consumes_single_charge() {
        let mv = MovementConfig::default();
        let drop = CourtInput {
            drop: true,
            ..Default::default()
        };
        let mut p = airborne_player(1);

        let cmd = resolve_intent(&mut p, &drop, &mv);
        assert_eq!(cmd.vy, Some(mv.fast_drop_velocity));
        assert_eq!(p.down_boost, 0);

        let cmd = resolve_intent(&mut p, &drop, &mv);
        assert_eq!(cmd.vy, None, "second drop in the same flight is rejected");
        assert_eq!(p.down_boost, 0);
    }

    #[test]
    fn fast_drop_ignored_on_ground() {
        let mut p = grounded_player();
        let input = CourtInput {
            drop: true,
            ..Default::default()
        };
        let cmd = resolve_intent(&mut p, &input, &MovementConfig::default());
        assert_eq!(cmd.vy, None);
        assert_eq!(p.down_boost, 1);
    }

    #[test]
    fn jump_and_drop_same_tick_keeps_jump() {
        let mv = MovementConfig::default();
        let mut p = grounded_player();
        let input = CourtInput {
            jump: true,
            drop: true,
            ..Default::default()
        };
        let cmd = resolve_intent(&mut p, &input, &mv);
        assert_eq!(cmd.vy, Some(-mv.jump_velocity));
        assert_eq!(p.down_boost, 1);
    }

    #[test]
    fn landing_resets_boost_regardless_of_prior_value() {
        let mut p = airborne_player(0);
        p.land(1);
        assert!(p.touching_ground);
        assert_eq!(p.down_boost, 1);

        let mut p = airborne_player(5);
        p.land(1);
        assert_eq!(p.down_boost, 1);
    }

    #[test]
    fn merge_latches_one_shot_actions() {
        let mut pending = CourtInput {
            jump: true,
            left: true,
            ..Default::default()
        };
        pending.merge(&CourtInput {
            right: true,
            ..Default::default()
        });
        assert!(pending.jump);
        assert!(!pending.left);
        assert!(pending.right);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Step {
            Tick(CourtInput),
            Land,
        }

        fn step() -> impl Strategy<Value = Step> {
            prop_oneof![
                1 => Just(Step::Land),
                4 => (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
                    |(left, right, jump, drop)| Step::Tick(CourtInput {
                        left,
                        right,
                        jump,
                        drop,
                        ..Default::default()
                    })
                ),
            ]
        }

        proptest! {
            #[test]
            fn jump_velocity_iff_grounded(steps in proptest::collection::vec(step(), 1..120)) {
                let mv = MovementConfig::default();
                let mut p = CourtPlayer::new(Side::Left, 1);
                for s in &steps {
                    match s {
                        Step::Land => p.land(mv.down_boost_charges),
                        Step::Tick(input) => {
                            let was_grounded = p.touching_ground;
                            let boost_before = p.down_boost;
                            let cmd = resolve_intent(&mut p, input, &mv);

                            let jumped = cmd.vy == Some(-mv.jump_velocity);
                            prop_assert_eq!(jumped, input.jump && was_grounded);
                            if jumped {
                                prop_assert!(!p.touching_ground);
                            }

                            let dropped = cmd.vy == Some(mv.fast_drop_velocity);
                            prop_assert_eq!(
                                dropped,
                                input.drop && !was_grounded && boost_before > 0
                            );
                            if dropped {
                                prop_assert_eq!(p.down_boost, boost_before - 1);
                            } else {
                                prop_assert_eq!(p.down_boost, boost_before);
                            }
                        }
                    }
                    prop_assert!(p.down_boost <= mv.down_boost_charges);
                }
            }
        }
    }
}
