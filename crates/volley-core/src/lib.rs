pub mod collab;
pub mod game_trait;
pub mod player;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::collections::{BTreeMap, HashMap};
    use std::time::Duration;

    use crate::collab::{
        Animator, BodyFactory, BodyId, BodyKind, BodyProperties, BodySpec, Collaborators,
        CollisionCategory, CollisionFilter, Kinematics, Presenter, Vec2,
    };
    use crate::game_trait::{CourtGame, GameConfig, GameEvent, PlayerId, PlayerInputs};
    use crate::player::{Player, PlayerColor, Side};

    /// Create `n` test players with sequential IDs starting at 1.
    pub fn make_players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player {
                id: i as PlayerId + 1,
                display_name: format!("Player{}", i + 1),
                color: PlayerColor::PALETTE[i % PlayerColor::PALETTE.len()],
                is_spectator: false,
            })
            .collect()
    }

    /// Create a default GameConfig with the given round duration in seconds.
    pub fn default_config(round_duration_secs: u64) -> GameConfig {
        GameConfig {
            round_duration: Duration::from_secs(round_duration_secs),
            custom: HashMap::new(),
        }
    }

    /// A body as the recording world sees it.
    #[derive(Debug, Clone, PartialEq)]
    pub struct TestBody {
        pub spec: BodySpec,
        pub position: Vec2,
        pub velocity: Vec2,
        pub bounce: f32,
        pub inertia: f32,
        pub mass: f32,
        pub ignore_gravity: bool,
        pub filter: CollisionFilter,
    }

    /// Physics double: stores whatever the game commands, never integrates.
    /// Tests move bodies explicitly with [`RecordingWorld::place`].
    #[derive(Debug, Default)]
    pub struct RecordingWorld {
        next_id: u64,
        pub bodies: BTreeMap<BodyId, TestBody>,
        pub created: Vec<BodyId>,
        pub destroyed: Vec<BodyId>,
    }

    impl RecordingWorld {
        pub fn body(&self, id: BodyId) -> Option<&TestBody> {
            self.bodies.get(&id)
        }

        pub fn place(&mut self, id: BodyId, position: Vec2) {
            if let Some(b) = self.bodies.get_mut(&id) {
                b.position = position;
            }
        }

        /// Live bodies in the given category.
        pub fn bodies_in(&self, category: CollisionCategory) -> Vec<BodyId> {
            self.bodies
                .iter()
                .filter(|(_, b)| b.filter.category == category)
                .map(|(&id, _)| id)
                .collect()
        }

        pub fn dynamic_count(&self) -> usize {
            self.bodies
                .values()
                .filter(|b| b.spec.kind == BodyKind::Dynamic)
                .count()
        }
    }

    impl Kinematics for RecordingWorld {
        fn position(&self, body: BodyId) -> Option<Vec2> {
            self.bodies.get(&body).map(|b| b.position)
        }

        fn velocity(&self, body: BodyId) -> Option<Vec2> {
            self.bodies.get(&body).map(|b| b.velocity)
        }

        fn set_velocity(&mut self, body: BodyId, velocity: Vec2) {
            if let Some(b) = self.bodies.get_mut(&body) {
                b.velocity = velocity;
            }
        }
    }

    impl BodyProperties for RecordingWorld {
        fn set_bounce(&mut self, body: BodyId, bounce: f32) {
            if let Some(b) = self.bodies.get_mut(&body) {
                b.bounce = bounce;
            }
        }

        fn set_inertia(&mut self, body: BodyId, inertia: f32) {
            if let Some(b) = self.bodies.get_mut(&body) {
                b.inertia = inertia;
            }
        }

        fn set_mass(&mut self, body: BodyId, mass: f32) {
            if let Some(b) = self.bodies.get_mut(&body) {
                b.mass = mass;
            }
        }

        fn set_ignore_gravity(&mut self, body: BodyId, ignore: bool) {
            if let Some(b) = self.bodies.get_mut(&body) {
                b.ignore_gravity = ignore;
            }
        }

        fn set_collision_category(&mut self, body: BodyId, category: CollisionCategory) {
            if let Some(b) = self.bodies.get_mut(&body) {
                b.filter.category = category;
            }
        }

        fn set_collision_filter(&mut self, body: BodyId, filter: CollisionFilter) {
            if let Some(b) = self.bodies.get_mut(&body) {
                b.filter = filter;
            }
        }
    }

    impl BodyFactory for RecordingWorld {
        fn create_body(&mut self, spec: &BodySpec) -> BodyId {
            self.next_id += 1;
            let id = BodyId(self.next_id);
            self.bodies.insert(
                id,
                TestBody {
                    spec: spec.clone(),
                    position: spec.position,
                    velocity: Vec2::ZERO,
                    bounce: 0.0,
                    inertia: 1.0,
                    mass: 1.0,
                    ignore_gravity: false,
                    filter: CollisionFilter::default(),
                },
            );
            self.created.push(id);
            id
        }

        fn destroy_body(&mut self, body: BodyId) {
            if self.bodies.remove(&body).is_some() {
                self.destroyed.push(body);
            }
        }

        fn is_alive(&self, body: BodyId) -> bool {
            self.bodies.contains_key(&body)
        }
    }

    /// Animation double: keeps every request in order.
    #[derive(Debug, Default)]
    pub struct RecordingAnimator {
        pub played: Vec<(BodyId, String)>,
    }

    impl RecordingAnimator {
        pub fn last_for(&self, body: BodyId) -> Option<&str> {
            self.played
                .iter()
                .rev()
                .find(|(b, _)| *b == body)
                .map(|(_, name)| name.as_str())
        }
    }

    impl Animator for RecordingAnimator {
        fn play_animation(&mut self, body: BodyId, name: &str, _restart_if_same: bool) {
            self.played.push((body, name.to_string()));
        }
    }

    /// HUD double: holds the text that would currently be on screen.
    #[derive(Debug, Default)]
    pub struct RecordingPresenter {
        pub score_text: HashMap<Side, String>,
        pub goal_text: Option<(String, Duration)>,
        pub goal_banners_shown: usize,
    }

    impl Presenter for RecordingPresenter {
        fn set_score_text(&mut self, side: Side, text: &str) {
            self.score_text.insert(side, text.to_string());
        }

        fn show_goal_text(&mut self, text: &str, duration: Duration) {
            self.goal_text = Some((text.to_string(), duration));
            self.goal_banners_shown += 1;
        }

        fn clear_goal_text(&mut self) {
            self.goal_text = None;
        }
    }

    /// All three recording collaborators, lendable as [`Collaborators`].
    #[derive(Debug, Default)]
    pub struct TestRig {
        pub world: RecordingWorld,
        pub animator: RecordingAnimator,
        pub presenter: RecordingPresenter,
    }

    impl TestRig {
        pub fn collab(&mut self) -> Collaborators<'_> {
            Collaborators::new(&mut self.world, &mut self.animator, &mut self.presenter)
        }
    }

    /// Run N game ticks with empty inputs, returning all accumulated events.
    pub fn run_game_ticks(
        game: &mut dyn CourtGame,
        rig: &mut TestRig,
        n: usize,
        dt: f32,
    ) -> Vec<GameEvent> {
        let empty = PlayerInputs::default();
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(dt, &empty, &mut rig.collab()));
        }
        all_events
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Game crates call these from their own #[cfg(test)] modules with a
    // concrete game instance and valid input.

    /// After init() with N players, serialize_state() must return non-empty bytes
    /// and every player must own a body.
    pub fn contract_init_spawns_bodies(
        game: &mut dyn CourtGame,
        rig: &mut TestRig,
        player_count: usize,
    ) {
        let players = make_players(player_count);
        game.init(&players, &default_config(90), &mut rig.collab());
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes after init"
        );
        assert!(
            rig.world.bodies_in(CollisionCategory::PLAYER).len() >= player_count,
            "init must spawn one body per player"
        );
    }

    /// apply_input() with valid data followed by update() must change state.
    pub fn contract_apply_input_changes_state(
        game: &mut dyn CourtGame,
        rig: &mut TestRig,
        valid_input: &[u8],
        player_id: PlayerId,
    ) {
        let before = game.serialize_state();
        game.apply_input(player_id, valid_input);
        game.update(1.0 / 60.0, &PlayerInputs::default(), &mut rig.collab());
        let after = game.serialize_state();
        assert_ne!(
            before, after,
            "State must change after apply_input + update"
        );
    }

    /// pause() must freeze the game, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(game: &mut dyn CourtGame, rig: &mut TestRig) {
        game.pause();
        let before = game.serialize_state();
        game.update(1.0, &PlayerInputs::default(), &mut rig.collab());
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        game.resume();
        game.update(1.0, &PlayerInputs::default(), &mut rig.collab());
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// teardown() must destroy every dynamic body the game created.
    pub fn contract_teardown_releases_bodies(game: &mut dyn CourtGame, rig: &mut TestRig) {
        game.teardown(&mut rig.collab());
        assert_eq!(
            rig.world.dynamic_count(),
            0,
            "teardown must destroy every dynamic body"
        );
        assert!(
            rig.world.bodies.is_empty(),
            "teardown must destroy static bodies too"
        );
    }
}
