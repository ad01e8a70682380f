//! AI controller - owns an enemy's behavior and feeds its intents to physics

use bevy::prelude::*;

use crate::ai::InputState;
use crate::ai::behavior::{Behavior, BehaviorContext, NavServices, create_behavior};
use crate::ai::intents::{ActionIntents, ActionKind};
use crate::ai::navigation::NavGraph;
use crate::ai::pathfinding::Pathfinder;
use crate::ai::profiles::AiProfile;
use crate::ai::steering::{AiMode, PathFollower};
use crate::constants::*;
use crate::levels::TileLevel;
use crate::player::{KinematicBody, Player};
use crate::world::TileOracle;

/// Monotonic fixed-step frame counter used for AI throttling
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct FrameCounter(pub u64);

/// Advance the frame counter once per fixed step
pub fn tick_frame_counter(mut frame: ResMut<FrameCounter>) {
    frame.0 += 1;
}

/// Per-enemy controller. Calls its behavior once per frame and remembers the
/// last intents so jump presses can be edge-detected.
#[derive(Component)]
pub struct AiController {
    behavior: Box<dyn Behavior>,
    pub follower: PathFollower,
    last_intents: ActionIntents,
}

impl AiController {
    pub fn new(behavior: Box<dyn Behavior>) -> Self {
        Self {
            behavior,
            follower: PathFollower::default(),
            last_intents: ActionIntents::neutral(),
        }
    }

    pub fn from_profile(profile: &AiProfile, seed: u64) -> Self {
        Self::new(create_behavior(profile, seed))
    }

    pub fn update(&mut self, ctx: &BehaviorContext, nav: Option<NavServices<'_>>) -> ActionIntents {
        let intents = self.behavior.update(ctx, &mut self.follower, nav);
        self.last_intents = intents;
        intents
    }

    /// Intents produced by the last update
    pub fn intents(&self) -> ActionIntents {
        self.last_intents
    }

    pub fn mode(&self) -> AiMode {
        self.follower.mode
    }

    pub fn behavior_name(&self) -> &str {
        self.behavior.name()
    }
}

/// Translate intents into the input buffer the physics step reads.
/// A jump press only buffers on its rising edge; holding keeps `jump_held`.
pub fn apply_intents(intents: &ActionIntents, previous: &ActionIntents, input: &mut InputState) {
    input.move_x = intents.move_x();

    let jump = intents.is_set(ActionKind::Jump);
    if jump && !previous.is_set(ActionKind::Jump) {
        input.jump_buffer_timer = JUMP_BUFFER_TIME;
    }
    input.jump_held = jump;

    if intents.is_set(ActionKind::Shoot) {
        input.shoot_pressed = true;
        input.aim_x = intents.value(ActionKind::AimX).unwrap_or(0.0);
    }
}

/// Run every enemy's behavior against the player and write the result into
/// its InputState. Navigation is withheld until the graph matches the level.
pub fn ai_controller_update(
    frame: Res<FrameCounter>,
    level: Res<TileLevel>,
    nav_graph: Res<NavGraph>,
    pathfinder: Res<Pathfinder>,
    players: Query<&KinematicBody, (With<Player>, Without<AiController>)>,
    mut enemies: Query<(&mut AiController, &KinematicBody, &mut InputState)>,
) {
    let nav_ready = nav_graph.is_built()
        && nav_graph.built_for_level.as_deref() == Some(level.name.as_str());
    let nav = nav_ready.then_some(NavServices {
        graph: &nav_graph,
        pathfinder: &pathfinder,
        oracle: &*level,
    });
    let target = players.iter().next().map(|body| body.bounds());
    let grid_size = level.grid_size();

    for (mut controller, body, mut input) in &mut enemies {
        let ctx = BehaviorContext {
            body: body.view(grid_size),
            frame: frame.0,
            target,
        };
        let previous = controller.intents();
        let intents = controller.update(&ctx, nav);
        apply_intents(&intents, &previous, &mut input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_buffers_on_rising_edge_only() {
        let mut input = InputState::default();
        let mut jump = ActionIntents::neutral();
        jump.set(ActionKind::Jump);

        apply_intents(&jump, &ActionIntents::neutral(), &mut input);
        assert_eq!(input.jump_buffer_timer, JUMP_BUFFER_TIME);
        assert!(input.jump_held);

        // Physics consumed the press; holding does not re-buffer
        input.jump_buffer_timer = 0.0;
        apply_intents(&jump, &jump, &mut input);
        assert_eq!(input.jump_buffer_timer, 0.0);
        assert!(input.jump_held);

        apply_intents(&ActionIntents::neutral(), &jump, &mut input);
        assert!(!input.jump_held);
    }

    #[test]
    fn test_shoot_sets_aim() {
        let mut input = InputState::default();
        let mut intents = ActionIntents::neutral();
        intents.set(ActionKind::Shoot).set_value(ActionKind::AimX, -0.5);
        intents.set_move_x(1.0);

        apply_intents(&intents, &ActionIntents::neutral(), &mut input);
        assert!(input.shoot_pressed);
        assert_eq!(input.aim_x, -0.5);
        assert_eq!(input.move_x, 1.0);
    }

    #[test]
    fn test_controller_without_nav_stays_idle() {
        let mut controller = AiController::from_profile(&AiProfile::default(), 0);
        let ctx = BehaviorContext {
            body: KinematicBody::at_tile(IVec2::new(1, 1), TILE_SIZE).view(TILE_SIZE),
            frame: 0,
            target: Some(KinematicBody::at_tile(IVec2::new(5, 1), TILE_SIZE).bounds()),
        };
        assert!(controller.update(&ctx, None).is_neutral());
        assert_eq!(controller.mode(), AiMode::Idle);
        assert_eq!(controller.behavior_name(), "stalker");
    }
}
