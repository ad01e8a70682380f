//! Simulation control - entities the action executor can drive
//!
//! The executor never integrates physics itself. It writes an InputState and
//! asks the simulation to advance one fixed frame, so the body moves exactly
//! as it would under a player's hands.

use bevy::prelude::*;

use crate::ai::{BodyView, InputState};
use crate::constants::*;
use crate::player::KinematicBody;
use crate::tuning::PhysicsTweaks;
use crate::world::TileOracle;

use super::app_builder::step_frame;

/// A simulated body under direct input control
pub trait ControlledSim {
    /// Current body state, None if the body no longer exists
    fn body_view(&self) -> Option<BodyView>;

    fn input_state(&self) -> InputState;

    fn set_input_state(&mut self, input: InputState);

    /// Advance the simulation by one fixed frame
    fn step_frame(&mut self);
}

/// Single body stepped directly against a tile oracle (no ECS)
pub struct BodySim<O: TileOracle> {
    oracle: O,
    pub body: KinematicBody,
    pub input: InputState,
    pub tweaks: PhysicsTweaks,
    frames: u64,
}

impl<O: TileOracle> BodySim<O> {
    pub fn new(oracle: O, body: KinematicBody) -> Self {
        Self {
            oracle,
            body,
            input: InputState::default(),
            tweaks: PhysicsTweaks::default(),
            frames: 0,
        }
    }

    /// Standard body standing on `tile`
    pub fn at_tile(oracle: O, tile: IVec2) -> Self {
        let grid_size = oracle.grid_size();
        Self::new(oracle, KinematicBody::at_tile(tile, grid_size))
    }

    /// Frames stepped so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

impl<O: TileOracle> ControlledSim for BodySim<O> {
    fn body_view(&self) -> Option<BodyView> {
        Some(self.body.view(self.oracle.grid_size()))
    }

    fn input_state(&self) -> InputState {
        self.input.clone()
    }

    fn set_input_state(&mut self, input: InputState) {
        self.input = input;
    }

    fn step_frame(&mut self) {
        self.body
            .step(&mut self.input, &self.tweaks, &self.oracle, FIXED_DT);
        // No weapon here; shots are simply dropped
        self.input.shoot_pressed = false;
        self.frames += 1;
    }
}

/// An entity inside a headless app. Each step runs the app's full frame, so
/// AI controllers and every other body move along with it.
pub struct AppSim<'a> {
    app: &'a mut App,
    entity: Entity,
}

impl<'a> AppSim<'a> {
    pub fn new(app: &'a mut App, entity: Entity) -> Self {
        Self { app, entity }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }
}

impl ControlledSim for AppSim<'_> {
    fn body_view(&self) -> Option<BodyView> {
        let world = self.app.world();
        let level = world.get_resource::<crate::levels::TileLevel>()?;
        let body = world.get::<KinematicBody>(self.entity)?;
        Some(body.view(level.grid_size()))
    }

    fn input_state(&self) -> InputState {
        self.app
            .world()
            .get::<InputState>(self.entity)
            .cloned()
            .unwrap_or_default()
    }

    fn set_input_state(&mut self, input: InputState) {
        if let Some(mut state) = self.app.world_mut().get_mut::<InputState>(self.entity) {
            *state = input;
        }
    }

    fn step_frame(&mut self) {
        step_frame(self.app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::TileLevel;

    #[test]
    fn test_body_sim_steps_with_input() {
        let level = TileLevel::from_ascii(
            "flat",
            "######\n\
             ......\n\
             ......\n\
             ######",
        )
        .unwrap();
        let mut sim = BodySim::at_tile(level, IVec2::new(1, 1));
        sim.set_input_state(InputState {
            move_x: 1.0,
            ..default()
        });
        let start_x = sim.body.center.x;
        for _ in 0..10 {
            sim.step_frame();
        }
        assert_eq!(sim.frames(), 10);
        assert!(sim.body.center.x > start_x);
        assert!(sim.body_view().unwrap().on_ground);
    }
}
