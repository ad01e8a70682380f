//! AI module - navigation, pathfinding and enemy decision making

mod behavior;
mod capabilities;
mod controller;
mod intents;
mod moves;
mod navigation;
mod pathfinding;
mod profiles;
mod steering;

pub use behavior::*;
pub use capabilities::*;
pub use controller::*;
pub use intents::*;
pub use moves::*;
pub use navigation::*;
pub use pathfinding::*;
pub use profiles::*;
pub use steering::*;

use bevy::prelude::*;

/// Per-entity input buffer used by physics systems.
/// AI controllers and the action executor write here; the body step reads it.
#[derive(Component, Default, Clone, Debug, PartialEq)]
pub struct InputState {
    pub move_x: f32,
    /// Seconds a jump press stays buffered
    pub jump_buffer_timer: f32,
    pub jump_held: bool,
    /// Consumed by the body step
    pub shoot_pressed: bool,
    pub aim_x: f32,
}

impl InputState {
    /// Release every key
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    /// No key down and no press pending
    pub fn is_neutral(&self) -> bool {
        self.move_x == 0.0
            && self.jump_buffer_timer <= 0.0
            && !self.jump_held
            && !self.shoot_pressed
    }
}
