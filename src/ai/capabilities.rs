//! Navigation capabilities - precomputed physics values and the jump-arc sampler.
//!
//! This module provides a single source of truth for physics-derived values.
//! The move model queries it instead of computing physics formulas.

use bevy::prelude::*;

use crate::constants::*;
use crate::tuning::PhysicsTweaks;
use crate::world::{TileOracle, rect_hits_solid, tile_center};

/// Upper bound on sampler steps (10 seconds of flight)
const ARC_MAX_SAMPLES: usize = 600;

/// Precomputed physics capabilities for navigation.
/// Rebuilt whenever the physics tweaks change.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct NavCapabilities {
    /// Maximum height reachable with a full jump (v²/2g)
    pub max_jump_height: f32,
    /// Horizontal distance covered at full run during a max height jump
    /// (up and down)
    pub max_jump_reach: f32,
    /// Horizontal speed assumed by the arc sampler
    pub arc_speed: f32,
    pub body_size: Vec2,
    gravity_rise: f32,
    gravity_fall: f32,
    jump_velocity: f32,
    max_fall_speed: f32,
}

impl Default for NavCapabilities {
    fn default() -> Self {
        Self::from_tweaks(&PhysicsTweaks::default(), ARC_SPEED_FACTOR)
    }
}

impl NavCapabilities {
    pub fn from_tweaks(tweaks: &PhysicsTweaks, arc_speed_factor: f32) -> Self {
        // h = v²/(2g) using rise gravity
        let max_jump_height =
            tweaks.jump_velocity * tweaks.jump_velocity / (2.0 * tweaks.gravity_rise);
        let time_to_peak = tweaks.jump_velocity / tweaks.gravity_rise;
        // Fall time is shorter due to the higher fall gravity
        let fall_time = (2.0 * max_jump_height / tweaks.gravity_fall).sqrt();
        let max_jump_reach = tweaks.move_speed * (time_to_peak + fall_time);

        Self {
            max_jump_height,
            max_jump_reach,
            arc_speed: tweaks.move_speed * arc_speed_factor,
            body_size: BODY_SIZE,
            gravity_rise: tweaks.gravity_rise,
            gravity_fall: tweaks.gravity_fall,
            jump_velocity: tweaks.jump_velocity,
            max_fall_speed: tweaks.max_fall_speed,
        }
    }

    /// Whole columns a running jump can cover
    pub fn max_jump_columns(&self, grid_size: f32) -> i32 {
        (self.max_jump_reach / grid_size).floor().max(0.0) as i32
    }

    /// Whole rows a jump can climb while keeping steering clearance
    pub fn max_jump_rows(&self, grid_size: f32) -> i32 {
        ((self.max_jump_height / grid_size) - JUMP_STEER_CLEARANCE).floor().max(0.0) as i32
    }

    /// Sample a "rise in place, then steer" jump from the center of `from` to
    /// the center of `to` at the fixed tick rate.
    ///
    /// The body holds jump for the whole arc, rises without horizontal motion
    /// until its feet clear the target floor, then moves toward the target
    /// column at `arc_speed`. A head bump stops the rise the way body physics
    /// does; any other overlap with a blocking tile rejects the jump. Succeeds
    /// when the body comes down onto the target floor aligned with the target
    /// column.
    pub fn jump_arc_clear<O: TileOracle + ?Sized>(&self, oracle: &O, from: IVec2, to: IVec2) -> bool {
        let g = oracle.grid_size();
        let half = self.body_size / 2.0;
        let target_x = tile_center(to, g).x;
        let floor_y = to.y as f32 * g;
        let steer_y = floor_y + JUMP_STEER_CLEARANCE * g;

        let mut pos = Vec2::new(tile_center(from, g).x, from.y as f32 * g + half.y);
        let dir = (target_x - pos.x).signum();
        let mut vy = self.jump_velocity;
        let mut steering = false;
        let mut aligned = dir == 0.0;

        for _ in 0..ARC_MAX_SAMPLES {
            if !steering && pos.y - half.y >= steer_y {
                steering = true;
            }

            let gravity = if vy > 0.0 {
                self.gravity_rise
            } else {
                self.gravity_fall
            };
            vy = (vy - gravity * FIXED_DT).max(-self.max_fall_speed);

            if steering && !aligned {
                pos.x += dir * self.arc_speed * FIXED_DT;
                if dir * (pos.x - target_x) >= 0.0 {
                    pos.x = target_x;
                    aligned = true;
                }
                if rect_hits_solid(oracle, Rect::from_center_size(pos, self.body_size), COLLISION_EPSILON) {
                    return false;
                }
            }
            pos.y += vy * FIXED_DT;

            let feet = pos.y - half.y;
            if vy <= 0.0 && feet <= floor_y {
                // Came back down: only a landing on the target floor counts
                return aligned && steering;
            }

            let body = Rect::from_center_size(pos, self.body_size);
            if rect_hits_solid(oracle, body, COLLISION_EPSILON) {
                if vy <= 0.0 {
                    return false;
                }
                // Head bump: stop under the ceiling like the body physics does
                let ceiling_row = ((body.max.y - COLLISION_EPSILON) / g).floor();
                pos.y = ceiling_row * g - half.y;
                vy = 0.0;
                if rect_hits_solid(oracle, Rect::from_center_size(pos, self.body_size), COLLISION_EPSILON) {
                    return false;
                }
            }
        }

        false
    }
}
