//! Body physics - input, gravity and tile collision

use bevy::prelude::*;

use crate::ai::InputState;
use crate::constants::*;
use crate::helpers::*;
use crate::levels::TileLevel;
use crate::player::components::*;
use crate::tuning::PhysicsTweaks;
use crate::world::{TileOracle, rect_hits_solid};

impl KinematicBody {
    /// Advance one physics step: input, gravity, then move and collide
    pub fn step<O: TileOracle + ?Sized>(
        &mut self,
        input: &mut InputState,
        tweaks: &PhysicsTweaks,
        oracle: &O,
        dt: f32,
    ) {
        self.apply_input(input, tweaks, dt);
        self.apply_gravity(tweaks, dt);
        self.move_and_collide(oracle, dt);
    }

    fn apply_input(&mut self, input: &mut InputState, tweaks: &PhysicsTweaks, dt: f32) {
        let move_x = input.move_x;

        // Acceleration-based horizontal movement
        let target_speed = move_x * tweaks.move_speed;
        let current_speed = self.velocity.x;

        // Determine if accelerating (toward input) or decelerating (stopping/reversing)
        let has_input = move_x.abs() > STICK_DEADZONE;
        let same_direction =
            target_speed.signum() == current_speed.signum() || current_speed.abs() < 1.0;
        let is_accelerating = has_input && same_direction;

        let rate = match (self.grounded, is_accelerating) {
            (true, true) => tweaks.ground_accel,
            (true, false) => tweaks.ground_decel,
            (false, true) => tweaks.air_accel,
            (false, false) => tweaks.air_decel,
        };
        self.velocity.x = move_toward(current_speed, target_speed, rate * dt);

        // Facing follows input, not velocity
        if move_x > STICK_DEADZONE {
            self.facing = 1.0;
        } else if move_x < -STICK_DEADZONE {
            self.facing = -1.0;
        }

        if self.grounded {
            self.coyote = COYOTE_TIME;
            self.jumping = false;
        } else {
            self.coyote = (self.coyote - dt).max(0.0);
        }

        // Can jump if grounded OR within coyote time
        let can_jump = self.grounded || self.coyote > 0.0;
        if input.jump_buffer_timer > 0.0 && can_jump {
            self.velocity.y = tweaks.jump_velocity;
            input.jump_buffer_timer = 0.0;
            self.coyote = 0.0; // No double jump off coyote time
            self.jumping = true;
            self.grounded = false;
        }
        input.jump_buffer_timer = (input.jump_buffer_timer - dt).max(0.0);

        // Variable jump height: cut velocity if button released while rising
        if self.jumping && self.velocity.y > 0.0 && !input.jump_held {
            self.velocity.y *= JUMP_CUT_MULTIPLIER;
            self.jumping = false; // Only cut once per jump
        }
    }

    fn apply_gravity(&mut self, tweaks: &PhysicsTweaks, dt: f32) {
        if self.grounded {
            return;
        }
        // Fast fall: use higher gravity when falling than rising
        let gravity = if self.velocity.y > 0.0 {
            tweaks.gravity_rise
        } else {
            tweaks.gravity_fall
        };
        self.velocity.y = (self.velocity.y - gravity * dt).max(-tweaks.max_fall_speed);
    }

    /// Axis-separated movement. Each axis snaps flush against the tile it ran
    /// into. Speeds stay below one tile per step, so the leading edge is the
    /// only place an overlap can start.
    fn move_and_collide<O: TileOracle + ?Sized>(&mut self, oracle: &O, dt: f32) {
        let g = oracle.grid_size();
        let half = self.size / 2.0;

        let dx = self.velocity.x * dt;
        if dx != 0.0 {
            self.center.x += dx;
            if rect_hits_solid(oracle, self.bounds(), COLLISION_EPSILON) {
                if dx > 0.0 {
                    let col = ((self.center.x + half.x - COLLISION_EPSILON) / g).floor();
                    self.center.x = col * g - half.x;
                } else {
                    let col = ((self.center.x - half.x + COLLISION_EPSILON) / g).floor();
                    self.center.x = (col + 1.0) * g + half.x;
                }
                self.velocity.x = 0.0;
            }
        }

        let dy = self.velocity.y * dt;
        if dy != 0.0 {
            self.center.y += dy;
            if rect_hits_solid(oracle, self.bounds(), COLLISION_EPSILON) {
                if dy < 0.0 {
                    // Landed
                    let row = ((self.center.y - half.y + COLLISION_EPSILON) / g).floor();
                    self.center.y = (row + 1.0) * g + half.y;
                } else {
                    // Head bump
                    let row = ((self.center.y + half.y - COLLISION_EPSILON) / g).floor();
                    self.center.y = row * g - half.y;
                }
                self.velocity.y = 0.0;
            }
        }

        // Floor probe: a one-unit strip under the feet
        self.grounded = if self.velocity.y <= 0.0 {
            let bounds = self.bounds();
            let probe = Rect::new(bounds.min.x, bounds.min.y - 1.0, bounds.max.x, bounds.min.y);
            rect_hits_solid(oracle, probe, COLLISION_EPSILON)
        } else {
            false
        };
        if self.grounded {
            self.velocity.y = 0.0;
        }
    }
}

/// Runs in FixedUpdate to move every body from its InputState.
/// Shots are consumed here and recorded on the body's Weapon.
pub fn step_bodies(
    time: Res<Time>,
    tweaks: Res<PhysicsTweaks>,
    level: Res<TileLevel>,
    mut bodies: Query<(Entity, &mut KinematicBody, &mut InputState, Option<&mut Weapon>)>,
) {
    let dt = time.delta_secs();
    for (entity, mut body, mut input, weapon) in &mut bodies {
        body.step(&mut input, &tweaks, &*level, dt);

        if input.shoot_pressed {
            input.shoot_pressed = false;
            debug!("{:?} fired, aim_x {:.2}", entity, input.aim_x);
            if let Some(mut weapon) = weapon {
                weapon.shots_fired += 1;
                weapon.last_aim_x = input.aim_x;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "\
        ##########\n\
        ..........\n\
        ..........\n\
        ..........\n\
        ..........\n\
        ..........\n\
        ..........\n\
        ..........\n\
        ..........\n\
        .....#....\n\
        .....#....\n\
        ##########";

    fn room() -> TileLevel {
        TileLevel::from_ascii("room", ROOM).unwrap()
    }

    fn run(body: &mut KinematicBody, input: &mut InputState, level: &TileLevel, frames: usize) {
        let tweaks = PhysicsTweaks::default();
        for _ in 0..frames {
            body.step(input, &tweaks, level, FIXED_DT);
        }
    }

    #[test]
    fn test_body_falls_and_lands() {
        let level = room();
        let mut body = KinematicBody::new(Vec2::new(24.0, 100.0), BODY_SIZE);
        let mut input = InputState::default();
        run(&mut body, &mut input, &level, 120);
        assert!(body.grounded);
        // Settles within the collision skin of the floor top
        assert!((body.bounds().min.y - 16.0).abs() < COLLISION_EPSILON);
        assert_eq!(body.feet_tile(TILE_SIZE), IVec2::new(1, 1));
    }

    #[test]
    fn test_walk_accelerates_to_move_speed() {
        let level = room();
        let mut body = KinematicBody::at_tile(IVec2::new(0, 1), TILE_SIZE);
        let mut input = InputState {
            move_x: 1.0,
            ..default()
        };
        run(&mut body, &mut input, &level, 10);
        assert!(body.grounded);
        assert_eq!(body.velocity.x, MOVE_SPEED);
        assert!(body.center.x > 8.0);
    }

    #[test]
    fn test_wall_stops_body() {
        let level = room();
        let mut body = KinematicBody::at_tile(IVec2::new(2, 1), TILE_SIZE);
        let mut input = InputState {
            move_x: 1.0,
            ..default()
        };
        run(&mut body, &mut input, &level, 60);
        // Column 5 starts at x = 80
        assert_eq!(body.bounds().max.x, 80.0);
        assert!(body.grounded);
    }

    #[test]
    fn test_full_jump_height() {
        let level = room();
        let mut body = KinematicBody::at_tile(IVec2::new(1, 1), TILE_SIZE);
        let mut input = InputState {
            jump_buffer_timer: JUMP_BUFFER_TIME,
            jump_held: true,
            ..default()
        };
        let tweaks = PhysicsTweaks::default();
        let mut peak: f32 = 0.0;
        for _ in 0..90 {
            body.step(&mut input, &tweaks, &level, FIXED_DT);
            peak = peak.max(body.bounds().min.y - 16.0);
        }
        assert!(peak > 72.0 && peak <= 81.0, "peak {}", peak);
        assert!(body.grounded);
    }

    #[test]
    fn test_released_jump_is_cut_short() {
        let level = room();
        let mut body = KinematicBody::at_tile(IVec2::new(1, 1), TILE_SIZE);
        let mut input = InputState {
            jump_buffer_timer: JUMP_BUFFER_TIME,
            jump_held: false,
            ..default()
        };
        let tweaks = PhysicsTweaks::default();
        let mut peak: f32 = 0.0;
        for _ in 0..60 {
            body.step(&mut input, &tweaks, &level, FIXED_DT);
            peak = peak.max(body.bounds().min.y - 16.0);
        }
        assert!(peak < 20.0, "peak {}", peak);
    }

    #[test]
    fn test_jump_buffer_expires() {
        let level = room();
        let mut body = KinematicBody::new(Vec2::new(24.0, 120.0), BODY_SIZE);
        let mut input = InputState {
            jump_buffer_timer: JUMP_BUFFER_TIME,
            jump_held: true,
            ..default()
        };
        // Still airborne when the buffer runs out
        run(&mut body, &mut input, &level, 10);
        assert_eq!(input.jump_buffer_timer, 0.0);
        run(&mut body, &mut input, &level, 60);
        assert!(body.grounded);
        assert_eq!(body.velocity.y, 0.0);
    }
}
