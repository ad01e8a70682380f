//! Body components shared by the player and enemies

use bevy::prelude::*;

use crate::ai::BodyView;
use crate::constants::*;
use crate::world::world_to_tile;

/// Marker for the player entity (the target enemies hunt)
#[derive(Component)]
pub struct Player;

/// Marker for enemy entities spawned from level data
#[derive(Component, Debug, Clone)]
pub struct Enemy {
    /// Profile the enemy was spawned with
    pub profile: String,
}

/// Axis-aligned platformer body integrated by the fixed-step physics
#[derive(Component, Clone, Debug, PartialEq)]
pub struct KinematicBody {
    pub center: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    /// Whether the body is on ground
    pub grounded: bool,
    /// Tracks if currently in a jump (for variable height)
    pub jumping: bool,
    /// Time remaining for coyote jump (seconds after leaving ground you can still jump)
    pub coyote: f32,
    /// Direction the body faces (-1.0 = left, 1.0 = right)
    pub facing: f32,
}

impl KinematicBody {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            size,
            velocity: Vec2::ZERO,
            grounded: false,
            jumping: false,
            coyote: 0.0,
            facing: 1.0,
        }
    }

    /// Standard-size body standing on `tile` (feet on the tile's bottom edge)
    pub fn at_tile(tile: IVec2, grid_size: f32) -> Self {
        let center = Vec2::new(
            (tile.x as f32 + 0.5) * grid_size,
            tile.y as f32 * grid_size + BODY_SIZE.y / 2.0,
        );
        Self {
            grounded: true,
            coyote: COYOTE_TIME,
            ..Self::new(center, BODY_SIZE)
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, self.size)
    }

    pub fn feet_tile(&self, grid_size: f32) -> IVec2 {
        world_to_tile(
            Vec2::new(self.center.x, self.center.y - self.size.y / 2.0 + COLLISION_EPSILON),
            grid_size,
        )
    }

    /// What the steering layer gets to see
    pub fn view(&self, grid_size: f32) -> BodyView {
        BodyView {
            bounds: self.bounds(),
            on_ground: self.grounded,
            grid_size,
        }
    }
}

/// Shot bookkeeping for enemies that can fire. Projectiles themselves live
/// outside this crate; the body step only records the trigger pulls.
#[derive(Component, Default, Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub shots_fired: u32,
    pub last_aim_x: f32,
}
