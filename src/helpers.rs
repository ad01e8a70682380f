//! Utility functions for platform_nav

use bevy::prelude::*;

/// Move a value toward a target by a maximum delta
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Direction (-1, 0 or 1) to travel from `current` to reach `target`.
/// Returns 0 inside the dead zone.
pub fn axis_toward(current: f32, target: f32, dead_zone: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= dead_zone {
        0.0
    } else {
        diff.signum()
    }
}

/// Chebyshev (king-move) distance between two tiles
pub fn chebyshev(a: IVec2, b: IVec2) -> i32 {
    let d = (a - b).abs();
    d.x.max(d.y)
}

/// Tiles on the Bresenham line from `from` to `to`, both ends included
pub fn tile_line(from: IVec2, to: IVec2) -> Vec<IVec2> {
    let mut tiles = Vec::new();
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut cur = from;

    loop {
        tiles.push(cur);
        if cur == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cur.x += sx;
        }
        if e2 <= dx {
            err += dx;
            cur.y += sy;
        }
    }
    tiles
}
