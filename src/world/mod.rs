//! Tile world queries shared by navigation and physics
//!
//! Navigation never stores tile data itself. Everything it knows about a level
//! comes through [`TileOracle`], implemented by the level/collision subsystem.

use bevy::prelude::*;

/// Kind of a single grid cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TileKind {
    #[default]
    Empty,
    /// Thin vertical wall segment
    Wall,
    /// Solid block
    FullBlock,
}

impl TileKind {
    pub fn is_solid(self) -> bool {
        !matches!(self, TileKind::Empty)
    }
}

/// Read-only view of a level's collision grid.
///
/// Rows increase upward. Queries outside `0..columns()` / `0..rows()` must
/// return `false` rather than panic.
pub trait TileOracle {
    fn is_wall_tile(&self, col: i32, row: i32) -> bool;

    fn is_full_block_tile(&self, col: i32, row: i32) -> bool;

    /// Anything an entity can stand on
    fn is_floor_tile(&self, col: i32, row: i32) -> bool {
        self.is_wall_tile(col, row) || self.is_full_block_tile(col, row)
    }

    /// World units per tile edge
    fn grid_size(&self) -> f32;

    fn columns(&self) -> i32;

    fn rows(&self) -> i32;

    fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && col < self.columns() && row < self.rows()
    }

    /// Solid for movement purposes. The level edge counts as solid.
    fn blocks_movement(&self, col: i32, row: i32) -> bool {
        !self.in_bounds(col, row) || self.is_floor_tile(col, row)
    }
}

/// Tile containing a world-space point
pub fn world_to_tile(pos: Vec2, grid_size: f32) -> IVec2 {
    IVec2::new(
        (pos.x / grid_size).floor() as i32,
        (pos.y / grid_size).floor() as i32,
    )
}

/// World-space center of a tile
pub fn tile_center(tile: IVec2, grid_size: f32) -> Vec2 {
    Vec2::new(
        (tile.x as f32 + 0.5) * grid_size,
        (tile.y as f32 + 0.5) * grid_size,
    )
}

/// True if an axis-aligned box overlaps any movement-blocking tile.
/// Edges that merely touch a tile do not count.
pub fn rect_hits_solid<O: TileOracle + ?Sized>(oracle: &O, rect: Rect, epsilon: f32) -> bool {
    let g = oracle.grid_size();
    let min_col = ((rect.min.x + epsilon) / g).floor() as i32;
    let max_col = ((rect.max.x - epsilon) / g).floor() as i32;
    let min_row = ((rect.min.y + epsilon) / g).floor() as i32;
    let max_row = ((rect.max.y - epsilon) / g).floor() as i32;

    for row in min_row..=max_row {
        for col in min_col..=max_col {
            if oracle.blocks_movement(col, row) {
                return true;
            }
        }
    }
    false
}
