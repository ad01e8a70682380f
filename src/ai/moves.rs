//! Move model shared by the navigation graph and the pathfinder
//!
//! Three primitives connect walkable tiles: walking to an adjacent tile,
//! jumping up or across a gap, and dropping off a ledge.

use bevy::prelude::*;

use crate::ai::capabilities::NavCapabilities;
use crate::tuning::{NavConfig, PhysicsTweaks};
use crate::world::TileOracle;

/// How a path node was reached
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MoveKind {
    #[default]
    Walk,
    Jump,
    Fall,
}

impl std::fmt::Display for MoveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveKind::Walk => write!(f, "walk"),
            MoveKind::Jump => write!(f, "jump"),
            MoveKind::Fall => write!(f, "fall"),
        }
    }
}

/// One outgoing move from a walkable tile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveEdge {
    pub to: IVec2,
    pub kind: MoveKind,
    pub cost: f32,
}

/// Solid footing below, and the tile plus the one above it passable.
/// Off-grid tiles are never walkable. The level edge is solid to physics, so
/// on a level with an open bottom row the row-0 tiles stand on it and are
/// walkable.
pub fn is_walkable<O: TileOracle + ?Sized>(oracle: &O, tile: IVec2) -> bool {
    oracle.in_bounds(tile.x, tile.y)
        && oracle.blocks_movement(tile.x, tile.y - 1)
        && !oracle.blocks_movement(tile.x, tile.y)
        && !oracle.blocks_movement(tile.x, tile.y + 1)
}

/// Edge generator: config limits plus physics-derived jump plausibility
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoveModel {
    pub config: NavConfig,
    pub capabilities: NavCapabilities,
}

impl MoveModel {
    pub fn new(config: NavConfig, tweaks: &PhysicsTweaks) -> Self {
        let capabilities = NavCapabilities::from_tweaks(tweaks, config.arc_speed_factor);
        Self {
            config,
            capabilities,
        }
    }

    /// Jump rise limit in rows for a grid of this size
    pub fn jump_rows<O: TileOracle + ?Sized>(&self, oracle: &O) -> i32 {
        self.config
            .max_jump_height
            .min(self.capabilities.max_jump_rows(oracle.grid_size()))
    }

    /// Jump reach limit in columns: the configured width, capped by how far
    /// a full-speed running jump carries
    pub fn jump_reach<O: TileOracle + ?Sized>(&self, oracle: &O) -> i32 {
        self.config
            .max_jump_width
            .min(self.capabilities.max_jump_columns(oracle.grid_size()))
    }

    /// Fill `out` with every legal move from `from`.
    /// Order is fixed (walks, then jumps by rise and reach, then falls) so
    /// searches stay deterministic.
    pub fn neighbors<O: TileOracle + ?Sized>(&self, oracle: &O, from: IVec2, out: &mut Vec<MoveEdge>) {
        out.clear();
        if !is_walkable(oracle, from) {
            return;
        }
        self.walk_edges(oracle, from, out);
        self.jump_edges(oracle, from, out);
        self.fall_edges(oracle, from, out);
    }

    /// True if `to` is reachable from `from` in one move of `kind`
    pub fn is_legal<O: TileOracle + ?Sized>(
        &self,
        oracle: &O,
        from: IVec2,
        to: IVec2,
        kind: MoveKind,
    ) -> bool {
        let mut edges = Vec::new();
        self.neighbors(oracle, from, &mut edges);
        edges.iter().any(|e| e.to == to && e.kind == kind)
    }

    fn walk_edges<O: TileOracle + ?Sized>(&self, oracle: &O, from: IVec2, out: &mut Vec<MoveEdge>) {
        for dx in [-1, 1] {
            let to = from + IVec2::new(dx, 0);
            if is_walkable(oracle, to) {
                out.push(MoveEdge {
                    to,
                    kind: MoveKind::Walk,
                    cost: self.config.walk_cost,
                });
            }
        }
    }

    fn jump_edges<O: TileOracle + ?Sized>(&self, oracle: &O, from: IVec2, out: &mut Vec<MoveEdge>) {
        let max_rise = self.jump_rows(oracle);
        let max_reach = self.jump_reach(oracle);

        for dy in 0..=max_rise {
            for reach in 1..=max_reach {
                for dx in [-reach, reach] {
                    let to = from + IVec2::new(dx, dy);
                    if !is_walkable(oracle, to) {
                        continue;
                    }
                    // Same-row jumps only make sense across a gap
                    if dy == 0 && (reach < 2 || walk_connected(oracle, from, to)) {
                        continue;
                    }
                    if !self.capabilities.jump_arc_clear(oracle, from, to) {
                        continue;
                    }
                    out.push(MoveEdge {
                        to,
                        kind: MoveKind::Jump,
                        cost: self.config.jump_cost_base + (reach + dy) as f32,
                    });
                }
            }
        }
    }

    fn fall_edges<O: TileOracle + ?Sized>(&self, oracle: &O, from: IVec2, out: &mut Vec<MoveEdge>) {
        for dx in [-1, 1] {
            let side = from.x + dx;
            // Step off sideways: both body tiles beside us must be open
            if oracle.blocks_movement(side, from.y) || oracle.blocks_movement(side, from.y + 1) {
                continue;
            }
            for depth in 1..=self.config.max_fall_depth {
                let row = from.y - depth;
                if oracle.blocks_movement(side, row) {
                    // Depth 1 here means the side tile is walkable (a walk edge)
                    break;
                }
                let to = IVec2::new(side, row);
                if is_walkable(oracle, to) {
                    out.push(MoveEdge {
                        to,
                        kind: MoveKind::Fall,
                        cost: self.config.fall_cost_base + depth as f32,
                    });
                    break;
                }
            }
        }
    }
}

/// Every tile between `a` and `b` on their shared row is walkable
fn walk_connected<O: TileOracle + ?Sized>(oracle: &O, a: IVec2, b: IVec2) -> bool {
    let (lo, hi) = (a.x.min(b.x), a.x.max(b.x));
    (lo..=hi).all(|col| is_walkable(oracle, IVec2::new(col, a.y)))
}
