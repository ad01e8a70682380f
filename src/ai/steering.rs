//! Path steering - turns "next node to reach" into per-frame intents.
//!
//! Shared by the stalker behavior and the action executor so AI and scripted
//! movement follow paths the same way.

use bevy::prelude::*;

use crate::ai::intents::{ActionIntents, ActionKind};
use crate::ai::moves::MoveKind;
use crate::ai::pathfinding::{NavNode, Path};
use crate::constants::*;
use crate::helpers::axis_toward;
use crate::world::{tile_center, world_to_tile};

/// Body state as the steering layer sees it
#[derive(Clone, Copy, Debug)]
pub struct BodyView {
    /// World-space collision box
    pub bounds: Rect,
    pub on_ground: bool,
    pub grid_size: f32,
}

impl BodyView {
    pub fn feet_y(&self) -> f32 {
        self.bounds.min.y
    }

    pub fn center_x(&self) -> f32 {
        self.bounds.center().x
    }

    /// Tile the body is standing in (column of its center, row of its feet)
    pub fn feet_tile(&self) -> IVec2 {
        world_to_tile(
            Vec2::new(self.center_x(), self.feet_y() + COLLISION_EPSILON),
            self.grid_size,
        )
    }
}

/// Phase of a jump being performed for a Jump node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JumpTracker {
    /// Jump pressed for the current node
    pub issued: bool,
    /// Left the ground since the press
    pub airborne: bool,
    /// Feet cleared the target floor, steering sideways
    pub steering: bool,
}

impl JumpTracker {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Arrived at a node: grounded, same row, column within one
pub fn at_node(body: &BodyView, node: &NavNode) -> bool {
    let tile = body.feet_tile();
    body.on_ground && tile.y == node.row && (tile.x - node.col).abs() <= 1
}

/// Intents that move the body toward `node`.
///
/// Walk nodes steer to the node center. Fall nodes push off the ledge, then
/// steer. Jump nodes line up under the launch column (`prev`), press jump,
/// keep it held, rise in place until the feet clear the target floor, then
/// steer over the target.
pub fn steer_to_node(
    body: &BodyView,
    node: &NavNode,
    prev: Option<&NavNode>,
    jump: &mut JumpTracker,
) -> ActionIntents {
    let g = body.grid_size;
    let dead_zone = ARRIVE_TOLERANCE * g;
    let target_x = tile_center(node.tile(), g).x;
    let mut intents = ActionIntents::neutral();

    match node.move_kind {
        MoveKind::Walk => {
            intents.set_move_x(axis_toward(body.center_x(), target_x, dead_zone));
        }
        MoveKind::Fall => {
            let on_ledge = body.on_ground && body.feet_tile().y > node.row;
            let zone = if on_ledge { 0.0 } else { dead_zone };
            intents.set_move_x(axis_toward(body.center_x(), target_x, zone));
        }
        MoveKind::Jump => {
            if !jump.issued {
                if !body.on_ground {
                    return intents;
                }
                let launch_x = prev
                    .map(|p| tile_center(p.tile(), g).x)
                    .unwrap_or(body.center_x());
                let dir = axis_toward(body.center_x(), launch_x, dead_zone);
                if dir != 0.0 {
                    intents.set_move_x(dir);
                } else {
                    intents.set(ActionKind::Jump);
                    jump.issued = true;
                }
                return intents;
            }

            if !body.on_ground {
                jump.airborne = true;
            } else if jump.airborne {
                // Came down short of the node: release so the next press is fresh
                jump.reset();
                return intents;
            }

            intents.set(ActionKind::Jump);
            let clear_y = (node.row as f32 + JUMP_STEER_CLEARANCE) * g;
            if body.feet_y() >= clear_y {
                jump.steering = true;
            }
            if jump.steering {
                intents.set_move_x(axis_toward(body.center_x(), target_x, dead_zone));
            }
        }
    }

    intents
}

/// Per-controller path bookkeeping: cached path, progress, re-path timing
#[derive(Clone, Debug, Default)]
pub struct PathFollower {
    pub path: Path,
    /// Index of the node being approached
    pub index: usize,
    /// Tile the cached path leads to
    pub goal: Option<IVec2>,
    pub last_repath_frame: Option<u64>,
    pub mode: AiMode,
    pub jump: JumpTracker,
}

/// Controller state machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AiMode {
    #[default]
    Idle,
    Patrol,
    /// Following a path
    Pursuing,
    /// Path exhausted, stale or target moved; searching again
    Repath,
    /// Standing and firing at a visible target
    Engaging,
}

impl std::fmt::Display for AiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiMode::Idle => write!(f, "idle"),
            AiMode::Patrol => write!(f, "patrol"),
            AiMode::Pursuing => write!(f, "pursuing"),
            AiMode::Repath => write!(f, "repath"),
            AiMode::Engaging => write!(f, "engaging"),
        }
    }
}

impl PathFollower {
    pub fn set_path(&mut self, path: Path, goal: IVec2, frame: u64) {
        self.path = path;
        self.index = 0;
        self.goal = Some(goal);
        self.last_repath_frame = Some(frame);
        self.jump.reset();
    }

    /// Drop the cached path (mode is left to the caller)
    pub fn clear(&mut self) {
        self.path = Path::empty();
        self.index = 0;
        self.goal = None;
        self.jump.reset();
    }

    pub fn current_node(&self) -> Option<&NavNode> {
        self.path.get(self.index)
    }

    pub fn previous_node(&self) -> Option<&NavNode> {
        self.index.checked_sub(1).and_then(|i| self.path.get(i))
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.path.len()
    }

    pub fn advance(&mut self) {
        self.index += 1;
        self.jump.reset();
    }

    /// Frames since the last search, if any
    pub fn frames_since_repath(&self, frame: u64) -> Option<u64> {
        self.last_repath_frame.map(|f| frame.saturating_sub(f))
    }

    /// Skip reached nodes and steer toward the next one.
    /// Returns None once the path is exhausted.
    pub fn follow(&mut self, body: &BodyView) -> Option<ActionIntents> {
        while let Some(node) = self.current_node() {
            if at_node(body, node) {
                self.advance();
            } else {
                break;
            }
        }

        let node = *self.current_node()?;
        let prev = self.previous_node().copied();
        Some(steer_to_node(body, &node, prev.as_ref(), &mut self.jump))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_on(tile: IVec2, on_ground: bool) -> BodyView {
        let g = TILE_SIZE;
        let center = Vec2::new((tile.x as f32 + 0.5) * g, tile.y as f32 * g + BODY_SIZE.y / 2.0);
        BodyView {
            bounds: Rect::from_center_size(center, BODY_SIZE),
            on_ground,
            grid_size: g,
        }
    }

    #[test]
    fn test_feet_tile_when_standing() {
        let body = body_on(IVec2::new(3, 2), true);
        assert_eq!(body.feet_tile(), IVec2::new(3, 2));
    }

    #[test]
    fn test_at_node_tolerance() {
        let body = body_on(IVec2::new(3, 1), true);
        let node = |col, row| Path::from_steps(&[(IVec2::new(col, row), MoveKind::Walk)]).nodes[0];
        assert!(at_node(&body, &node(4, 1)));
        assert!(at_node(&body, &node(2, 1)));
        assert!(!at_node(&body, &node(5, 1)));
        assert!(!at_node(&body, &node(3, 2)));
        assert!(!at_node(&body_on(IVec2::new(3, 1), false), &node(3, 1)));
    }

    #[test]
    fn test_jump_node_lines_up_then_jumps() {
        let path = Path::from_steps(&[
            (IVec2::new(5, 1), MoveKind::Walk),
            (IVec2::new(6, 4), MoveKind::Jump),
        ]);
        let mut jump = JumpTracker::default();

        // Two columns left of the launch tile: walk right first
        let intents = steer_to_node(&body_on(IVec2::new(3, 1), true), &path.nodes[1], Some(&path.nodes[0]), &mut jump);
        assert_eq!(intents.move_x(), 1.0);
        assert!(!intents.is_set(ActionKind::Jump));

        // At the launch tile: press jump without moving
        let intents = steer_to_node(&body_on(IVec2::new(5, 1), true), &path.nodes[1], Some(&path.nodes[0]), &mut jump);
        assert!(intents.is_set(ActionKind::Jump));
        assert_eq!(intents.move_x(), 0.0);
        assert!(jump.issued);

        // Rising below the target floor: hold jump, no sideways motion
        let intents = steer_to_node(&body_on(IVec2::new(5, 2), false), &path.nodes[1], Some(&path.nodes[0]), &mut jump);
        assert!(intents.is_set(ActionKind::Jump));
        assert_eq!(intents.move_x(), 0.0);

        // Above the target floor: steer over
        let intents = steer_to_node(&body_on(IVec2::new(5, 5), false), &path.nodes[1], Some(&path.nodes[0]), &mut jump);
        assert!(intents.is_set(ActionKind::Jump));
        assert_eq!(intents.move_x(), 1.0);
    }

    #[test]
    fn test_failed_jump_releases_button() {
        let path = Path::from_steps(&[(IVec2::new(1, 5), MoveKind::Jump)]);
        let mut jump = JumpTracker::default();
        let ground = body_on(IVec2::new(1, 1), true);
        let air = body_on(IVec2::new(1, 1), false);

        assert!(steer_to_node(&ground, &path.nodes[0], None, &mut jump).is_set(ActionKind::Jump));
        assert!(steer_to_node(&air, &path.nodes[0], None, &mut jump).is_set(ActionKind::Jump));
        // Landed back on the start tile
        assert!(steer_to_node(&ground, &path.nodes[0], None, &mut jump).is_neutral());
        assert!(!jump.issued);
    }

    #[test]
    fn test_follow_skips_reached_nodes() {
        let path = Path::from_steps(&[
            (IVec2::new(1, 1), MoveKind::Walk),
            (IVec2::new(2, 1), MoveKind::Walk),
            (IVec2::new(3, 1), MoveKind::Walk),
            (IVec2::new(4, 1), MoveKind::Walk),
        ]);
        let mut follower = PathFollower::default();
        follower.set_path(path, IVec2::new(4, 1), 0);

        let intents = follower.follow(&body_on(IVec2::new(1, 1), true)).unwrap();
        assert_eq!(follower.index, 2);
        assert_eq!(intents.move_x(), 1.0);

        assert!(follower.follow(&body_on(IVec2::new(4, 1), true)).is_none());
        assert!(follower.is_exhausted());
    }
}
