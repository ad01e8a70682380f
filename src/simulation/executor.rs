//! Action executor - drives a simulated body along a precomputed path
//!
//! The executor owns the frame loop: each frame it steers toward the current
//! node, writes the resulting keys into the body's InputState and steps the
//! simulation. It stops on arrival at the last node, when a node's frame
//! budget runs out, or when the global frame cap is hit. Keys are released on
//! every exit.

use bevy::prelude::*;

use crate::ai::{
    ActionIntents, InputState, MoveKind, Path, PathFollower, apply_intents, at_node, steer_to_node,
};
use crate::constants::*;

use super::control::ControlledSim;

/// How an execution ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecuteOutcome {
    Success,
    /// Node at this index ran out of frames
    StuckAt(usize),
    /// Global frame cap reached
    Timeout,
}

impl std::fmt::Display for ExecuteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteOutcome::Success => write!(f, "success"),
            ExecuteOutcome::StuckAt(index) => write!(f, "stuck_at_{}", index),
            ExecuteOutcome::Timeout => write!(f, "timeout"),
        }
    }
}

/// Result record of one execution
#[derive(Clone, Debug, PartialEq)]
pub struct ExecuteResult {
    pub success: bool,
    pub frames_used: u32,
    /// Nodes reached before the run ended
    pub nodes_completed: usize,
    pub outcome: ExecuteOutcome,
}

impl ExecuteResult {
    /// "success", "stuck_at_N" or "timeout"
    pub fn reason(&self) -> String {
        self.outcome.to_string()
    }
}

/// Frames allowed per node, by the move that reaches it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeBudgets {
    pub walk: u32,
    pub jump: u32,
    pub fall: u32,
}

impl Default for NodeBudgets {
    fn default() -> Self {
        Self {
            walk: WALK_NODE_BUDGET_FRAMES,
            jump: JUMP_NODE_BUDGET_FRAMES,
            fall: FALL_NODE_BUDGET_FRAMES,
        }
    }
}

impl NodeBudgets {
    pub fn for_kind(&self, kind: MoveKind) -> u32 {
        match kind {
            MoveKind::Walk => self.walk,
            MoveKind::Jump => self.jump,
            MoveKind::Fall => self.fall,
        }
    }
}

/// Execute `path` with the default per-node budgets
pub fn execute_path<S: ControlledSim>(sim: &mut S, path: &Path, max_frames: u32) -> ExecuteResult {
    execute_path_with(sim, path, max_frames, &NodeBudgets::default())
}

pub fn execute_path_with<S: ControlledSim>(
    sim: &mut S,
    path: &Path,
    max_frames: u32,
    budgets: &NodeBudgets,
) -> ExecuteResult {
    let mut follower = PathFollower::default();
    if let Some(goal) = path.last_tile() {
        follower.set_path(path.clone(), goal, 0);
    }

    let mut frames_used: u32 = 0;
    let mut node_frames: u32 = 0;
    let mut previous = ActionIntents::neutral();

    let outcome = 'run: loop {
        let Some(body) = sim.body_view() else {
            warn!("Executor: body vanished at node {}", follower.index);
            break 'run ExecuteOutcome::StuckAt(follower.index);
        };

        while let Some(node) = follower.current_node() {
            if !at_node(&body, node) {
                break;
            }
            debug!(
                "Executor: reached node {} ({}, {}) after {} frames",
                follower.index, node.col, node.row, frames_used
            );
            follower.advance();
            node_frames = 0;
        }

        let Some(node) = follower.current_node().copied() else {
            break 'run ExecuteOutcome::Success;
        };
        if frames_used >= max_frames {
            break 'run ExecuteOutcome::Timeout;
        }
        if node_frames >= budgets.for_kind(node.move_kind) {
            warn!(
                "Executor: stuck at node {} ({} to {}, {}) after {} frames",
                follower.index, node.move_kind, node.col, node.row, node_frames
            );
            break 'run ExecuteOutcome::StuckAt(follower.index);
        }

        let prev_node = follower.previous_node().copied();
        let intents = steer_to_node(&body, &node, prev_node.as_ref(), &mut follower.jump);
        let mut input = sim.input_state();
        apply_intents(&intents, &previous, &mut input);
        sim.set_input_state(input);
        previous = intents;

        sim.step_frame();
        frames_used += 1;
        node_frames += 1;
    };

    sim.set_input_state(InputState::default());

    ExecuteResult {
        success: outcome == ExecuteOutcome::Success,
        frames_used,
        nodes_completed: follower.index.min(path.len()),
        outcome,
    }
}
