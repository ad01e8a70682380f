//! Assertion checking for scenario expectations

use bevy::prelude::*;
use std::fmt::Debug;

use super::parser::TestExpectations;
use crate::ai::{MoveKind, Reachability, SearchOutcome};
use crate::simulation::ExecuteResult;

/// Error when an assertion fails
#[derive(Debug, Clone)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

/// What the runner observed for one scenario
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub reachability: Reachability,
    pub search: SearchOutcome,
    pub execution: Option<ExecutionSummary>,
}

#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    pub result: ExecuteResult,
    pub final_tile: IVec2,
    pub keys_released: bool,
}

fn check_eq<T: PartialEq + Debug>(what: &str, expected: Option<&T>, actual: &T) -> Result<(), AssertionError> {
    match expected {
        Some(exp) if exp != actual => Err(AssertionError {
            message: format!("{} mismatch", what),
            expected: format!("{:?}", exp),
            actual: format!("{:?}", actual),
        }),
        _ => Ok(()),
    }
}

/// Check search and reachability expectations
pub fn check_search(expect: &TestExpectations, outcome: &ScenarioOutcome) -> Result<(), AssertionError> {
    let reachable = outcome.reachability == Reachability::Connected;
    check_eq("reachable", expect.reachable.as_ref(), &reachable)?;

    let status = outcome.search.status.to_string();
    check_eq("search_status", expect.search_status.as_ref(), &status)?;

    let path = &outcome.search.path;
    check_eq("path_nodes", expect.path_nodes.as_ref(), &path.len())?;
    check_eq("walk_edges", expect.walk_edges.as_ref(), &path.count_kind(MoveKind::Walk))?;
    check_eq("jump_edges", expect.jump_edges.as_ref(), &path.count_kind(MoveKind::Jump))?;
    check_eq("fall_edges", expect.fall_edges.as_ref(), &path.count_kind(MoveKind::Fall))?;

    if let Some(tiles) = &expect.path_tiles {
        let expected: Vec<IVec2> = tiles.iter().copied().map(IVec2::from_array).collect();
        check_eq("path_tiles", Some(&expected), &path.tiles())?;
    }

    Ok(())
}

/// Check executor expectations. Keys must always end released.
pub fn check_execution(expect: &TestExpectations, outcome: &ScenarioOutcome) -> Result<(), AssertionError> {
    let Some(execution) = &outcome.execution else {
        let wants_execution = expect.reason.is_some()
            || expect.nodes_completed.is_some()
            || expect.final_tile.is_some();
        if wants_execution {
            return Err(AssertionError {
                message: "Execution expectations without an [execute] section".to_string(),
                expected: "[execute]".to_string(),
                actual: "none".to_string(),
            });
        }
        return Ok(());
    };

    if !execution.keys_released {
        return Err(AssertionError {
            message: "Keys still held after execution".to_string(),
            expected: "all keys released".to_string(),
            actual: "input not neutral".to_string(),
        });
    }

    check_eq("reason", expect.reason.as_ref(), &execution.result.reason())?;
    check_eq(
        "nodes_completed",
        expect.nodes_completed.as_ref(),
        &execution.result.nodes_completed,
    )?;
    if let Some(tile) = expect.final_tile {
        check_eq("final_tile", Some(&IVec2::from_array(tile)), &execution.final_tile)?;
    }

    Ok(())
}
