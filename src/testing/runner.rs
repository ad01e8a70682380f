//! Scenario execution engine

use bevy::prelude::*;

use crate::ai::{NavGraph, Path, Pathfinder, SearchOutcome, SearchStatus};
use crate::constants::*;
use crate::levels::{LevelDatabase, TileLevel};
use crate::simulation::{BodySim, execute_path};
use crate::world::TileOracle;

use super::assertions::{AssertionError, ExecutionSummary, ScenarioOutcome, check_execution, check_search};
use super::parser::TestDefinition;

/// Result of running a test
#[derive(Debug)]
pub enum TestResult {
    Pass { frames: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass { .. })
    }
}

/// Resolve the scenario's level: inline grid first, then the levels file
fn scenario_level(test: &TestDefinition) -> Result<TileLevel, String> {
    if let Some(grid) = &test.setup.grid {
        return TileLevel::from_ascii(&test.name, grid);
    }

    let Some(level_name) = &test.setup.level else {
        return Err("Scenario needs either setup.level or setup.grid".to_string());
    };
    let level_db = LevelDatabase::load_from_file(LEVELS_FILE);
    level_db.get_by_name(level_name).cloned().ok_or_else(|| {
        format!(
            "Level '{}' not found. Available: {:?}",
            level_name,
            level_db.levels.iter().map(|l| &l.name).collect::<Vec<_>>()
        )
    })
}

/// Run a single test and return the result
pub fn run_test(test: &TestDefinition) -> TestResult {
    let level = match scenario_level(test) {
        Ok(level) => level,
        Err(message) => return TestResult::Error { message },
    };

    let pathfinder = Pathfinder::default();
    let mut nav_graph = NavGraph::default();
    nav_graph.build(&level, pathfinder.model());

    let start = test.setup.start_tile();
    let goal = test.setup.goal_tile();

    let (reachability, search) = match goal {
        Some(goal) => (
            nav_graph.reachability(start, goal),
            pathfinder.search(&level, start, goal),
        ),
        None => (
            nav_graph.reachability(start, start),
            SearchOutcome {
                path: Path::empty(),
                status: SearchStatus::NoPath,
                nodes_opened: 0,
            },
        ),
    };

    let execution = test.execute.as_ref().map(|spec| {
        let path = if spec.steps.is_empty() {
            search.path.clone()
        } else {
            let steps: Vec<(IVec2, crate::ai::MoveKind)> = spec
                .steps
                .iter()
                .map(|s| (IVec2::from_array(s.tile), s.kind.into()))
                .collect();
            Path::from_steps(&steps)
        };

        let mut sim = BodySim::at_tile(level.clone(), start);
        let result = execute_path(&mut sim, &path, spec.max_frames);
        ExecutionSummary {
            result,
            final_tile: sim.body.feet_tile(level.grid_size()),
            keys_released: sim.input.is_neutral(),
        }
    });

    let outcome = ScenarioOutcome {
        reachability,
        search,
        execution,
    };

    if let Err(error) = check_search(&test.expect, &outcome) {
        return TestResult::Fail { error };
    }
    if let Err(error) = check_execution(&test.expect, &outcome) {
        return TestResult::Fail { error };
    }

    TestResult::Pass {
        frames: outcome
            .execution
            .map(|e| e.result.frames_used as u64)
            .unwrap_or(0),
    }
}
