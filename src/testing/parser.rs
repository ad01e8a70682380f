//! TOML scenario file parsing

use bevy::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::ai::MoveKind;
use crate::constants::DEFAULT_EXECUTE_MAX_FRAMES;

/// Complete scenario definition from TOML file
#[derive(Debug, Deserialize)]
pub struct TestDefinition {
    pub name: String,
    pub description: Option<String>,
    pub setup: TestSetup,
    /// Drive a body along the path after searching
    pub execute: Option<ExecuteSpec>,
    #[serde(default)]
    pub expect: TestExpectations,
}

/// Level and endpoints
#[derive(Debug, Deserialize)]
pub struct TestSetup {
    /// Level name in the levels file (ignored when `grid` is given)
    pub level: Option<String>,
    /// Inline ASCII grid, first line is the top row
    pub grid: Option<String>,
    pub start: [i32; 2],
    pub goal: Option<[i32; 2]>,
}

impl TestSetup {
    pub fn start_tile(&self) -> IVec2 {
        IVec2::from_array(self.start)
    }

    pub fn goal_tile(&self) -> Option<IVec2> {
        self.goal.map(IVec2::from_array)
    }
}

/// Scripted path replay
#[derive(Debug, Deserialize)]
pub struct ExecuteSpec {
    #[serde(default = "default_max_frames")]
    pub max_frames: u32,
    /// Explicit path; the search result is used when empty
    #[serde(default)]
    pub steps: Vec<StepDef>,
}

fn default_max_frames() -> u32 {
    DEFAULT_EXECUTE_MAX_FRAMES
}

/// One node of an explicit path
#[derive(Debug, Clone, Deserialize)]
pub struct StepDef {
    pub tile: [i32; 2],
    pub kind: StepKind,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Walk,
    Jump,
    Fall,
}

impl From<StepKind> for MoveKind {
    fn from(kind: StepKind) -> Self {
        match kind {
            StepKind::Walk => MoveKind::Walk,
            StepKind::Jump => MoveKind::Jump,
            StepKind::Fall => MoveKind::Fall,
        }
    }
}

/// Expected outcomes. Anything left out is not checked.
#[derive(Debug, Default, Deserialize)]
pub struct TestExpectations {
    pub reachable: Option<bool>,
    /// "found", "no_path", "node_cap_exceeded" or "off_grid"
    pub search_status: Option<String>,
    pub path_nodes: Option<usize>,
    pub walk_edges: Option<usize>,
    pub jump_edges: Option<usize>,
    pub fall_edges: Option<usize>,
    pub path_tiles: Option<Vec<[i32; 2]>>,
    /// "success", "stuck_at_N" or "timeout"
    pub reason: Option<String>,
    pub nodes_completed: Option<usize>,
    pub final_tile: Option<[i32; 2]>,
}

/// Parse a test file from path
pub fn parse_test_file(path: &Path) -> Result<TestDefinition, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let toml = r#"
name = "Test"
[setup]
level = "Corridor"
start = [1, 1]
goal = [8, 1]

[expect]
walk_edges = 7
"#;
        let def: TestDefinition = toml::from_str(toml).unwrap();
        assert_eq!(def.name, "Test");
        assert_eq!(def.setup.level.as_deref(), Some("Corridor"));
        assert_eq!(def.setup.goal_tile(), Some(IVec2::new(8, 1)));
        assert_eq!(def.expect.walk_edges, Some(7));
        assert!(def.execute.is_none());
    }

    #[test]
    fn test_parse_explicit_steps() {
        let toml = r#"
name = "Steps"
[setup]
grid = """
###
#.#
###
"""
start = [1, 1]

[execute]
steps = [{ tile = [1, 4], kind = "jump" }]
"#;
        let def: TestDefinition = toml::from_str(toml).unwrap();
        let execute = def.execute.unwrap();
        assert_eq!(execute.max_frames, DEFAULT_EXECUTE_MAX_FRAMES);
        assert_eq!(MoveKind::from(execute.steps[0].kind), MoveKind::Jump);
    }
}
