//! Scenario testing system for deterministic navigation testing
//!
//! Scenarios are TOML files naming a level, a start and goal tile, and what
//! reachability, search and path execution should report.

pub mod assertions;
pub mod parser;
pub mod runner;

pub use assertions::{AssertionError, ExecutionSummary, ScenarioOutcome, check_execution, check_search};
pub use parser::{ExecuteSpec, StepDef, StepKind, TestDefinition, TestExpectations, TestSetup};
pub use runner::{TestResult, run_test};

/// Default path for test scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";
