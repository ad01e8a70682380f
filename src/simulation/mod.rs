//! Simulation module - headless apps and scripted path execution
//!
//! The action executor drives a body along a path by feeding it keys and
//! stepping the simulation, either a bare [`BodySim`] or an entity inside a
//! headless app ([`AppSim`]). [`audit`] cross-checks reachability against
//! search for whole levels.

pub mod app_builder;
pub mod audit;
pub mod control;
pub mod executor;

pub use app_builder::{HeadlessAppBuilder, fixed_frame_duration, step_frame};
pub use audit::{AuditReport, Disagreement, audit_level, audit_levels, init_parallel};
pub use control::{AppSim, BodySim, ControlledSim};
pub use executor::{ExecuteOutcome, ExecuteResult, NodeBudgets, execute_path, execute_path_with};
