//! Platform Nav - tile-level navigation and enemy AI for a 2D platformer, built on Bevy
//!
//! This crate provides the navigation graph, A* pathfinding, enemy behaviors,
//! a scripted path executor and the body physics they drive.

// Core modules
pub mod constants;
pub mod helpers;
pub mod plugin;
pub mod simulation;
pub mod testing;
pub mod tuning;

// Navigation and AI modules
pub mod ai;
pub mod levels;
pub mod player;
pub mod world;

// Re-export commonly used types for convenience
pub use ai::{
    AI_PROFILES_FILE, ActionIntents, ActionKind, AiController, AiMode, AiProfile,
    AiProfileDatabase, Behavior, BehaviorKind, FrameCounter, InputState, MoveKind, MoveModel,
    NavCapabilities, NavGraph, NavNode, Path, Pathfinder, Reachability, SearchOutcome,
    SearchStatus, ShooterBehavior, StalkerBehavior, create_behavior,
};
pub use constants::*;
pub use helpers::*;
pub use levels::{EnemySpawn, LevelDatabase, TileLevel};
pub use player::{Enemy, KinematicBody, Player, Weapon};
pub use plugin::NavigationPlugin;
pub use simulation::{
    ExecuteOutcome, ExecuteResult, HeadlessAppBuilder, execute_path, step_frame,
};
pub use tuning::{NAV_TUNING_FILE, NavConfig, NavTuning, PhysicsTweaks};
pub use world::{TileKind, TileOracle};
