//! Tunable constants for platform_nav
//!
//! All physics, navigation and AI defaults are defined here for easy tweaking.
//! Runtime overrides come from `config/nav_tuning.json` (see `tuning.rs`).

use bevy::prelude::*;

// =============================================================================
// GRID
// =============================================================================

/// World units per tile edge
pub const TILE_SIZE: f32 = 16.0;

// =============================================================================
// SIZE CONSTANTS
// =============================================================================

/// Player/enemy collision box. Fits a 1x2 tile opening with a little slack.
pub const BODY_SIZE: Vec2 = Vec2::new(12.0, 28.0);

// =============================================================================
// PHYSICS CONSTANTS
// =============================================================================

pub const GRAVITY_RISE: f32 = 900.0; // Gravity while rising
pub const GRAVITY_FALL: f32 = 1200.0; // Gravity while falling (fast fall)
pub const JUMP_VELOCITY: f32 = 380.0; // Full jump (~5 tiles with button held)
pub const JUMP_CUT_MULTIPLIER: f32 = 0.4; // Velocity multiplier when releasing jump early
pub const MOVE_SPEED: f32 = 120.0;
pub const GROUND_ACCEL: f32 = 1600.0;
pub const GROUND_DECEL: f32 = 1400.0;
pub const AIR_ACCEL: f32 = 1200.0;
pub const AIR_DECEL: f32 = 900.0;
pub const MAX_FALL_SPEED: f32 = 420.0; // Terminal velocity, < one tile per tick
pub const COLLISION_EPSILON: f32 = 0.01; // Skin width for tile overlap tests

// =============================================================================
// GAME FEEL CONSTANTS
// =============================================================================

pub const COYOTE_TIME: f32 = 0.1; // Seconds after leaving ground you can still jump
pub const JUMP_BUFFER_TIME: f32 = 0.1; // Seconds before landing that jump input is remembered
pub const STICK_DEADZONE: f32 = 0.25;

// =============================================================================
// SIMULATION TICK
// =============================================================================

pub const FIXED_TICK_RATE: f32 = 60.0;
pub const FIXED_DT: f32 = 1.0 / FIXED_TICK_RATE;

// =============================================================================
// NAVIGATION LIMITS (tile units)
// =============================================================================

/// Highest rise a Jump edge may cover
pub const MAX_JUMP_HEIGHT: i32 = 3;
/// Widest horizontal displacement a Jump edge may cover
pub const MAX_JUMP_WIDTH: i32 = 3;
/// Deepest drop a Fall edge may cover
pub const MAX_FALL_DEPTH: i32 = 12;
/// A* gives up after opening this many nodes
pub const NAV_NODE_CAP: usize = 4096;

/// Fraction of MOVE_SPEED assumed by the jump-arc sampler (acceleration slack)
pub const ARC_SPEED_FACTOR: f32 = 0.75;
/// Feet must clear the target floor by this fraction of a tile before steering sideways
pub const JUMP_STEER_CLEARANCE: f32 = 0.25;
/// Horizontal dead zone around a tile center, as a fraction of a tile
pub const ARRIVE_TOLERANCE: f32 = 0.25;

// =============================================================================
// NAVIGATION COSTS
// =============================================================================

pub const WALK_COST: f32 = 1.0; // Per column
pub const JUMP_COST_BASE: f32 = 1.0; // Added on top of |dx| + dy
pub const FALL_COST_BASE: f32 = 0.5; // Added on top of max(|dx|, depth)

// =============================================================================
// ACTION EXECUTOR
// =============================================================================

pub const WALK_NODE_BUDGET_FRAMES: u32 = 120; // ~2s
pub const JUMP_NODE_BUDGET_FRAMES: u32 = 120; // ~2s
pub const FALL_NODE_BUDGET_FRAMES: u32 = 360; // ~6s, covers MAX_FALL_DEPTH
pub const DEFAULT_EXECUTE_MAX_FRAMES: u32 = 3600;

// =============================================================================
// AI DEFAULTS
// =============================================================================

pub const STALKER_REPATH_INTERVAL: u64 = 30; // Frames between searches
pub const STALKER_STALE_FRAMES: u64 = 180; // Force a re-path after this long
pub const STALKER_TARGET_TOLERANCE: i32 = 2; // Tiles the target may drift before re-path
pub const SHOOTER_SIGHT_RANGE: f32 = 10.0; // Tiles
pub const SHOOTER_FIRE_COOLDOWN: u64 = 90; // Frames
pub const SHOOTER_PATROL_RADIUS: i32 = 3; // Tiles either side of home

// =============================================================================
// FILES
// =============================================================================

pub const LEVELS_FILE: &str = "assets/levels.txt";
