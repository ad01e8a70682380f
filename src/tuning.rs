//! Navigation and physics tuning (loaded from config, decoupled from constants)

use bevy::log::{info, warn};
use bevy::prelude::{ResMut, Resource};
use serde::{Deserialize, Serialize};

use crate::constants::*;

// Serde default functions for fields added after the first config revision
fn default_max_fall_speed() -> f32 {
    MAX_FALL_SPEED
}
fn default_max_jump_height() -> i32 {
    MAX_JUMP_HEIGHT
}
fn default_max_jump_width() -> i32 {
    MAX_JUMP_WIDTH
}
fn default_max_fall_depth() -> i32 {
    MAX_FALL_DEPTH
}
fn default_node_cap() -> usize {
    NAV_NODE_CAP
}
fn default_arc_speed_factor() -> f32 {
    ARC_SPEED_FACTOR
}

/// Path to navigation tuning config
pub const NAV_TUNING_FILE: &str = "config/nav_tuning.json";

/// Serializable tuning values stored in config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavTuning {
    pub gravity_rise: f32,
    pub gravity_fall: f32,
    pub jump_velocity: f32,
    pub move_speed: f32,
    pub ground_accel: f32,
    pub ground_decel: f32,
    pub air_accel: f32,
    pub air_decel: f32,
    #[serde(default = "default_max_fall_speed")]
    pub max_fall_speed: f32,
    // Navigation limits (tiles)
    #[serde(default = "default_max_jump_height")]
    pub max_jump_height: i32,
    #[serde(default = "default_max_jump_width")]
    pub max_jump_width: i32,
    #[serde(default = "default_max_fall_depth")]
    pub max_fall_depth: i32,
    #[serde(default = "default_node_cap")]
    pub node_cap: usize,
    #[serde(default = "default_arc_speed_factor")]
    pub arc_speed_factor: f32,
}

impl Default for NavTuning {
    fn default() -> Self {
        Self {
            gravity_rise: GRAVITY_RISE,
            gravity_fall: GRAVITY_FALL,
            jump_velocity: JUMP_VELOCITY,
            move_speed: MOVE_SPEED,
            ground_accel: GROUND_ACCEL,
            ground_decel: GROUND_DECEL,
            air_accel: AIR_ACCEL,
            air_decel: AIR_DECEL,
            max_fall_speed: default_max_fall_speed(),
            max_jump_height: default_max_jump_height(),
            max_jump_width: default_max_jump_width(),
            max_fall_depth: default_max_fall_depth(),
            node_cap: default_node_cap(),
            arc_speed_factor: default_arc_speed_factor(),
        }
    }
}

impl NavTuning {
    pub fn apply_to(&self, tweaks: &mut PhysicsTweaks, config: &mut NavConfig) {
        tweaks.gravity_rise = self.gravity_rise;
        tweaks.gravity_fall = self.gravity_fall;
        tweaks.jump_velocity = self.jump_velocity;
        tweaks.move_speed = self.move_speed;
        tweaks.ground_accel = self.ground_accel;
        tweaks.ground_decel = self.ground_decel;
        tweaks.air_accel = self.air_accel;
        tweaks.air_decel = self.air_decel;
        tweaks.max_fall_speed = self.max_fall_speed;

        config.max_jump_height = self.max_jump_height.max(0);
        config.max_jump_width = self.max_jump_width.max(0);
        config.max_fall_depth = self.max_fall_depth.max(0);
        config.node_cap = self.node_cap.max(1);
        config.arc_speed_factor = self.arc_speed_factor.clamp(0.1, 1.0);
    }
}

/// Runtime physics values shared by body simulation and the jump-arc sampler
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PhysicsTweaks {
    pub gravity_rise: f32,
    pub gravity_fall: f32,
    pub jump_velocity: f32,
    pub move_speed: f32,
    pub ground_accel: f32,
    pub ground_decel: f32,
    pub air_accel: f32,
    pub air_decel: f32,
    pub max_fall_speed: f32,
}

impl Default for PhysicsTweaks {
    fn default() -> Self {
        let mut tweaks = Self {
            gravity_rise: 0.0,
            gravity_fall: 0.0,
            jump_velocity: 0.0,
            move_speed: 0.0,
            ground_accel: 0.0,
            ground_decel: 0.0,
            air_accel: 0.0,
            air_decel: 0.0,
            max_fall_speed: 0.0,
        };
        NavTuning::default().apply_to(&mut tweaks, &mut NavConfig::default());
        tweaks
    }
}

/// Limits and costs of the navigation move model
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct NavConfig {
    pub max_jump_height: i32,
    pub max_jump_width: i32,
    pub max_fall_depth: i32,
    /// A* stops after opening this many nodes
    pub node_cap: usize,
    pub arc_speed_factor: f32,
    pub walk_cost: f32,
    pub jump_cost_base: f32,
    pub fall_cost_base: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            max_jump_height: MAX_JUMP_HEIGHT,
            max_jump_width: MAX_JUMP_WIDTH,
            max_fall_depth: MAX_FALL_DEPTH,
            node_cap: NAV_NODE_CAP,
            arc_speed_factor: ARC_SPEED_FACTOR,
            walk_cost: WALK_COST,
            jump_cost_base: JUMP_COST_BASE,
            fall_cost_base: FALL_COST_BASE,
        }
    }
}

pub fn load_nav_tuning_from_file(path: &str) -> Result<NavTuning, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
}

pub fn apply_nav_tuning(
    path: &str,
    tweaks: &mut PhysicsTweaks,
    config: &mut NavConfig,
) -> Result<(), String> {
    match load_nav_tuning_from_file(path) {
        Ok(tuning) => {
            tuning.apply_to(tweaks, config);
            Ok(())
        }
        Err(err) => {
            NavTuning::default().apply_to(tweaks, config);
            Err(err)
        }
    }
}

/// Startup system: read `config/nav_tuning.json` into the runtime resources
pub fn load_nav_tuning_system(mut tweaks: ResMut<PhysicsTweaks>, mut config: ResMut<NavConfig>) {
    match apply_nav_tuning(NAV_TUNING_FILE, &mut tweaks, &mut config) {
        Ok(()) => info!("Loaded nav tuning from {}", NAV_TUNING_FILE),
        Err(err) => warn!("{}, using defaults", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let json = r#"{
            "gravity_rise": 1000.0,
            "gravity_fall": 1300.0,
            "jump_velocity": 400.0,
            "move_speed": 100.0,
            "ground_accel": 1600.0,
            "ground_decel": 1400.0,
            "air_accel": 1200.0,
            "air_decel": 900.0
        }"#;
        let tuning: NavTuning = serde_json::from_str(json).unwrap();
        assert_eq!(tuning.max_jump_height, MAX_JUMP_HEIGHT);
        assert_eq!(tuning.node_cap, NAV_NODE_CAP);
        assert_eq!(tuning.max_fall_speed, MAX_FALL_SPEED);

        let mut tweaks = PhysicsTweaks::default();
        let mut config = NavConfig::default();
        tuning.apply_to(&mut tweaks, &mut config);
        assert_eq!(tweaks.gravity_rise, 1000.0);
        assert_eq!(tweaks.move_speed, 100.0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let mut tweaks = PhysicsTweaks::default();
        tweaks.jump_velocity = 1.0;
        let mut config = NavConfig::default();
        let result = apply_nav_tuning("does/not/exist.json", &mut tweaks, &mut config);
        assert!(result.is_err());
        assert_eq!(tweaks.jump_velocity, JUMP_VELOCITY);
    }

    #[test]
    fn test_default_tweaks_match_constants() {
        let tweaks = PhysicsTweaks::default();
        assert_eq!(tweaks.gravity_fall, GRAVITY_FALL);
        assert_eq!(tweaks.max_fall_speed, MAX_FALL_SPEED);
    }
}
