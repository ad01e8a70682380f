//! AI profiles - enemy archetype parameters
//!
//! Each profile names a behavior and the numbers that tune it.
//! Loaded from assets/ai_profiles.txt.

use bevy::prelude::*;
use std::fs;

use crate::constants::*;

/// Path to AI profiles file
pub const AI_PROFILES_FILE: &str = "assets/ai_profiles.txt";

/// Which behavior a profile drives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BehaviorKind {
    #[default]
    Stalker,
    Shooter,
    /// Shooter patrol without firing
    Patroller,
}

impl BehaviorKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "stalker" => Some(Self::Stalker),
            "shooter" => Some(Self::Shooter),
            "patroller" => Some(Self::Patroller),
            _ => None,
        }
    }
}

/// AI behavior parameters loaded from config file
#[derive(Debug, Clone, PartialEq)]
pub struct AiProfile {
    /// Profile name for display and level references
    pub name: String,
    pub behavior: BehaviorKind,
    /// Frames between searches while the target keeps moving
    pub repath_interval: u64,
    /// Frames after which a path is replaced regardless
    pub stale_frames: u64,
    /// Tiles the target may drift before a re-path
    pub target_tolerance: i32,
    /// Sight range in tiles
    pub sight_range: f32,
    /// Frames between shots
    pub fire_cooldown: u64,
    /// Random extra frames added to each cooldown
    pub fire_jitter: u64,
    /// Patrol distance either side of home, in tiles
    pub patrol_radius: i32,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self {
            name: "Stalker".to_string(),
            behavior: BehaviorKind::Stalker,
            repath_interval: STALKER_REPATH_INTERVAL,
            stale_frames: STALKER_STALE_FRAMES,
            target_tolerance: STALKER_TARGET_TOLERANCE,
            sight_range: SHOOTER_SIGHT_RANGE,
            fire_cooldown: SHOOTER_FIRE_COOLDOWN,
            fire_jitter: 15,
            patrol_radius: SHOOTER_PATROL_RADIUS,
        }
    }
}

/// Database of AI profiles loaded from file
#[derive(Resource)]
pub struct AiProfileDatabase {
    profiles: Vec<AiProfile>,
}

impl Default for AiProfileDatabase {
    fn default() -> Self {
        Self::load_from_file(AI_PROFILES_FILE)
    }
}

impl AiProfileDatabase {
    /// Load profiles from file, or return default if file doesn't exist
    pub fn load_from_file(path: &str) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read AI profiles file: {}, using defaults", e);
                return Self::builtin();
            }
        };

        let profiles = parse_profiles(&content);
        if profiles.is_empty() {
            warn!("No profiles parsed from {}, using defaults", path);
            return Self::builtin();
        }

        info!("Loaded {} AI profiles from {}", profiles.len(), path);
        Self { profiles }
    }

    /// One profile per behavior kind with default numbers
    pub fn builtin() -> Self {
        let base = AiProfile::default();
        Self {
            profiles: vec![
                base.clone(),
                AiProfile {
                    name: "Shooter".to_string(),
                    behavior: BehaviorKind::Shooter,
                    ..base.clone()
                },
                AiProfile {
                    name: "Patroller".to_string(),
                    behavior: BehaviorKind::Patroller,
                    ..base
                },
            ],
        }
    }

    pub fn from_profiles(profiles: Vec<AiProfile>) -> Self {
        if profiles.is_empty() {
            return Self::builtin();
        }
        Self { profiles }
    }

    /// Get profile by index, wrapping around if out of bounds
    pub fn get(&self, index: usize) -> &AiProfile {
        &self.profiles[index % self.profiles.len()]
    }

    /// Get profile by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Option<&AiProfile> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Parse profiles from file content
pub fn parse_profiles(content: &str) -> Vec<AiProfile> {
    let mut profiles = Vec::new();
    let mut current: Option<AiProfile> = None;

    for line in content.lines() {
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // New profile starts
        if let Some(name) = line.strip_prefix("profile:") {
            // Save previous profile if any
            if let Some(p) = current.take() {
                profiles.push(p);
            }
            let name = name.trim();
            current = Some(AiProfile {
                name: name.to_string(),
                // Name doubles as the behavior unless a behavior line says otherwise
                behavior: BehaviorKind::parse(name).unwrap_or_default(),
                ..default()
            });
            continue;
        }

        // Parse key: value pairs
        let Some(profile) = current.as_mut() else {
            continue;
        };

        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            match key.trim() {
                "behavior" => {
                    if let Some(kind) = BehaviorKind::parse(value) {
                        profile.behavior = kind;
                    } else {
                        warn!("Unknown behavior '{}' in profile {}", value, profile.name);
                    }
                }
                "repath_interval" => {
                    if let Ok(v) = value.parse() {
                        profile.repath_interval = v;
                    }
                }
                "stale_frames" => {
                    if let Ok(v) = value.parse() {
                        profile.stale_frames = v;
                    }
                }
                "target_tolerance" => {
                    if let Ok(v) = value.parse() {
                        profile.target_tolerance = v;
                    }
                }
                "sight_range" => {
                    if let Ok(v) = value.parse() {
                        profile.sight_range = v;
                    }
                }
                "fire_cooldown" => {
                    if let Ok(v) = value.parse() {
                        profile.fire_cooldown = v;
                    }
                }
                "fire_jitter" => {
                    if let Ok(v) = value.parse() {
                        profile.fire_jitter = v;
                    }
                }
                "patrol_radius" => {
                    if let Ok(v) = value.parse() {
                        profile.patrol_radius = v;
                    }
                }
                _ => {}
            }
        }
    }

    // Don't forget the last profile
    if let Some(p) = current {
        profiles.push(p);
    }

    profiles
}
