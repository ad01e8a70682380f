//! Headless App Builder
//!
//! Provides a reusable builder for creating headless Bevy apps for simulation.
//! Used by the scenario runner and the executor's ECS entry point.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::time::Duration;

use crate::ai::AiProfileDatabase;
use crate::constants::*;
use crate::levels::{LevelDatabase, load_default_level_db, select_level};
use crate::plugin::NavigationPlugin;

/// Duration of one fixed simulation frame
pub fn fixed_frame_duration() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_TICK_RATE as f64)
}

/// Builder for creating headless Bevy apps
pub struct HeadlessAppBuilder {
    level_name: Option<String>,
    level_db: Option<LevelDatabase>,
    profile_db: Option<AiProfileDatabase>,
    minimal_threads: bool,
    load_tuning: bool,
}

impl Default for HeadlessAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessAppBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            level_name: None,
            level_db: None,
            profile_db: None,
            minimal_threads: false,
            load_tuning: true,
        }
    }

    /// Create a new builder for the given level name
    pub fn for_level(level_name: &str) -> Self {
        Self::new().with_level(level_name)
    }

    /// Set the level name
    pub fn with_level(mut self, level_name: &str) -> Self {
        self.level_name = Some(level_name.to_string());
        self
    }

    /// Set the level database (default: assets/levels.txt)
    pub fn with_level_db(mut self, level_db: LevelDatabase) -> Self {
        self.level_db = Some(level_db);
        self
    }

    /// Set the AI profile database (default: assets/ai_profiles.txt)
    pub fn with_profile_db(mut self, profile_db: AiProfileDatabase) -> Self {
        self.profile_db = Some(profile_db);
        self
    }

    /// Enable minimal thread mode (task pools = 1)
    ///
    /// Use this when running many apps in parallel to avoid hitting OS thread limits.
    pub fn with_minimal_threads(mut self) -> Self {
        self.minimal_threads = true;
        self
    }

    /// Skip reading config/nav_tuning.json; constants are used as-is
    pub fn without_tuning_file(mut self) -> Self {
        self.load_tuning = false;
        self
    }

    /// Build the app and run its first frame (startup, nav graph build and
    /// actor spawning).
    ///
    /// The returned app has:
    /// - MinimalPlugins with a fixed 60 Hz clock
    /// - LevelDatabase, the selected TileLevel and AiProfileDatabase
    /// - NavigationPlugin (nav graph, AI controllers, body physics)
    ///
    /// Advance it with [`step_frame`].
    pub fn build(self) -> Result<App, String> {
        let level_db = self.level_db.unwrap_or_else(load_default_level_db);
        let level = select_level(&level_db, self.level_name.as_deref())?;
        let profile_db = self
            .profile_db
            .unwrap_or_else(|| AiProfileDatabase::load_from_file(crate::ai::AI_PROFILES_FILE));

        let mut app = App::new();

        let runner = ScheduleRunnerPlugin::run_loop(fixed_frame_duration());
        if self.minimal_threads {
            // Reduce Bevy's internal thread pools to minimum
            app.add_plugins(MinimalPlugins.set(runner).set(TaskPoolPlugin {
                task_pool_options: TaskPoolOptions::with_num_threads(1),
            }));
        } else {
            app.add_plugins(MinimalPlugins.set(runner));
        }
        app.insert_resource(Time::<Fixed>::from_duration(fixed_frame_duration()));

        app.insert_resource(level_db);
        app.insert_resource(level);
        app.insert_resource(profile_db);
        app.add_plugins(NavigationPlugin {
            load_tuning: self.load_tuning,
        });

        // Initialize app
        app.finish();
        app.cleanup();
        app.update();

        Ok(app)
    }
}

/// Advance a headless app by exactly one fixed frame: FixedUpdate (AI and
/// physics) then Update (level bookkeeping).
pub fn step_frame(app: &mut App) {
    let dt = fixed_frame_duration();
    let world = app.world_mut();

    world.resource_mut::<Time<Real>>().advance_by(dt);
    world.resource_mut::<Time<Virtual>>().advance_by(dt);
    world.resource_mut::<Time<Fixed>>().advance_by(dt);

    let fixed = world.resource::<Time<Fixed>>().as_generic();
    *world.resource_mut::<Time>() = fixed;
    world.run_schedule(FixedUpdate);

    let virt = world.resource::<Time<Virtual>>().as_generic();
    *world.resource_mut::<Time>() = virt;
    world.run_schedule(Update);
}
