//! Navigation plugin - wires nav resources, AI and body physics into an App

use bevy::prelude::*;

use crate::ai::{
    AiProfileDatabase, FrameCounter, NavGraph, Pathfinder, ai_controller_update,
    mark_nav_dirty_on_level_change, rebuild_nav_graph, sync_move_model, tick_frame_counter,
};
use crate::levels::{LevelDatabase, SpawnedLevel, TileLevel, respawn_on_level_change, select_level};
use crate::player::step_bodies;
use crate::tuning::{NavConfig, PhysicsTweaks, load_nav_tuning_system};

/// Everything an enemy needs to hunt the player across a tile level.
///
/// Expects a `TileLevel` resource; if none is present the first level of the
/// `LevelDatabase` (or an empty level) is used.
pub struct NavigationPlugin {
    /// Read config/nav_tuning.json at startup
    pub load_tuning: bool,
}

impl Default for NavigationPlugin {
    fn default() -> Self {
        Self { load_tuning: true }
    }
}

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<TileLevel>() {
            let level = app
                .world()
                .get_resource::<LevelDatabase>()
                .and_then(|db| select_level(db, None).ok())
                .unwrap_or_else(|| TileLevel::empty("Empty"));
            app.insert_resource(level);
        }

        app.init_resource::<PhysicsTweaks>()
            .init_resource::<NavConfig>()
            .init_resource::<NavGraph>()
            .init_resource::<Pathfinder>()
            .init_resource::<FrameCounter>()
            .init_resource::<AiProfileDatabase>()
            .init_resource::<SpawnedLevel>();

        if self.load_tuning {
            app.add_systems(Startup, load_nav_tuning_system);
        }

        app.add_systems(
            Update,
            (
                mark_nav_dirty_on_level_change,
                sync_move_model,
                rebuild_nav_graph,
                respawn_on_level_change,
            )
                .chain(),
        )
        .add_systems(
            FixedUpdate,
            (tick_frame_counter, ai_controller_update, step_bodies).chain(),
        );
    }
}
