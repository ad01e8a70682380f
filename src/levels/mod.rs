//! Levels module - database, current level selection, and actor spawning

mod database;
mod spawning;

pub use database::*;
pub use spawning::*;

use bevy::prelude::*;

use crate::constants::LEVELS_FILE;

/// Pick the level to play from the database by name, or the first level.
pub fn select_level(level_db: &LevelDatabase, name: Option<&str>) -> Result<TileLevel, String> {
    let level = match name {
        Some(name) => level_db.get_by_name(name).ok_or_else(|| {
            format!(
                "Level '{}' not found. Available: {:?}",
                name,
                level_db.levels.iter().map(|l| &l.name).collect::<Vec<_>>()
            )
        })?,
        None => level_db
            .get(0)
            .ok_or_else(|| "Level database is empty".to_string())?,
    };
    Ok(level.clone())
}

/// Swap the current level. Dependent systems see the change and rebuild.
pub fn load_level(world: &mut World, name: &str) -> Result<(), String> {
    let level = {
        let level_db = world
            .get_resource::<LevelDatabase>()
            .ok_or_else(|| "No LevelDatabase resource".to_string())?;
        select_level(level_db, Some(name))?
    };
    info!("Loading level {}", level.name);
    world.insert_resource(level);
    Ok(())
}

/// Level database from the default levels file
pub fn load_default_level_db() -> LevelDatabase {
    LevelDatabase::load_from_file(LEVELS_FILE)
}
