//! Actor spawning - player and enemies from level spawn points

use bevy::prelude::*;

use crate::ai::{AiController, AiProfile, AiProfileDatabase, BehaviorKind, InputState};
use crate::levels::TileLevel;
use crate::player::{Enemy, KinematicBody, Player, Weapon};
use crate::world::TileOracle;

/// Marker for entities that belong to the current level
#[derive(Component)]
pub struct LevelActor;

/// Name of the level whose actors are currently spawned
#[derive(Resource, Default, Debug)]
pub struct SpawnedLevel(pub Option<String>);

/// Spawn the player and every enemy the level lists. Returns the number of
/// enemies spawned.
pub fn spawn_level_actors(
    commands: &mut Commands,
    level: &TileLevel,
    profile_db: &AiProfileDatabase,
) -> usize {
    let grid_size = level.grid_size();

    if let Some(tile) = level.player_spawn {
        commands.spawn((
            Player,
            KinematicBody::at_tile(tile, grid_size),
            InputState::default(),
            LevelActor,
        ));
    }

    for (index, spawn) in level.enemy_spawns.iter().enumerate() {
        let profile = profile_db.get_by_name(&spawn.profile).cloned().unwrap_or_else(|| {
            warn!(
                "Unknown AI profile '{}' in level {}, using default",
                spawn.profile, level.name
            );
            AiProfile::default()
        });

        let mut enemy = commands.spawn((
            Enemy {
                profile: profile.name.clone(),
            },
            AiController::from_profile(&profile, index as u64),
            KinematicBody::at_tile(spawn.tile, grid_size),
            InputState::default(),
            LevelActor,
        ));
        if profile.behavior == BehaviorKind::Shooter {
            enemy.insert(Weapon::default());
        }
    }

    level.enemy_spawns.len()
}

/// Despawn the old level's actors and spawn the new ones whenever the
/// current level changes
pub fn respawn_on_level_change(
    mut commands: Commands,
    level: Res<TileLevel>,
    profile_db: Res<AiProfileDatabase>,
    mut spawned: ResMut<SpawnedLevel>,
    actors: Query<Entity, With<LevelActor>>,
) {
    if !level.is_changed() && spawned.0.as_deref() == Some(level.name.as_str()) {
        return;
    }

    for entity in &actors {
        commands.entity(entity).despawn();
    }
    let enemies = spawn_level_actors(&mut commands, &level, &profile_db);
    info!("Spawned level {} with {} enemies", level.name, enemies);
    spawned.0 = Some(level.name.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelDatabase;

    #[test]
    fn test_spawns_player_and_enemies() {
        let mut app = App::new();
        let level = LevelDatabase::parse(
            "level: Yard\n\
             enemy: Shooter 4 1\n\
             grid:\n\
             ########\n\
             ........\n\
             .P....E.\n\
             ########\n\
             end\n",
        )
        .levels
        .remove(0);
        app.insert_resource(level);
        app.insert_resource(AiProfileDatabase::builtin());
        app.init_resource::<SpawnedLevel>();
        app.add_systems(Update, respawn_on_level_change);
        app.update();

        let world = app.world_mut();
        assert_eq!(world.query::<&Player>().iter(world).count(), 1);
        assert_eq!(world.query::<&Enemy>().iter(world).count(), 2);
        assert_eq!(world.query::<&Weapon>().iter(world).count(), 1);
        assert_eq!(
            world.resource::<SpawnedLevel>().0.as_deref(),
            Some("Yard")
        );

        // No change, no respawn
        app.update();
        let world = app.world_mut();
        assert_eq!(world.query::<&LevelActor>().iter(world).count(), 3);
    }
}
