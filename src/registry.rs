//! Per-level resource arena.
//!
//! Everything a level creates (geometry, lights, camera, music, enemies, projectiles, the frame
//! loop marker) is spawned through [`spawn_scoped`], which records the entity in `LevelArena`.
//! Teardown drains the arena in one pass. Handles to meshes, materials, scenes and audio are
//! stored on those entities, so their reference counts drop together with the level.

use bevy::prelude::*;

/// Tag carried by every entity owned by the active level.
#[derive(Component, Debug, Default)]
pub struct LevelScoped;

/// Registration of the per-frame gameplay loop. Exactly one exists while a level is active;
/// gameplay systems only run while it does.
#[derive(Component, Debug, Default)]
pub struct LevelLoop;

#[derive(Resource, Debug, Default)]
pub struct LevelArena {
    entities: Vec<Entity>,
}

impl LevelArena {
    pub fn adopt(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Forgets an entity that was despawned before teardown (a spent projectile, a pickup).
    pub fn release(&mut self, entity: Entity) {
        self.entities.retain(|owned| *owned != entity);
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.entities)
    }
}

/// Spawns `bundle` as a level-owned entity and returns its id.
pub fn spawn_scoped<B: Bundle>(commands: &mut Commands, arena: &mut LevelArena, bundle: B) -> Entity {
    let entity = commands.spawn((bundle, LevelScoped)).id();
    arena.adopt(entity);
    entity
}

/// Releases every entity the level registered. Entities that are already gone are skipped so a
/// partial teardown never aborts the rest.
pub fn dispose_level_arena(mut commands: Commands, mut arena: ResMut<LevelArena>) {
    if arena.is_empty() {
        return;
    }

    let mut disposed = 0usize;
    let mut missing = 0usize;
    for entity in arena.drain() {
        match commands.get_entity(entity) {
            Some(entity_commands) => {
                entity_commands.despawn_recursive();
                disposed += 1;
            }
            None => missing += 1,
        }
    }

    info!("Disposed level arena: {disposed} entities released, {missing} already gone.");
}
