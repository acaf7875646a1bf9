//! Headless harness shared by system-level tests.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use crate::app::GameplayPlugin;
use crate::collision::StaticCollider;
use crate::config::{GameRng, Tuning};
use crate::health::Health;
use crate::loading::{ModelFailed, ModelReady, ModelRequest};
use crate::movement::Capsule;
use crate::player::Player;
use crate::registry::LevelLoop;
use crate::state::GameState;

pub const FRAME: f32 = 0.05;

/// Gameplay without rendering, window or asset server. Every update advances time by `FRAME`.
pub fn headless_app(seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(FRAME)))
        .insert_resource(Tuning::default())
        .insert_resource(GameRng::seeded(seed))
        .init_resource::<ButtonInput<KeyCode>>()
        .add_plugins(GameplayPlugin);
    app.update();
    app
}

/// An empty, already running level: a frame loop exists and the state is `Playing`, but there
/// is no geometry, player or level definition behind it.
pub fn sandbox_app() -> App {
    let mut app = headless_app(7);
    app.world_mut().spawn(LevelLoop);
    set_state(&mut app, GameState::Playing);
    app
}

pub fn set_state(app: &mut App, state: GameState) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(state);
    app.update();
}

pub fn run_for(app: &mut App, seconds: f32) {
    let frames = (seconds / FRAME).ceil() as usize;
    for _ in 0..frames {
        app.update();
    }
}

/// Without the input plugin nothing clears the key state, so a pressed key stays held.
pub fn hold(app: &mut App, key: KeyCode) {
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(key);
}

pub fn release(app: &mut App, key: KeyCode) {
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .release(key);
}

/// One press visible as `just_pressed` for exactly one update.
pub fn tap(app: &mut App, key: KeyCode) {
    hold(app, key);
    app.update();
    let mut keyboard = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
    keyboard.release(key);
    keyboard.clear();
}

/// Stands in for the asset server: every outstanding model request resolves as loaded.
pub fn resolve_models(app: &mut App) {
    let world = app.world_mut();
    let pending: Vec<Entity> = world
        .query_filtered::<Entity, (With<ModelRequest>, Without<ModelReady>, Without<ModelFailed>)>()
        .iter(world)
        .collect();
    for entity in pending {
        world.entity_mut(entity).insert(ModelReady);
    }
}

/// A player target without a body: it never moves on its own.
pub fn spawn_bare_player(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Player,
            Transform::from_translation(position),
            Capsule::default(),
            Health::full(),
        ))
        .id()
}

pub fn add_wall(app: &mut App, center: Vec3, half_extents: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(center),
            StaticCollider { half_extents },
        ))
        .id()
}

pub fn player_entity(app: &mut App) -> Entity {
    let world = app.world_mut();
    world
        .query_filtered::<Entity, With<Player>>()
        .single(world)
}
