//! Player entity lifecycle management.
//!
//! Unlike everything else in a level, the player actor is not level-scoped: it is spawned once
//! when play begins, repositioned at the start of every level, and only despawned when the game
//! returns to the menu.

use bevy::prelude::*;

use crate::config::Tuning;
use crate::cooldown::Cooldown;
use crate::health::Health;
use crate::level::{LevelOutcome, LevelSpawn};
use crate::loading::ModelRequest;
use crate::movement::{facing, Body, Capsule, MoveIntent};
use crate::projectile::{spawn_projectile, Shooter};
use crate::registry::LevelArena;
use crate::state::{GameSet, GameState};
use crate::visuals::Visual;

pub const PLAYER_MODEL: &str = "models/player.glb";

/// Registers the systems that despawn the player on the menu and run its combat each tick.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Menu), despawn_player)
            .add_systems(Update, player_shoot.in_set(GameSet::Combat))
            .add_systems(Update, detect_player_death.in_set(GameSet::Effects));
    }
}

/// Marker used by camera follow, AI targeting and collision queries. The entity carrying it is
/// the capsule; the visible model hangs off it as a child.
#[derive(Component)]
pub struct Player;

#[derive(Component, Debug, Clone)]
pub struct PlayerGun {
    pub cooldown: Cooldown,
}

/// Spawns the player actor if none exists yet. Later levels reuse the same entity.
pub fn ensure_player(
    mut commands: Commands,
    tuning: Res<Tuning>,
    existing: Query<(), With<Player>>,
) {
    if !existing.is_empty() {
        return;
    }

    let capsule = Capsule::default();
    commands
        .spawn((
            Name::new("Player"),
            Player,
            SpatialBundle::default(),
            capsule,
            Body::default(),
            MoveIntent::default(),
            Health::full(),
            PlayerGun {
                cooldown: Cooldown::new(tuning.movement.player_shot_cooldown),
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                Name::new("PlayerModel"),
                SpatialBundle::from_transform(Transform::from_xyz(0.0, -capsule.half_height, 0.0)),
                ModelRequest {
                    path: PLAYER_MODEL,
                    blocking: true,
                },
                Visual::Placeholder {
                    radius: capsule.radius,
                    half_height: capsule.half_height,
                    color: Color::srgb(0.3, 0.6, 0.95),
                },
            ));
        });

    info!("Spawned player actor.");
}

/// Moves the carried player onto the new level's spawn point with fresh state.
pub fn place_player_for_level(
    spawn: Res<LevelSpawn>,
    mut query: Query<(&mut Transform, &mut Body, &mut Health, &mut PlayerGun), With<Player>>,
) {
    for (mut transform, mut body, mut health, mut gun) in &mut query {
        transform.translation = spawn.position;
        transform.rotation = Quat::from_rotation_y(spawn.yaw);
        *body = Body::default();
        health.heal(Health::MAX);
        gun.cooldown.reset();
    }
}

fn despawn_player(mut commands: Commands, query: Query<Entity, With<Player>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn player_shoot(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<Tuning>,
    mut arena: ResMut<LevelArena>,
    mut query: Query<(&Transform, &Capsule, &MoveIntent, &mut PlayerGun), With<Player>>,
) {
    let now = time.elapsed_seconds_f64();

    for (transform, capsule, intent, mut gun) in &mut query {
        if !intent.shoot || !gun.cooldown.try_fire(now) {
            continue;
        }

        let direction = facing(transform.rotation);
        let origin = transform.translation
            + Vec3::Y * capsule.half_height * 0.5
            + direction * (capsule.radius + tuning.projectile.radius + 0.1);
        spawn_projectile(
            &mut commands,
            &mut arena,
            origin,
            direction,
            Shooter::Player,
            &tuning.projectile,
        );
    }
}

fn detect_player_death(
    tuning: Res<Tuning>,
    query: Query<(&Transform, &Health), With<Player>>,
    mut outcomes: EventWriter<LevelOutcome>,
) {
    for (transform, health) in &query {
        if health.is_depleted() {
            info!("Player was defeated.");
            outcomes.send(LevelOutcome::Failed);
        } else if transform.translation.y < tuning.movement.kill_plane {
            info!("Player fell out of the level.");
            outcomes.send(LevelOutcome::Failed);
        }
    }
}
