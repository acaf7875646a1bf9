//! Projectiles fired by the player and by enemies.
//!
//! Each tick a projectile moves along its velocity, then the first applicable fate wins: a wall
//! between its old and new position (enemy shots only), a live target, lifetime expiry, or
//! leaving the playable bound. The projectile is marked spent before its despawn is queued, so
//! it can never be disposed twice.

use bevy::prelude::*;

use crate::collision::{Aabb3, CollisionWorld};
use crate::config::{ProjectileTuning, Tuning};
use crate::enemy::{Enemy, ENEMY_HALF_EXTENTS};
use crate::health::Health;
use crate::movement::Capsule;
use crate::player::Player;
use crate::registry::{spawn_scoped, LevelArena};
use crate::state::GameSet;
use crate::visuals::Visual;

pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EnemyDefeated>()
            .add_systems(Update, update_projectiles.in_set(GameSet::Combat));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shooter {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileFate {
    Expired,
    OutOfBounds,
    HitWall,
    HitTarget(Entity),
}

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub velocity: Vec3,
    /// Seconds left to live; `None` flies until it hits something or leaves the bound.
    pub lifetime: Option<f32>,
    pub shooter: Shooter,
    pub damage: f32,
    spent: bool,
}

impl Projectile {
    pub fn new(velocity: Vec3, lifetime: Option<f32>, shooter: Shooter, damage: f32) -> Self {
        Self {
            velocity,
            lifetime,
            shooter,
            damage,
            spent: false,
        }
    }

    pub fn advance(&mut self, position: &mut Vec3, dt: f32) {
        *position += self.velocity * dt;
        if let Some(lifetime) = self.lifetime.as_mut() {
            *lifetime -= dt;
        }
    }

    pub fn expiry(&self, position: Vec3, bound: f32) -> Option<ProjectileFate> {
        if self.lifetime.is_some_and(|lifetime| lifetime <= 0.0) {
            return Some(ProjectileFate::Expired);
        }
        if position.length() > bound {
            return Some(ProjectileFate::OutOfBounds);
        }
        None
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Marks the projectile as disposed. Only the first call returns true.
    pub fn spend(&mut self) -> bool {
        !std::mem::replace(&mut self.spent, true)
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyDefeated {
    pub entity: Entity,
}

pub fn spawn_projectile(
    commands: &mut Commands,
    arena: &mut LevelArena,
    origin: Vec3,
    direction: Vec3,
    shooter: Shooter,
    tuning: &ProjectileTuning,
) -> Entity {
    let (speed, lifetime, color) = match shooter {
        Shooter::Player => (
            tuning.player_speed,
            tuning.player_lifetime,
            Color::srgb(0.4, 0.9, 1.0),
        ),
        Shooter::Enemy => (
            tuning.enemy_speed,
            tuning.enemy_lifetime,
            Color::srgb(1.0, 0.35, 0.2),
        ),
    };

    spawn_scoped(
        commands,
        arena,
        (
            Name::new("Projectile"),
            SpatialBundle::from_transform(Transform::from_translation(origin)),
            Projectile::new(
                direction.normalize_or_zero() * speed,
                lifetime,
                shooter,
                tuning.damage,
            ),
            Visual::orb(tuning.radius, color, 6.0),
        ),
    )
}

/// Swept test of a projectile's frame segment against a target box.
fn segment_hits(from: Vec3, to: Vec3, center: Vec3, half: Vec3) -> bool {
    let target = Aabb3::from_center_half(center, half);
    let delta = to - from;
    let length = delta.length();
    if length <= f32::EPSILON {
        return target.contains_point(to);
    }
    target.ray_hit(from, delta / length, length).is_some()
}

#[allow(clippy::too_many_arguments, clippy::type_complexity)]
fn update_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<Tuning>,
    world: Res<CollisionWorld>,
    mut arena: ResMut<LevelArena>,
    mut projectiles: Query<(Entity, &mut Transform, &mut Projectile)>,
    mut players: Query<
        (Entity, &Transform, &Capsule, &mut Health),
        (With<Player>, Without<Projectile>),
    >,
    mut enemies: Query<
        (Entity, &Transform, &mut Health),
        (With<Enemy>, Without<Projectile>, Without<Player>),
    >,
    mut defeated: EventWriter<EnemyDefeated>,
) {
    let dt = time.delta_seconds();
    let settings = &tuning.projectile;
    let padding = Vec3::splat(settings.radius);

    for (entity, mut transform, mut projectile) in &mut projectiles {
        if projectile.is_spent() {
            continue;
        }

        let from = transform.translation;
        projectile.advance(&mut transform.translation, dt);
        let to = transform.translation;

        let impact = match projectile.shooter {
            Shooter::Enemy => {
                if world.is_blocked(from, to) {
                    Some(ProjectileFate::HitWall)
                } else {
                    players
                        .iter()
                        .find(|(_, target, capsule, health)| {
                            !health.is_depleted()
                                && segment_hits(
                                    from,
                                    to,
                                    target.translation,
                                    capsule.half_extents() + padding,
                                )
                        })
                        .map(|(target, ..)| ProjectileFate::HitTarget(target))
                }
            }
            Shooter::Player => enemies
                .iter()
                .find(|(_, target, health)| {
                    !health.is_depleted()
                        && segment_hits(from, to, target.translation, ENEMY_HALF_EXTENTS + padding)
                })
                .map(|(target, ..)| ProjectileFate::HitTarget(target)),
        };

        let Some(fate) = impact.or_else(|| projectile.expiry(to, settings.bound)) else {
            continue;
        };

        if !projectile.spend() {
            continue;
        }

        if let ProjectileFate::HitTarget(target) = fate {
            match projectile.shooter {
                Shooter::Enemy => {
                    if let Ok((_, _, _, mut health)) = players.get_mut(target) {
                        let remaining = health.reduce(projectile.damage);
                        debug!("Player hit, {remaining} health left.");
                    }
                }
                Shooter::Player => {
                    if let Ok((_, _, mut health)) = enemies.get_mut(target) {
                        let was_alive = !health.is_depleted();
                        health.reduce(projectile.damage);
                        if was_alive && health.is_depleted() {
                            commands.entity(target).despawn_recursive();
                            arena.release(target);
                            defeated.send(EnemyDefeated { entity: target });
                            debug!("Enemy {target:?} defeated.");
                        }
                    }
                }
            }
        }

        commands.entity(entity).despawn_recursive();
        arena.release(entity);
    }
}
