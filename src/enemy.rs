use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::ai::run_enemy_ai;
use crate::config::EnemyTuning;
use crate::cooldown::Cooldown;
use crate::health::Health;
use crate::loading::ModelRequest;
use crate::registry::{spawn_scoped, LevelArena};
use crate::state::GameSet;
use crate::visuals::Visual;

pub const ENEMY_MODEL: &str = "models/enemy.glb";
pub const ENEMY_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 0.9, 0.5);

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, run_enemy_ai.in_set(GameSet::Ai));
    }
}

/// How an enemy is placed. Once spawned, every enemy runs the same AI: it guards whatever
/// collectible is close enough and wanders otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyBehavior {
    /// Spawned next to a collectible.
    Guard,
    /// Spawned on a random open cell.
    Wander,
}

impl EnemyBehavior {
    fn label(self) -> &'static str {
        match self {
            Self::Guard => "Guard",
            Self::Wander => "Wanderer",
        }
    }

    fn color(self) -> Color {
        match self {
            Self::Guard => Color::srgb(0.85, 0.2, 0.25),
            Self::Wander => Color::srgb(0.7, 0.3, 0.75),
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub gun: Cooldown,
}

impl Enemy {
    pub fn new(shot_cooldown: f32) -> Self {
        Self {
            gun: Cooldown::new(shot_cooldown),
        }
    }
}

pub fn spawn_enemy(
    commands: &mut Commands,
    arena: &mut LevelArena,
    position: Vec3,
    behavior: EnemyBehavior,
    tuning: &EnemyTuning,
) -> Entity {
    spawn_scoped(
        commands,
        arena,
        (
            Name::new(behavior.label()),
            Enemy::new(tuning.shot_cooldown),
            Health::full(),
            SpatialBundle::from_transform(Transform::from_translation(position)),
            ModelRequest {
                path: ENEMY_MODEL,
                blocking: false,
            },
            Visual::Placeholder {
                radius: ENEMY_HALF_EXTENTS.x,
                half_height: ENEMY_HALF_EXTENTS.y,
                color: behavior.color(),
            },
        ),
    )
}

/// Evenly spaced ring of spawn points around a guarded position, at standing height.
pub fn guard_ring(center: Vec3, count: usize, radius: f32) -> Vec<Vec3> {
    (0..count)
        .map(|index| {
            let angle = TAU * index as f32 / count.max(1) as f32;
            Vec3::new(
                center.x + radius * angle.cos(),
                ENEMY_HALF_EXTENTS.y,
                center.z + radius * angle.sin(),
            )
        })
        .collect()
}
