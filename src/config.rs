//! Gameplay tuning and the shared random source.
//!
//! Every constant the simulation depends on lives in the `Tuning` resource so systems read it
//! through the ECS instead of reaching for globals. Native builds may override the defaults with
//! `assets/tuning.ron`; a missing file is normal, a broken one is logged and ignored.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use thiserror::Error;

pub const TUNING_PATH: &str = "assets/tuning.ron";

/// Installs `Tuning` and `GameRng` unless the app already provides them (tests do).
pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Tuning>() {
            #[cfg(not(target_arch = "wasm32"))]
            let tuning = Tuning::load_or_default(TUNING_PATH);
            #[cfg(target_arch = "wasm32")]
            let tuning = Tuning::default();

            app.insert_resource(tuning);
        }

        if !app.world().contains_resource::<GameRng>() {
            app.insert_resource(GameRng::from_entropy());
        }
    }
}

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub movement: MovementTuning,
    pub enemy: EnemyTuning,
    pub projectile: ProjectileTuning,
    pub dialog: DialogTuning,
    pub placement: PlacementTuning,
}

impl Tuning {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let text = fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }

    /// Reads `path` when it exists. Any failure keeps the built-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(path) {
            Ok(tuning) => {
                info!("Loaded tuning overrides from '{}'.", path.display());
                tuning
            }
            Err(err) => {
                warn!("{err}; using default tuning.");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub move_speed: f32,
    /// Radians per second while a rotate key is held.
    pub rotate_speed: f32,
    /// Per-frame decay applied to horizontal velocity while airborne.
    pub air_damping: f32,
    pub air_control: f32,
    pub jump_impulse: f32,
    pub jump_velocity_threshold: f32,
    pub gravity: f32,
    pub terminal_velocity: f32,
    pub ground_probe: f32,
    pub forward_probe: f32,
    pub player_shot_cooldown: f32,
    pub kill_plane: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            rotate_speed: 2.5,
            air_damping: 0.98,
            air_control: 8.0,
            jump_impulse: 7.0,
            jump_velocity_threshold: 0.1,
            gravity: 20.0,
            terminal_velocity: 40.0,
            ground_probe: 0.15,
            forward_probe: 0.5,
            player_shot_cooldown: 0.35,
            kill_plane: -25.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub assign_radius: f32,
    pub guard_radius: f32,
    pub speed: f32,
    pub jitter: f32,
    pub wander_speed: f32,
    pub shot_cooldown: f32,
    pub sight_range: f32,
    pub guards_per_collectible: usize,
    pub guard_spawn_offset: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            assign_radius: 10.0,
            guard_radius: 5.0,
            speed: 3.0,
            jitter: 0.4,
            wander_speed: 2.0,
            shot_cooldown: 2.0,
            sight_range: 40.0,
            guards_per_collectible: 2,
            guard_spawn_offset: 1.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub enemy_speed: f32,
    pub player_speed: f32,
    pub damage: f32,
    /// Distance from the origin past which a projectile is discarded.
    pub bound: f32,
    pub player_lifetime: Option<f32>,
    pub enemy_lifetime: Option<f32>,
    pub radius: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            enemy_speed: 14.0,
            player_speed: 28.0,
            damage: 50.0,
            bound: 1000.0,
            player_lifetime: Some(3.0),
            enemy_lifetime: None,
            radius: 0.25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DialogTuning {
    /// Seconds between revealed characters.
    pub char_interval: f32,
    pub hint: String,
}

impl Default for DialogTuning {
    fn default() -> Self {
        Self {
            char_interval: 0.05,
            hint: " [Enter]".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacementTuning {
    pub max_attempts: usize,
    pub min_spacing: f32,
    pub spawn_clearance: f32,
    pub pickup_radius: f32,
}

impl Default for PlacementTuning {
    fn default() -> Self {
        Self {
            max_attempts: 1000,
            min_spacing: 6.0,
            spawn_clearance: 8.0,
            pickup_radius: 0.8,
        }
    }
}

/// Seeded random source shared by generators, placement and AI jitter.
#[derive(Resource, Deref, DerefMut)]
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}
