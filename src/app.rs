//! High-level plugin composition.
//!
//! `GameplayPlugin` is the whole simulation and runs headless; `PresentationPlugin` adds what
//! only makes sense with a window (meshes, imported models, audio, UI). `AdventurePlugin` is
//! both and is what the binary installs.

use bevy::prelude::*;

use crate::audio::GameAudioPlugin;
use crate::camera::CameraPlugin;
use crate::collectible::CollectiblePlugin;
use crate::collision::CollisionPlugin;
use crate::config::ConfigPlugin;
use crate::dialog::DialogPlugin;
use crate::enemy::EnemyPlugin;
use crate::hud::HudPlugin;
use crate::level::LevelPlugin;
use crate::loading::ModelLoadingPlugin;
use crate::menu::MenuPlugin;
use crate::movement::MovementPlugin;
use crate::player::PlayerPlugin;
use crate::projectile::ProjectilePlugin;
use crate::registry::{LevelArena, LevelLoop};
use crate::state::{pause_game_clock, resume_game_clock, toggle_pause, GameSet, GameState};
use crate::transition::TransitionPlugin;
use crate::ui::UiPlugin;
use crate::visuals::VisualsPlugin;

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<LevelArena>()
            .add_plugins((ConfigPlugin, CollisionPlugin, MovementPlugin, PlayerPlugin))
            .add_plugins((CollectiblePlugin, EnemyPlugin, ProjectilePlugin))
            .add_plugins((
                DialogPlugin,
                HudPlugin,
                LevelPlugin,
                TransitionPlugin,
                MenuPlugin,
                CameraPlugin,
            ))
            // One gameplay tick runs these in order, and only while a level's frame loop is
            // registered and the game is not paused or fading.
            .configure_sets(
                Update,
                (
                    GameSet::Input,
                    GameSet::Movement,
                    GameSet::Ai,
                    GameSet::Combat,
                    GameSet::Effects,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing))
                    .run_if(any_with_component::<LevelLoop>),
            )
            .add_systems(Update, toggle_pause)
            .add_systems(OnEnter(GameState::Paused), pause_game_clock)
            .add_systems(OnExit(GameState::Paused), resume_game_clock);
    }
}

pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((VisualsPlugin, ModelLoadingPlugin, GameAudioPlugin, UiPlugin));
    }
}

pub struct AdventurePlugin;

impl Plugin for AdventurePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((GameplayPlugin, PresentationPlugin));
    }
}
