//! Background music. Each level spawns a level-scoped `LevelMusic` entity; this plugin attaches
//! a looping `AudioBundle` to it, so disposing the level stops and releases the track.
//!
//! A missing or undecodable track is reported once and otherwise ignored.

use bevy::asset::LoadState;
use bevy::audio::{AudioSinkPlayback, Volume};
use bevy::prelude::*;

use crate::state::GameState;

pub const VOLUME_STEP: f32 = 0.1;

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MusicVolume>()
            .add_systems(
                Update,
                (start_level_music, report_music_load, adjust_music_volume),
            )
            .add_systems(OnEnter(GameState::Paused), pause_music)
            .add_systems(OnExit(GameState::Paused), resume_music);
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct LevelMusic {
    pub path: &'static str,
}

/// Set once the track's load has resolved either way.
#[derive(Component)]
struct MusicChecked;

/// Master music volume in `[0, 1]`, kept across levels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MusicVolume(pub f32);

impl Default for MusicVolume {
    fn default() -> Self {
        Self(0.5)
    }
}

impl MusicVolume {
    pub fn step(&mut self, steps: i32) -> f32 {
        self.0 = (self.0 + steps as f32 * VOLUME_STEP).clamp(0.0, 1.0);
        self.0
    }
}

fn start_level_music(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    volume: Res<MusicVolume>,
    query: Query<(Entity, &LevelMusic), Added<LevelMusic>>,
) {
    for (entity, music) in &query {
        commands.entity(entity).insert(AudioBundle {
            source: asset_server.load(music.path),
            settings: PlaybackSettings::LOOP.with_volume(Volume::new(volume.0)),
        });
    }
}

fn report_music_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    query: Query<(Entity, &LevelMusic, &Handle<AudioSource>), Without<MusicChecked>>,
) {
    for (entity, music, handle) in &query {
        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => {
                debug!("Music '{}' playing.", music.path);
                commands.entity(entity).insert(MusicChecked);
            }
            Some(LoadState::Failed(_)) => {
                info!(
                    "Music '{}' unavailable; add it under assets/ to enable playback.",
                    music.path
                );
                commands.entity(entity).insert(MusicChecked);
            }
            _ => {}
        }
    }
}

fn adjust_music_volume(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut volume: ResMut<MusicVolume>,
    sinks: Query<&AudioSink, With<LevelMusic>>,
) {
    let mut steps = 0;
    if keyboard.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        steps += 1;
    }
    if keyboard.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        steps -= 1;
    }
    if steps == 0 {
        return;
    }

    let level = volume.step(steps);
    for sink in &sinks {
        sink.set_volume(level);
    }
    info!("Music volume {:.0}%.", level * 100.0);
}

fn pause_music(sinks: Query<&AudioSink, With<LevelMusic>>) {
    for sink in &sinks {
        sink.pause();
    }
}

fn resume_music(sinks: Query<&AudioSink, With<LevelMusic>>) {
    for sink in &sinks {
        sink.play();
    }
}
