//! Application entry point: composes the Bevy runtime, the window, and `AdventurePlugin`.

mod ai;
mod app;
mod audio;
mod camera;
mod collectible;
mod collision;
mod config;
mod cooldown;
mod dialog;
mod enemy;
mod health;
mod hud;
mod level;
mod loading;
mod maze;
mod menu;
mod movement;
mod platforms;
mod player;
mod projectile;
mod registry;
mod state;
mod transition;
mod ui;
mod visuals;

#[cfg(test)]
mod testing;

use app::AdventurePlugin;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::window::{Window, WindowResizeConstraints, WindowResolution};

fn main() {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    console_error_panic_hook::set_once();

    let primary_window = Window {
        title: "Maze Adventure".to_string(),
        resolution: WindowResolution::new(1280.0, 720.0),
        resizable: true,
        resize_constraints: WindowResizeConstraints {
            min_width: 640.0,
            min_height: 360.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        },
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    // Hot reload of models and music only makes sense on desktop.
    let default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(cfg!(not(target_arch = "wasm32"))),
            ..default()
        });

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.04)))
        .add_plugins(default_plugins)
        .add_plugins(AdventurePlugin)
        .run();
}
