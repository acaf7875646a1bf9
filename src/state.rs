//! Global game state definitions. Switching states updates an enum value and triggers the
//! on-enter/on-exit schedules; level construction and teardown hang off those schedules.

use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

/// High-level state machine for the game loop.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Menu,
    /// A level is being constructed and its blocking models imported.
    Loading,
    Playing,
    Paused,
    /// The active level has finished; the fade overlay is running.
    Completing,
}

/// Named system sets that order one gameplay tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Movement,
    Ai,
    Combat,
    Effects,
}

/// `ESC` flips Playing and Paused. Menus, loading and the completion fade ignore it.
pub fn toggle_pause(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }

    match state.get() {
        GameState::Playing => next_state.set(GameState::Paused),
        GameState::Paused => next_state.set(GameState::Playing),
        GameState::Menu | GameState::Loading | GameState::Completing => {}
    }
}

/// Game time stands still while paused, so cooldowns and timers pick up where they stopped.
pub fn pause_game_clock(mut time: ResMut<Time<Virtual>>) {
    time.pause();
}

pub fn resume_game_clock(mut time: ResMut<Time<Virtual>>) {
    time.unpause();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn game_seconds(app: &App) -> f64 {
        app.world().resource::<Time<Virtual>>().elapsed_seconds_f64()
    }

    #[test]
    fn escape_toggles_pause_and_freezes_game_time() {
        let mut app = testing::sandbox_app();

        testing::tap(&mut app, KeyCode::Escape);
        app.update();
        assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::Paused);

        let frozen = game_seconds(&app);
        testing::run_for(&mut app, 1.0);
        assert_eq!(game_seconds(&app), frozen);

        testing::tap(&mut app, KeyCode::Escape);
        testing::run_for(&mut app, 0.5);
        assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::Playing);
        assert!(game_seconds(&app) > frozen);
    }
}
