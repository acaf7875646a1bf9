//! Main menu input: pick a level with the number keys or press Enter to start from the top.

use bevy::prelude::*;

use crate::level::{CurrentLevel, LEVELS};
use crate::state::GameState;
use crate::transition::TransitionState;

const LEVEL_KEYS: [KeyCode; 4] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
];

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, choose_level.run_if(in_state(GameState::Menu)));
    }
}

/// Level index selected by this frame's key presses, if any.
pub fn selected_level(keyboard: &ButtonInput<KeyCode>) -> Option<usize> {
    if keyboard.just_pressed(KeyCode::Enter) {
        return Some(0);
    }

    LEVEL_KEYS
        .iter()
        .take(LEVELS.len())
        .position(|key| keyboard.just_pressed(*key))
}

fn choose_level(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut current: ResMut<CurrentLevel>,
    mut transition: ResMut<TransitionState>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(index) = selected_level(&keyboard) else {
        return;
    };

    current.index = index;
    transition.reset();
    info!("Starting at level '{}'.", LEVELS[index].name);
    next_state.set(GameState::Loading);
}
