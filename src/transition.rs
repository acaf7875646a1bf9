//! Level transition with a fade to black. When a level ends the screen fades out, the next level
//! is selected at the midpoint (when the screen is fully black) and the fade runs back in while
//! the new level loads.

use bevy::prelude::*;

use crate::level::{CurrentLevel, LEVELS};
use crate::state::GameState;

pub const FADE_DURATION: f32 = 1.0;

pub struct TransitionPlugin;

impl Plugin for TransitionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TransitionState>()
            .add_systems(Update, update_transition);
    }
}

/// What happens at the midpoint of the fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTarget {
    /// Move on to the next level, or back to the menu after the last one.
    Advance,
    /// Rebuild the current level from scratch.
    Restart,
}

/// Tracks the current transition state and timing.
#[derive(Resource, Debug)]
pub struct TransitionState {
    pub fade_timer: f32,
    pub fade_duration: f32,
    target: Option<TransitionTarget>,
    active: bool,
}

impl Default for TransitionState {
    fn default() -> Self {
        Self {
            fade_timer: 0.0,
            fade_duration: FADE_DURATION,
            target: None,
            active: false,
        }
    }
}

impl TransitionState {
    pub fn begin(&mut self, target: TransitionTarget) {
        self.active = true;
        self.fade_timer = 0.0;
        self.target = Some(target);
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.fade_timer = 0.0;
        self.target = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the current fade alpha (0.0 = transparent, 1.0 = fully black).
    pub fn fade_alpha(&self) -> f32 {
        if !self.active {
            return 0.0;
        }

        let half = self.fade_duration * 0.5;
        let alpha = if self.fade_timer < half {
            self.fade_timer / half
        } else {
            1.0 - (self.fade_timer - half) / half
        };
        alpha.clamp(0.0, 1.0)
    }

    /// Advances the fade. Yields the target exactly once, on the frame the midpoint is crossed.
    pub fn advance(&mut self, dt: f32) -> Option<TransitionTarget> {
        if !self.active {
            return None;
        }

        self.fade_timer += dt;
        let switched = if self.fade_timer >= self.fade_duration * 0.5 {
            self.target.take()
        } else {
            None
        };

        if self.fade_timer >= self.fade_duration {
            self.reset();
        }

        switched
    }
}

/// Index to load after `current` for the given target, or `None` when the game is over.
pub fn next_level_index(current: usize, target: TransitionTarget) -> Option<usize> {
    match target {
        TransitionTarget::Restart => Some(current),
        TransitionTarget::Advance => (current + 1 < LEVELS.len()).then_some(current + 1),
    }
}

fn update_transition(
    time: Res<Time>,
    mut transition: ResMut<TransitionState>,
    mut current: ResMut<CurrentLevel>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !transition.is_active() {
        return;
    }

    let Some(target) = transition.advance(time.delta_seconds()) else {
        return;
    };

    match next_level_index(current.index, target) {
        Some(index) => {
            current.index = index;
            next_state.set(GameState::Loading);
        }
        None => {
            info!("Final level finished; returning to the menu.");
            next_state.set(GameState::Menu);
        }
    }
}
