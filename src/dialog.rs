//! Typewriter dialog.
//!
//! A session walks through its lines in order. Each line is revealed one character per tick
//! interval; once complete the continue hint is appended and the sequencer waits for Enter. The
//! press after the last line closes the session and emits `DialogFinished`.

use bevy::prelude::*;

use crate::config::{DialogTuning, Tuning};
use crate::state::GameSet;

pub const ADVANCE_KEY: KeyCode = KeyCode::Enter;

pub struct DialogPlugin;

impl Plugin for DialogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogSequencer>()
            .add_event::<DialogFinished>()
            .add_systems(Update, advance_dialog.in_set(GameSet::Input))
            .add_systems(Update, type_dialog.in_set(GameSet::Effects));
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogFinished;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    #[default]
    Idle,
    Typing { line: usize },
    AwaitingAdvance { line: usize },
}

/// Result of pressing the advance key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogStep {
    /// Nothing to advance: idle, or the current line is still typing.
    Ignored,
    NextLine(usize),
    Finished,
}

#[derive(Resource, Debug, Default)]
pub struct DialogSequencer {
    lines: Vec<String>,
    phase: DialogPhase,
    revealed: usize,
    /// Time banked towards the next character. There is only ever this one timer.
    elapsed: f32,
    char_interval: f32,
    hint: String,
}

impl DialogSequencer {
    /// Begins a new session, abandoning whatever was in progress. Returns false when there is
    /// nothing to show.
    pub fn start<I, S>(&mut self, lines: I, settings: &DialogTuning) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self.char_interval = settings.char_interval.max(f32::EPSILON);
        self.hint = settings.hint.clone();
        self.revealed = 0;
        self.elapsed = 0.0;
        self.phase = if self.lines.is_empty() {
            DialogPhase::Idle
        } else {
            DialogPhase::Typing { line: 0 }
        };

        self.is_active()
    }

    /// Drops the session without finishing it; no completion is reported.
    pub fn cancel(&mut self) {
        self.lines.clear();
        self.phase = DialogPhase::Idle;
        self.revealed = 0;
        self.elapsed = 0.0;
    }

    /// Advances the typewriter. Returns true if the visible text changed.
    pub fn tick(&mut self, dt: f32) -> bool {
        let DialogPhase::Typing { line } = self.phase else {
            return false;
        };

        let length = self.lines[line].chars().count();
        let before = self.revealed;
        self.elapsed += dt;

        // Tolerate float drift so a frame of exactly one interval reveals one character.
        while self.revealed < length && self.elapsed + 1e-4 >= self.char_interval {
            self.elapsed -= self.char_interval;
            self.revealed += 1;
        }

        if self.revealed >= length {
            self.phase = DialogPhase::AwaitingAdvance { line };
            self.elapsed = 0.0;
            return true;
        }

        self.revealed != before
    }

    pub fn press_advance(&mut self) -> DialogStep {
        let DialogPhase::AwaitingAdvance { line } = self.phase else {
            return DialogStep::Ignored;
        };

        let next = line + 1;
        if next < self.lines.len() {
            self.phase = DialogPhase::Typing { line: next };
            self.revealed = 0;
            self.elapsed = 0.0;
            DialogStep::NextLine(next)
        } else {
            self.cancel();
            DialogStep::Finished
        }
    }

    /// What the dialog box shows, or `None` when it is hidden.
    pub fn visible_text(&self) -> Option<String> {
        match self.phase {
            DialogPhase::Idle => None,
            DialogPhase::Typing { line } => {
                Some(self.lines[line].chars().take(self.revealed).collect())
            }
            DialogPhase::AwaitingAdvance { line } => {
                Some(format!("{}{}", self.lines[line], self.hint))
            }
        }
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != DialogPhase::Idle
    }
}

fn advance_dialog(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut dialog: ResMut<DialogSequencer>,
    mut finished: EventWriter<DialogFinished>,
) {
    if !keyboard.just_pressed(ADVANCE_KEY) || !dialog.is_active() {
        return;
    }

    if dialog.press_advance() == DialogStep::Finished {
        info!("Dialog finished.");
        finished.send(DialogFinished);
    }
}

fn type_dialog(time: Res<Time>, mut dialog: ResMut<DialogSequencer>) {
    if matches!(dialog.phase(), DialogPhase::Typing { .. }) {
        dialog.tick(time.delta_seconds());
    }
}

/// Starts a session using the configured pacing.
pub fn start_dialog(dialog: &mut DialogSequencer, tuning: &Tuning, lines: &[&str]) -> bool {
    dialog.start(lines.iter().copied(), &tuning.dialog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn typing_reveals_one_character_per_interval() {
        let settings = DialogTuning::default();
        let mut dialog = DialogSequencer::default();
        assert!(dialog.start(["Hey"], &settings));
        assert_eq!(dialog.visible_text().as_deref(), Some(""));

        dialog.tick(0.05);
        assert_eq!(dialog.visible_text().as_deref(), Some("H"));
        assert_eq!(dialog.press_advance(), DialogStep::Ignored);

        dialog.tick(0.12);
        assert_eq!(dialog.visible_text().as_deref(), Some("Hey [Enter]"));
        assert_eq!(dialog.phase(), DialogPhase::AwaitingAdvance { line: 0 });
    }

    #[test]
    fn restarting_discards_the_pending_timer() {
        let settings = DialogTuning::default();
        let mut dialog = DialogSequencer::default();
        dialog.start(["First line"], &settings);
        dialog.tick(0.04);

        dialog.start(["Second"], &settings);
        dialog.tick(0.02);
        assert_eq!(dialog.visible_text().as_deref(), Some(""));
    }

    #[test]
    fn empty_session_never_starts() {
        let mut dialog = DialogSequencer::default();
        assert!(!dialog.start(Vec::<String>::new(), &DialogTuning::default()));
        assert_eq!(dialog.visible_text(), None);
        assert_eq!(dialog.press_advance(), DialogStep::Ignored);
    }

    #[test]
    fn two_line_dialog_completes_exactly_once() {
        let mut app = testing::sandbox_app();
        let tuning = app.world().resource::<Tuning>().clone();
        app.world_mut()
            .resource_mut::<DialogSequencer>()
            .start(["A", "B"], &tuning.dialog);

        let mut reader = app
            .world()
            .resource::<Events<DialogFinished>>()
            .get_reader();
        let mut finished = 0;
        let mut count = |app: &App| {
            finished += reader
                .read(app.world().resource::<Events<DialogFinished>>())
                .count();
            finished
        };

        app.update();
        assert_eq!(
            app.world().resource::<DialogSequencer>().visible_text().as_deref(),
            Some("A [Enter]")
        );

        testing::tap(&mut app, ADVANCE_KEY);
        assert_eq!(
            app.world().resource::<DialogSequencer>().visible_text().as_deref(),
            Some("B [Enter]")
        );
        assert_eq!(count(&app), 0);

        testing::tap(&mut app, ADVANCE_KEY);
        assert_eq!(app.world().resource::<DialogSequencer>().visible_text(), None);
        assert_eq!(count(&app), 1);

        testing::tap(&mut app, ADVANCE_KEY);
        app.update();
        assert_eq!(count(&app), 1);
    }
}
