//! Screen-space UI: main menu, pause overlay, HUD, dialog box and the transition fade.
//!
//! Everything here only reads gameplay resources (`HudState`, `DialogSequencer`,
//! `TransitionState`); the overlays are rebuilt from them each frame they change.

use bevy::prelude::*;

use crate::dialog::DialogSequencer;
use crate::hud::HudState;
use crate::level::LEVELS;
use crate::state::GameState;
use crate::transition::TransitionState;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_hud, spawn_dialog_box, spawn_fade_overlay))
            .add_systems(OnEnter(GameState::Menu), spawn_main_menu)
            .add_systems(OnExit(GameState::Menu), despawn_with::<MainMenu>)
            .add_systems(OnEnter(GameState::Paused), spawn_pause_menu)
            .add_systems(OnExit(GameState::Paused), despawn_with::<PauseMenu>)
            .add_systems(
                Update,
                (update_hud, update_dialog_box, update_fade_overlay),
            );
    }
}

#[derive(Component)]
struct MainMenu;

#[derive(Component)]
struct PauseMenu;

#[derive(Component)]
struct HudRoot;

#[derive(Component)]
enum HudText {
    Mission,
    Collectibles,
    Distance,
    Defeated,
}

#[derive(Component)]
struct HealthFill;

#[derive(Component)]
struct DialogBox;

#[derive(Component)]
struct DialogText;

#[derive(Component)]
struct FadeOverlay;

const TEXT_COLOR: Color = Color::srgba(0.9, 0.9, 0.9, 1.0);

fn text_style(font_size: f32) -> TextStyle {
    TextStyle {
        font_size,
        color: TEXT_COLOR,
        ..default()
    }
}

fn despawn_with<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

/// The menu has no level camera to draw on, so it brings its own.
fn spawn_main_menu(mut commands: Commands) {
    commands.spawn((MainMenu, Name::new("MenuCamera"), Camera2dBundle::default()));

    let mut lines = vec!["Maze Adventure".to_owned(), String::new()];
    lines.extend(
        LEVELS
            .iter()
            .enumerate()
            .map(|(index, level)| format!("[{}] {}", index + 1, level.name)),
    );
    lines.push(String::new());
    lines.push("Press Enter to start".to_owned());

    commands
        .spawn((
            MainMenu,
            Name::new("MainMenu"),
            NodeBundle {
                background_color: BackgroundColor(Color::srgb(0.04, 0.04, 0.08)),
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(
                TextBundle::from_section(lines.join("\n"), text_style(32.0))
                    .with_text_justify(JustifyText::Center),
            );
        });
}

fn spawn_pause_menu(mut commands: Commands) {
    commands
        .spawn((
            PauseMenu,
            Name::new("PauseMenu"),
            NodeBundle {
                background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                z_index: ZIndex::Global(10),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "Paused\nPress ESC to resume\n+/- music volume",
                text_style(36.0),
            ));
        });
}

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            HudRoot,
            Name::new("Hud"),
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    left: Val::Px(12.0),
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(6.0),
                    ..default()
                },
                visibility: Visibility::Hidden,
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((HudText::Mission, TextBundle::from_section("", text_style(24.0))));
            parent.spawn((HudText::Collectibles, TextBundle::from_section("", text_style(20.0))));
            parent.spawn((HudText::Distance, TextBundle::from_section("", text_style(20.0))));
            parent.spawn((HudText::Defeated, TextBundle::from_section("", text_style(20.0))));
            parent
                .spawn(NodeBundle {
                    style: Style {
                        width: Val::Px(200.0),
                        height: Val::Px(14.0),
                        ..default()
                    },
                    background_color: BackgroundColor(Color::srgb(0.2, 0.05, 0.05)),
                    ..default()
                })
                .with_children(|bar| {
                    bar.spawn((
                        HealthFill,
                        NodeBundle {
                            style: Style {
                                width: Val::Percent(100.0),
                                height: Val::Percent(100.0),
                                ..default()
                            },
                            background_color: BackgroundColor(Color::srgb(0.85, 0.15, 0.15)),
                            ..default()
                        },
                    ));
                });
        });
}

fn spawn_dialog_box(mut commands: Commands) {
    commands
        .spawn((
            DialogBox,
            Name::new("DialogBox"),
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(24.0),
                    left: Val::Percent(10.0),
                    width: Val::Percent(80.0),
                    padding: UiRect::all(Val::Px(16.0)),
                    ..default()
                },
                background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.75)),
                visibility: Visibility::Hidden,
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((DialogText, TextBundle::from_section("", text_style(24.0))));
        });
}

fn spawn_fade_overlay(mut commands: Commands) {
    commands.spawn((
        FadeOverlay,
        Name::new("FadeOverlay"),
        NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
            z_index: ZIndex::Global(100),
            ..default()
        },
    ));
}

fn update_hud(
    hud: Res<HudState>,
    state: Res<State<GameState>>,
    mut root: Query<&mut Visibility, With<HudRoot>>,
    mut texts: Query<(&mut Text, &HudText)>,
    mut fill: Query<&mut Style, With<HealthFill>>,
) {
    let shown = !matches!(state.get(), GameState::Menu);
    for mut visibility in &mut root {
        let wanted = if shown {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }

    if !hud.is_changed() {
        return;
    }

    for (mut text, kind) in &mut texts {
        let value = match kind {
            HudText::Mission => hud.mission.clone(),
            HudText::Collectibles => hud.collectible_text().unwrap_or_default(),
            HudText::Distance => hud.distance_text().unwrap_or_default(),
            HudText::Defeated => hud.defeated_text().unwrap_or_default(),
        };
        text.sections[0].value = value;
    }

    for mut style in &mut fill {
        style.width = Val::Percent(hud.health * 100.0);
    }
}

fn update_dialog_box(
    dialog: Res<DialogSequencer>,
    mut boxes: Query<&mut Visibility, With<DialogBox>>,
    mut texts: Query<&mut Text, With<DialogText>>,
) {
    if !dialog.is_changed() {
        return;
    }

    let visible = dialog.visible_text();
    for mut visibility in &mut boxes {
        *visibility = if visible.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    for mut text in &mut texts {
        text.sections[0].value = visible.clone().unwrap_or_default();
    }
}

fn update_fade_overlay(
    transition: Res<TransitionState>,
    mut overlay: Query<&mut BackgroundColor, With<FadeOverlay>>,
) {
    if !transition.is_changed() {
        return;
    }

    for mut color in &mut overlay {
        color.0 = Color::srgba(0.0, 0.0, 0.0, transition.fade_alpha());
    }
}
