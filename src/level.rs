//! Level orchestration: the level table, construction, readiness, goals and outcomes.
//!
//! A level moves through `Loading -> Active -> Completing -> Disposed`. Entering
//! `GameState::Loading` disposes whatever the previous level registered and then builds the next
//! one synchronously. Geometry needs no imports, so only the blocking model requests hold the
//! level in `Loading`; once they resolve the single `LevelLoop` is spawned and play begins.

use std::f32::consts::PI;

use bevy::prelude::*;

use crate::ai::horizontal_distance;
use crate::audio::LevelMusic;
use crate::camera::{FollowCamera, LevelCamera};
use crate::collectible::{spawn_collectible, CollectibleTally};
use crate::collision::StaticCollider;
use crate::config::{GameRng, Tuning};
use crate::dialog::{start_dialog, DialogFinished, DialogSequencer};
use crate::enemy::{guard_ring, spawn_enemy, EnemyBehavior, ENEMY_HALF_EXTENTS};
use crate::hud::HudState;
use crate::loading::blocking_models_resolved;
use crate::maze::{sample_open_position, MazeLayout, CELL_SIZE, WALL_HEIGHT};
use crate::movement::Capsule;
use crate::platforms::{PlatformCourse, TARGET_RADIUS};
use crate::player::{ensure_player, place_player_for_level, Player};
use crate::registry::{dispose_level_arena, spawn_scoped, LevelArena, LevelLoop};
use crate::state::{GameSet, GameState};
use crate::transition::{TransitionState, TransitionTarget};
use crate::visuals::Visual;

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentLevel>()
            .init_resource::<LevelSpawn>()
            .init_resource::<LevelGoal>()
            .add_event::<LevelOutcome>()
            .add_systems(
                OnEnter(GameState::Loading),
                (
                    dispose_level_arena,
                    finish_teardown,
                    ensure_player,
                    build_level,
                    place_player_for_level,
                )
                    .chain(),
            )
            .add_systems(
                OnEnter(GameState::Menu),
                (dispose_level_arena, finish_teardown).chain(),
            )
            .add_systems(
                Update,
                monitor_level_loading
                    .run_if(in_state(GameState::Loading).and_then(blocking_models_resolved)),
            )
            .add_systems(Update, evaluate_level_goal.in_set(GameSet::Effects))
            .add_systems(
                Update,
                resolve_level_outcome
                    .after(GameSet::Effects)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

#[derive(Debug, Clone, Copy)]
pub enum LevelKind {
    /// A closed room; the level ends when its dialog has been read.
    Narrative {
        room: &'static [&'static str],
        lines: &'static [&'static str],
    },
    /// A carved maze; the level ends when every orb is collected.
    Maze {
        cells_x: usize,
        cells_z: usize,
        collectibles: usize,
        wanderers: usize,
    },
    /// A climb over floating platforms; the level ends on reaching the top pad.
    Platforms { count: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct LevelDef {
    pub name: &'static str,
    pub mission: &'static str,
    pub music: &'static str,
    pub kind: LevelKind,
}

const ROOM: &[&str] = &[
    "#########",
    "#.......#",
    "#.......#",
    "#.......#",
    "#.......#",
    "#.......#",
    "#########",
];

pub static LEVELS: [LevelDef; 4] = [
    LevelDef {
        name: "Intro",
        mission: "Listen to the keeper.",
        music: "audio/intro.ogg",
        kind: LevelKind::Narrative {
            room: ROOM,
            lines: &[
                "You wake up in a stone room with no door.",
                "The keeper says the orbs below hold the way out.",
                "Collect every one of them, and do not trust the guards.",
            ],
        },
    },
    LevelDef {
        name: "Labyrinth",
        mission: "Collect every orb.",
        music: "audio/labyrinth.ogg",
        kind: LevelKind::Maze {
            cells_x: 7,
            cells_z: 7,
            collectibles: 4,
            wanderers: 3,
        },
    },
    LevelDef {
        name: "Ascent",
        mission: "Climb to the beacon.",
        music: "audio/ascent.ogg",
        kind: LevelKind::Platforms { count: 10 },
    },
    LevelDef {
        name: "Epilogue",
        mission: "Rest.",
        music: "audio/intro.ogg",
        kind: LevelKind::Narrative {
            room: ROOM,
            lines: &[
                "The beacon hums and the walls fall quiet.",
                "You made it out. Thanks for playing.",
            ],
        },
    },
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    Loading,
    Active,
    Completing,
    #[default]
    Disposed,
}

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct CurrentLevel {
    pub index: usize,
    pub phase: LevelPhase,
    /// Bumped on every build, restarts included.
    pub generation: u32,
}

impl CurrentLevel {
    pub fn def(&self) -> &'static LevelDef {
        &LEVELS[self.index.min(LEVELS.len() - 1)]
    }
}

/// Where the carried player is placed when the level starts.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct LevelSpawn {
    pub position: Vec3,
    pub yaw: f32,
}

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub enum LevelGoal {
    #[default]
    None,
    CollectAll,
    Reach { target: Vec3, radius: f32 },
    FinishDialog,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    Completed,
    Failed,
}

fn finish_teardown(
    mut current: ResMut<CurrentLevel>,
    mut goal: ResMut<LevelGoal>,
    mut dialog: ResMut<DialogSequencer>,
    mut hud: ResMut<HudState>,
) {
    current.phase = LevelPhase::Disposed;
    *goal = LevelGoal::None;
    dialog.cancel();
    *hud = HudState::default();
}

#[allow(clippy::too_many_arguments)]
fn build_level(
    mut commands: Commands,
    tuning: Res<Tuning>,
    mut rng: ResMut<GameRng>,
    mut arena: ResMut<LevelArena>,
    mut current: ResMut<CurrentLevel>,
    mut spawn: ResMut<LevelSpawn>,
    mut goal: ResMut<LevelGoal>,
    mut tally: ResMut<CollectibleTally>,
    mut hud: ResMut<HudState>,
) {
    let def = current.def();
    current.phase = LevelPhase::Loading;
    current.generation += 1;
    tally.reset(0);
    hud.set_mission(def.mission);

    let capsule = Capsule::default();
    let stand = Vec3::Y * (capsule.half_height + 0.05);

    match def.kind {
        LevelKind::Narrative { room, .. } => {
            let layout = MazeLayout::from_rows(room);
            spawn_layout(&mut commands, &mut arena, &layout);
            let center = layout.cell_center(layout.width() / 2, layout.depth() / 2);
            *spawn = LevelSpawn {
                position: center + stand,
                yaw: 0.0,
            };
            *goal = LevelGoal::FinishDialog;
        }
        LevelKind::Maze {
            cells_x,
            cells_z,
            collectibles,
            wanderers,
        } => {
            let layout = MazeLayout::carve(cells_x, cells_z, &mut rng.0);
            spawn_layout(&mut commands, &mut arena, &layout);
            let start = layout.cell_center(1, 1);
            *spawn = LevelSpawn {
                position: start + stand,
                yaw: PI,
            };

            let placement = &tuning.placement;
            let mut placed: Vec<Vec3> = Vec::with_capacity(collectibles);
            for _ in 0..collectibles {
                let candidate =
                    sample_open_position(&layout, &mut rng.0, placement.max_attempts, |p| {
                        p.distance(start) >= placement.spawn_clearance
                            && placed.iter().all(|other| p.distance(*other) >= placement.min_spacing)
                    });
                match candidate {
                    Some(position) => placed.push(position),
                    None => warn!(
                        "No room for another orb after {} attempts; placed {}.",
                        placement.max_attempts,
                        placed.len()
                    ),
                }
            }

            for position in &placed {
                let orb = *position + Vec3::Y;
                spawn_collectible(&mut commands, &mut arena, orb);
                for post in guard_ring(orb, tuning.enemy.guards_per_collectible, tuning.enemy.guard_spawn_offset) {
                    spawn_enemy(&mut commands, &mut arena, post, EnemyBehavior::Guard, &tuning.enemy);
                }
            }

            for _ in 0..wanderers {
                let Some(cell) =
                    sample_open_position(&layout, &mut rng.0, placement.max_attempts, |p| {
                        p.distance(start) >= placement.spawn_clearance
                    })
                else {
                    warn!("No room left for a wandering enemy.");
                    break;
                };
                let position = Vec3::new(cell.x, ENEMY_HALF_EXTENTS.y, cell.z);
                spawn_enemy(&mut commands, &mut arena, position, EnemyBehavior::Wander, &tuning.enemy);
            }

            if placed.is_empty() {
                warn!("Maze has no orbs; the level completes as soon as it starts.");
            }
            tally.reset(placed.len() as u32);
            *goal = LevelGoal::CollectAll;
        }
        LevelKind::Platforms { count } => {
            let course = PlatformCourse::generate(count, &mut rng.0);
            for (index, platform) in course.platforms.iter().enumerate() {
                let shade = 0.35 + 0.4 * index as f32 / course.platforms.len() as f32;
                spawn_scoped(
                    &mut commands,
                    &mut arena,
                    (
                        Name::new(format!("Platform{index}")),
                        SpatialBundle::from_transform(Transform::from_translation(platform.center)),
                        StaticCollider::from_size(platform.size),
                        Visual::block(platform.size * 0.5, Color::srgb(shade, shade, 0.5)),
                    ),
                );
            }

            spawn_scoped(
                &mut commands,
                &mut arena,
                (
                    Name::new("GoalBeacon"),
                    SpatialBundle::from_transform(Transform::from_translation(
                        course.target + Vec3::Y * 1.5,
                    )),
                    Visual::orb(0.5, Color::srgb(0.3, 1.0, 0.6), 12.0),
                ),
            );

            *spawn = LevelSpawn {
                position: course.start + stand,
                yaw: 0.0,
            };
            *goal = LevelGoal::Reach {
                target: course.target,
                radius: TARGET_RADIUS,
            };
        }
    }

    let eye = spawn.position + Vec3::new(0.0, 4.0, 8.0);
    spawn_scoped(
        &mut commands,
        &mut arena,
        (
            Name::new("LevelCamera"),
            LevelCamera,
            FollowCamera::default(),
            Camera3dBundle {
                transform: Transform::from_translation(eye).looking_at(spawn.position, Vec3::Y),
                ..default()
            },
        ),
    );

    spawn_scoped(
        &mut commands,
        &mut arena,
        (
            Name::new("Sun"),
            DirectionalLightBundle {
                directional_light: DirectionalLight {
                    illuminance: 6_000.0,
                    shadows_enabled: true,
                    ..default()
                },
                transform: Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
                ..default()
            },
        ),
    );

    spawn_scoped(
        &mut commands,
        &mut arena,
        (Name::new("LevelMusic"), LevelMusic { path: def.music }),
    );

    info!(
        "Built level '{}' (generation {}), {} entities registered.",
        def.name,
        current.generation,
        arena.len()
    );
}

/// Ground slab under the whole grid plus one block per wall cell.
fn spawn_layout(commands: &mut Commands, arena: &mut LevelArena, layout: &MazeLayout) {
    let footprint = layout.footprint();
    let ground_half = Vec3::new(footprint.x * 0.5, 0.5, footprint.y * 0.5);
    spawn_scoped(
        commands,
        arena,
        (
            Name::new("Ground"),
            SpatialBundle::from_transform(Transform::from_xyz(0.0, -0.5, 0.0)),
            StaticCollider {
                half_extents: ground_half,
            },
            Visual::block(ground_half, Color::srgb(0.25, 0.27, 0.3)),
        ),
    );

    let wall_half = Vec3::new(CELL_SIZE * 0.5, WALL_HEIGHT * 0.5, CELL_SIZE * 0.5);
    for (x, z) in layout.wall_cells() {
        let center = layout.cell_center(x, z) + Vec3::Y * wall_half.y;
        spawn_scoped(
            commands,
            arena,
            (
                Name::new("Wall"),
                SpatialBundle::from_transform(Transform::from_translation(center)),
                StaticCollider {
                    half_extents: wall_half,
                },
                Visual::block(wall_half, Color::srgb(0.45, 0.42, 0.5)),
            ),
        );
    }
}

/// Runs once every blocking import has resolved: registers the frame loop and starts play.
fn monitor_level_loading(
    mut commands: Commands,
    tuning: Res<Tuning>,
    mut arena: ResMut<LevelArena>,
    mut current: ResMut<CurrentLevel>,
    mut dialog: ResMut<DialogSequencer>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if current.phase != LevelPhase::Loading {
        return;
    }

    spawn_scoped(&mut commands, &mut arena, (Name::new("LevelLoop"), LevelLoop));
    current.phase = LevelPhase::Active;

    let def = current.def();
    if let LevelKind::Narrative { lines, .. } = def.kind {
        start_dialog(&mut dialog, &tuning, lines);
    }

    info!("Level '{}' is active.", def.name);
    next_state.set(GameState::Playing);
}

#[allow(clippy::too_many_arguments)]
fn evaluate_level_goal(
    current: Res<CurrentLevel>,
    goal: Res<LevelGoal>,
    tally: Res<CollectibleTally>,
    dialog: Res<DialogSequencer>,
    mut finished: EventReader<DialogFinished>,
    players: Query<&Transform, With<Player>>,
    mut hud: ResMut<HudState>,
    mut outcomes: EventWriter<LevelOutcome>,
) {
    let dialog_done = finished.read().count() > 0;
    if current.phase != LevelPhase::Active {
        return;
    }

    let reached = match *goal {
        LevelGoal::None => false,
        LevelGoal::CollectAll => tally.is_complete(),
        LevelGoal::FinishDialog => dialog_done || !dialog.is_active(),
        LevelGoal::Reach { target, radius } => {
            let Ok(transform) = players.get_single() else {
                return;
            };
            let position = transform.translation;
            let distance = horizontal_distance(position, target);
            hud.set_distance(Some(distance));
            distance <= radius && position.y >= target.y
        }
    };

    if reached {
        outcomes.send(LevelOutcome::Completed);
    }
}

/// Consumes the first outcome of an active level and hands over to the fade.
fn resolve_level_outcome(
    mut outcomes: EventReader<LevelOutcome>,
    mut current: ResMut<CurrentLevel>,
    mut transition: ResMut<TransitionState>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(outcome) = outcomes.read().next().copied() else {
        return;
    };
    outcomes.clear();

    if current.phase != LevelPhase::Active {
        return;
    }

    current.phase = LevelPhase::Completing;
    let target = match outcome {
        LevelOutcome::Completed => {
            info!("Level '{}' completed.", current.def().name);
            TransitionTarget::Advance
        }
        LevelOutcome::Failed => {
            info!("Level '{}' failed; restarting.", current.def().name);
            TransitionTarget::Restart
        }
    };

    transition.begin(target);
    next_state.set(GameState::Completing);
}
