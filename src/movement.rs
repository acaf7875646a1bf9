use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

use crate::collision::CollisionWorld;
use crate::config::{MovementTuning, Tuning};
use crate::player::Player;
use crate::state::GameSet;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                read_player_input.in_set(GameSet::Input),
                (apply_player_motion, integrate_bodies)
                    .chain()
                    .in_set(GameSet::Movement),
            ),
        );
    }
}

/// Kinematic body state. Velocity is in world units per second.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Body {
    pub velocity: Vec3,
    pub grounded: bool,
}

/// Upright capsule collision proxy, approximated by its bounding box for queries.
#[derive(Component, Debug, Clone, Copy)]
pub struct Capsule {
    pub radius: f32,
    /// Half of the full standing height.
    pub half_height: f32,
}

impl Capsule {
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.radius, self.half_height, self.radius)
    }
}

impl Default for Capsule {
    fn default() -> Self {
        Self {
            radius: 0.4,
            half_height: 0.9,
        }
    }
}

/// Key state sampled once per frame.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub jump: bool,
    pub shoot: bool,
}

impl MoveIntent {
    pub fn from_keys(keyboard: &ButtonInput<KeyCode>) -> Self {
        Self {
            forward: keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp),
            backward: keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown),
            rotate_left: keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft),
            rotate_right: keyboard.pressed(KeyCode::KeyD)
                || keyboard.pressed(KeyCode::ArrowRight),
            jump: keyboard.pressed(KeyCode::Space),
            shoot: keyboard.pressed(KeyCode::KeyF),
        }
    }
}

/// Horizontal facing of a yaw-only rotation.
pub fn facing(rotation: Quat) -> Vec3 {
    let forward = rotation * Vec3::NEG_Z;
    Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero()
}

/// New horizontal velocity for one frame.
///
/// Grounded bodies have no inertia: input sets the velocity directly and no input stops them.
/// Airborne bodies keep a damped share of their previous velocity plus a small steering term.
/// Only forward motion is checked against obstacles.
pub fn horizontal_velocity(
    intent: &MoveIntent,
    grounded: bool,
    forward_blocked: bool,
    facing: Vec3,
    previous: Vec3,
    dt: f32,
    tuning: &MovementTuning,
) -> Vec3 {
    let mut axis = 0.0;
    if intent.forward && !(grounded && forward_blocked) {
        axis += 1.0;
    }
    if intent.backward {
        axis -= 1.0;
    }

    let direction = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero() * axis;

    if grounded {
        direction * tuning.move_speed
    } else {
        let carried = Vec3::new(previous.x, 0.0, previous.z) * tuning.air_damping;
        carried + direction * tuning.air_control * dt
    }
}

/// Jumping requires ground contact and a near-zero vertical velocity, so one frame can never
/// stack two impulses.
pub fn should_jump(
    intent: &MoveIntent,
    grounded: bool,
    vertical_velocity: f32,
    tuning: &MovementTuning,
) -> bool {
    intent.jump && grounded && vertical_velocity.abs() < tuning.jump_velocity_threshold
}

fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut MoveIntent, With<Player>>,
) {
    let sampled = MoveIntent::from_keys(&keyboard);
    for mut intent in &mut query {
        if *intent != sampled {
            *intent = sampled;
        }
    }
}

fn apply_player_motion(
    time: Res<Time>,
    tuning: Res<Tuning>,
    world: Res<CollisionWorld>,
    mut query: Query<(&mut Transform, &mut Body, &Capsule, &MoveIntent), With<Player>>,
) {
    let dt = time.delta_seconds();
    let settings = &tuning.movement;

    for (mut transform, mut body, capsule, intent) in &mut query {
        let mut turn = 0.0;
        if intent.rotate_left {
            turn += 1.0;
        }
        if intent.rotate_right {
            turn -= 1.0;
        }
        if turn != 0.0 {
            transform.rotate_y(turn * settings.rotate_speed * dt);
        }

        let half = capsule.half_extents();
        let center = transform.translation;
        let direction = facing(transform.rotation);
        let grounded = world.probe_ground(center, half, settings.ground_probe);
        let forward_blocked =
            grounded && world.probe_forward(center, half, direction, settings.forward_probe);

        let horizontal = horizontal_velocity(
            intent,
            grounded,
            forward_blocked,
            direction,
            body.velocity,
            dt,
            settings,
        );
        body.velocity.x = horizontal.x;
        body.velocity.z = horizontal.z;
        body.grounded = grounded;

        if should_jump(intent, grounded, body.velocity.y, settings) {
            body.velocity.y += settings.jump_impulse;
            body.grounded = false;
        }
    }
}

fn integrate_bodies(
    time: Res<Time>,
    tuning: Res<Tuning>,
    world: Res<CollisionWorld>,
    mut query: Query<(&mut Transform, &mut Body, &Capsule)>,
) {
    let dt = time.delta_seconds();
    let settings = &tuning.movement;

    for (mut transform, mut body, capsule) in &mut query {
        if !body.grounded {
            body.velocity.y -= settings.gravity * dt;
            body.velocity.y = body.velocity.y.max(-settings.terminal_velocity);
        } else if body.velocity.y < 0.0 {
            body.velocity.y = 0.0;
        }

        let half = capsule.half_extents();
        let mut position = transform.translation;
        let mut velocity = body.velocity;
        let contact = world.resolve_motion(&mut position, &mut velocity, half, dt);

        body.velocity = velocity;
        body.grounded = contact.grounded
            || (velocity.y <= 0.0 && world.probe_ground(position, half, settings.ground_probe));
        transform.translation = position;
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::player::ensure_player;
    use crate::testing::{self, FRAME};

    fn tuning() -> MovementTuning {
        MovementTuning::default()
    }

    fn forward_only() -> MoveIntent {
        MoveIntent {
            forward: true,
            ..default()
        }
    }

    #[test]
    fn grounded_forward_reaches_move_speed_in_one_frame() {
        let settings = tuning();
        let velocity = horizontal_velocity(
            &forward_only(),
            true,
            false,
            Vec3::NEG_Z,
            Vec3::ZERO,
            1.0 / 60.0,
            &settings,
        );
        assert!((velocity.length() - settings.move_speed).abs() < 1e-5);
        assert!(velocity.z < 0.0);
    }

    #[test]
    fn grounded_without_input_stops_dead() {
        let velocity = horizontal_velocity(
            &MoveIntent::default(),
            true,
            false,
            Vec3::NEG_Z,
            Vec3::new(4.0, 0.0, -3.0),
            1.0 / 60.0,
            &tuning(),
        );
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn blocked_forward_is_suppressed_but_backward_is_not() {
        let settings = tuning();
        let blocked = horizontal_velocity(
            &forward_only(),
            true,
            true,
            Vec3::NEG_Z,
            Vec3::ZERO,
            0.016,
            &settings,
        );
        assert_eq!(blocked, Vec3::ZERO);

        let backing = MoveIntent {
            backward: true,
            ..default()
        };
        let retreat =
            horizontal_velocity(&backing, true, true, Vec3::NEG_Z, Vec3::ZERO, 0.016, &settings);
        assert!((retreat.z - settings.move_speed).abs() < 1e-5);
    }

    #[test]
    fn airborne_velocity_decays_and_steers_weakly() {
        let settings = tuning();
        let previous = Vec3::new(0.0, 3.0, -6.0);
        let coasting = horizontal_velocity(
            &MoveIntent::default(),
            false,
            false,
            Vec3::NEG_Z,
            previous,
            0.1,
            &settings,
        );
        assert!((coasting.z - (-6.0 * settings.air_damping)).abs() < 1e-5);
        assert_eq!(coasting.y, 0.0);

        let steering = horizontal_velocity(
            &forward_only(),
            false,
            true,
            Vec3::NEG_Z,
            previous,
            0.1,
            &settings,
        );
        let expected = -6.0 * settings.air_damping - settings.air_control * 0.1;
        assert!((steering.z - expected).abs() < 1e-5);
    }

    #[test]
    fn jump_needs_ground_and_settled_vertical_velocity() {
        let settings = tuning();
        let jump = MoveIntent {
            jump: true,
            ..default()
        };
        assert!(should_jump(&jump, true, 0.0, &settings));
        assert!(!should_jump(&jump, false, 0.0, &settings));
        assert!(!should_jump(&jump, true, settings.jump_impulse, &settings));
        assert!(!should_jump(&MoveIntent::default(), true, 0.0, &settings));
    }

    #[test]
    fn facing_follows_yaw() {
        let quarter_left = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let dir = facing(quarter_left);
        assert!((dir - Vec3::NEG_X).length() < 1e-5);
    }

    /// A player standing still on a wide floor whose top face is at y = 0.
    fn player_on_floor() -> (App, Entity) {
        let mut app = testing::sandbox_app();
        testing::add_wall(&mut app, Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0));
        app.update();

        app.world_mut().run_system_once(ensure_player);
        let player = testing::player_entity(&mut app);
        let standing = Capsule::default().half_height;
        app.world_mut()
            .get_mut::<Transform>(player)
            .expect("transform")
            .translation = Vec3::new(0.0, standing, 0.0);
        app.update();

        assert!(body_of(&app, player).grounded);
        (app, player)
    }

    fn body_of(app: &App, player: Entity) -> Body {
        *app.world().get::<Body>(player).expect("body")
    }

    fn transform_of(app: &App, player: Entity) -> Transform {
        *app.world().get::<Transform>(player).expect("transform")
    }

    #[test]
    fn walking_moves_one_frame_of_speed_and_stays_grounded() {
        let (mut app, player) = player_on_floor();
        let before = transform_of(&app, player).translation;

        testing::hold(&mut app, KeyCode::KeyW);
        app.update();
        testing::release(&mut app, KeyCode::KeyW);

        let after = transform_of(&app, player).translation;
        let expected = tuning().move_speed * FRAME;
        assert!((before.z - after.z - expected).abs() < 1e-4, "moved {}", before.z - after.z);
        assert_eq!(after.x, before.x);
        assert_eq!(after.y, before.y);
        assert!(body_of(&app, player).grounded);
    }

    #[test]
    fn jump_rises_then_lands_back_on_the_floor() {
        let (mut app, player) = player_on_floor();
        let floor_height = transform_of(&app, player).translation.y;

        testing::tap(&mut app, KeyCode::Space);
        assert!(transform_of(&app, player).translation.y > floor_height);
        assert!(!body_of(&app, player).grounded);

        let mut peak = floor_height;
        for _ in 0..40 {
            app.update();
            peak = peak.max(transform_of(&app, player).translation.y);
        }

        assert!(peak > floor_height + 0.5, "peak {peak}");
        let body = body_of(&app, player);
        assert!(body.grounded);
        assert_eq!(body.velocity.y, 0.0);
        assert!((transform_of(&app, player).translation.y - floor_height).abs() < 0.01);
    }

    #[test]
    fn rotate_key_turns_in_place() {
        let (mut app, player) = player_on_floor();
        let before = transform_of(&app, player);

        testing::hold(&mut app, KeyCode::KeyA);
        testing::run_for(&mut app, 0.5);
        testing::release(&mut app, KeyCode::KeyA);

        let after = transform_of(&app, player);
        let (yaw, _, _) = after.rotation.to_euler(EulerRot::YXZ);
        assert!((yaw - tuning().rotate_speed * 0.5).abs() < 1e-3, "yaw {yaw}");
        assert!((facing(after.rotation) - facing(before.rotation)).length() > 0.5);
        assert_eq!(after.translation, before.translation);
    }
}
