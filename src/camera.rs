//! Camera follow system. Keeps the level camera behind and above the player, easing toward the
//! desired spot with exponential smoothing so turns never snap.

use bevy::prelude::*;

use crate::movement::facing;
use crate::player::Player;
use crate::state::GameSet;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            follow_player_camera
                .in_set(GameSet::Effects)
                .run_if(has_player_and_camera),
        );
    }
}

/// The one camera a level owns. It is level-scoped, so teardown removes it before the next
/// level spawns its own.
#[derive(Component, Debug, Default)]
pub struct LevelCamera;

#[derive(Component, Debug, Clone, Copy)]
pub struct FollowCamera {
    pub distance: f32,
    pub height: f32,
    /// Exponential decay rate; higher catches up faster.
    pub follow_speed: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            distance: 7.0,
            height: 3.5,
            follow_speed: 6.0,
        }
    }
}

impl FollowCamera {
    pub fn desired_position(&self, target: Vec3, rotation: Quat) -> Vec3 {
        target - facing(rotation) * self.distance + Vec3::Y * self.height
    }
}

/// Run condition that only schedules the follow system when both a player and camera exist.
fn has_player_and_camera(
    player_query: Query<(), With<Player>>,
    camera_query: Query<(), With<FollowCamera>>,
) -> bool {
    !player_query.is_empty() && !camera_query.is_empty()
}

fn follow_player_camera(
    mut camera_query: Query<(&mut Transform, &FollowCamera)>,
    player_query: Query<&Transform, (With<Player>, Without<FollowCamera>)>,
    time: Res<Time>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };

    let target = player_transform.translation;
    for (mut camera_transform, follow) in &mut camera_query {
        let desired = follow.desired_position(target, player_transform.rotation);
        let lerp_t = 1.0 - f32::exp(-follow.follow_speed * time.delta_seconds());
        camera_transform.translation = camera_transform.translation.lerp(desired, lerp_t);
        camera_transform.look_at(target + Vec3::Y, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn desired_spot_is_behind_the_facing() {
        let follow = FollowCamera::default();
        let spot = follow.desired_position(Vec3::ZERO, Quat::IDENTITY);
        // Identity faces -z, so the camera sits on +z.
        assert!((spot - Vec3::new(0.0, 3.5, 7.0)).length() < 1e-5);
    }

    #[test]
    fn camera_converges_on_the_follow_spot() {
        let mut app = testing::sandbox_app();
        testing::spawn_bare_player(&mut app, Vec3::new(10.0, 0.9, -4.0));
        let camera = app
            .world_mut()
            .spawn((Transform::default(), FollowCamera::default()))
            .id();

        testing::run_for(&mut app, 3.0);

        let expected = FollowCamera::default()
            .desired_position(Vec3::new(10.0, 0.9, -4.0), Quat::IDENTITY);
        let actual = app.world().get::<Transform>(camera).expect("camera").translation;
        assert!((actual - expected).length() < 0.01);
    }
}
