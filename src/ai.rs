//! Enemy behaviour: guard a nearby collectible, otherwise wander, and shoot on sight.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use crate::collectible::Collectible;
use crate::collision::CollisionWorld;
use crate::config::{EnemyTuning, GameRng, Tuning};
use crate::enemy::{Enemy, ENEMY_HALF_EXTENTS};
use crate::loading::{ModelFailed, ModelReady};
use crate::player::Player;
use crate::projectile::{spawn_projectile, Shooter};
use crate::registry::LevelArena;

pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Nearest collectible within `radius` on the ground plane.
pub fn assigned_collectible(position: Vec3, collectibles: &[Vec3], radius: f32) -> Option<Vec3> {
    collectibles
        .iter()
        .copied()
        .map(|target| (target, horizontal_distance(position, target)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(target, _)| target)
}

/// Displacement for a guard this frame: walk straight at the target while outside the guard
/// radius (never overshooting it), otherwise a small random shuffle.
pub fn guard_step<R: Rng + ?Sized>(
    position: Vec3,
    target: Vec3,
    dt: f32,
    tuning: &EnemyTuning,
    rng: &mut R,
) -> Vec3 {
    let offset = Vec3::new(target.x - position.x, 0.0, target.z - position.z);
    let distance = offset.length();

    if distance > tuning.guard_radius {
        let step = (tuning.speed * dt).min(distance);
        return offset / distance * step;
    }

    Vec3::new(rng.gen_range(-1.0..=1.0), 0.0, rng.gen_range(-1.0..=1.0)) * tuning.jitter * dt
}

pub fn wander_step<R: Rng + ?Sized>(dt: f32, tuning: &EnemyTuning, rng: &mut R) -> Vec3 {
    let angle = rng.gen_range(0.0..TAU);
    Vec3::new(angle.cos(), 0.0, angle.sin()) * tuning.wander_speed * dt
}

/// Applies `step` to an enemy body, sliding along any wall it meets. A step that the wall
/// stops almost entirely is turned into a sidestep along the wall, trying one side and then
/// the other, so an enemy with a target behind a wall works its way around it.
pub fn enemy_step(world: &CollisionWorld, position: Vec3, step: Vec3) -> Vec3 {
    let wanted = step.length();
    if wanted <= f32::EPSILON {
        return position;
    }

    let attempt = |direction: Vec3| {
        let mut moved = position;
        let mut velocity = Vec3::new(direction.x, 0.0, direction.z);
        let contact = world.resolve_motion(&mut moved, &mut velocity, ENEMY_HALF_EXTENTS, 1.0);
        let progressed = horizontal_distance(moved, position) >= wanted * 0.5;
        (moved, contact.wall && !progressed)
    };

    let (direct, stuck) = attempt(step);
    if !stuck {
        return direct;
    }

    let sidestep = Vec3::new(-step.z, 0.0, step.x);
    [sidestep, -sidestep]
        .into_iter()
        .map(attempt)
        .find(|(_, stuck)| !stuck)
        .map_or(direct, |(moved, _)| moved)
}

/// Enemies whose model is still importing are skipped. A failed import leaves the placeholder
/// body in place, which is enough to walk and shoot with.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn run_enemy_ai(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<Tuning>,
    world: Res<CollisionWorld>,
    mut rng: ResMut<GameRng>,
    mut arena: ResMut<LevelArena>,
    collectibles: Query<(&Transform, &Collectible), Without<Enemy>>,
    players: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(&mut Transform, &mut Enemy), Or<(With<ModelReady>, With<ModelFailed>)>>,
) {
    let dt = time.delta_seconds();
    let now = time.elapsed_seconds_f64();
    let settings = &tuning.enemy;

    let targets: Vec<Vec3> = collectibles
        .iter()
        .filter(|(_, collectible)| !collectible.is_collected())
        .map(|(transform, _)| transform.translation)
        .collect();
    let player = players.get_single().ok().map(|transform| transform.translation);

    for (mut transform, mut enemy) in &mut enemies {
        let position = transform.translation;
        let step = match assigned_collectible(position, &targets, settings.assign_radius) {
            Some(target) => guard_step(position, target, dt, settings, &mut rng.0),
            None => wander_step(dt, settings, &mut rng.0),
        };

        transform.translation = enemy_step(&world, position, step);

        let Some(player_position) = player else {
            continue;
        };

        let eye = transform.translation + Vec3::Y * ENEMY_HALF_EXTENTS.y * 0.5;
        let to_player = player_position - eye;
        if to_player.length() > settings.sight_range {
            continue;
        }

        let level_target = Vec3::new(player_position.x, transform.translation.y, player_position.z);
        if horizontal_distance(level_target, transform.translation) > f32::EPSILON {
            transform.look_at(level_target, Vec3::Y);
        }

        if world.is_blocked(eye, player_position) || !enemy.gun.try_fire(now) {
            continue;
        }

        let direction = to_player.normalize_or_zero();
        let origin = eye + direction * (ENEMY_HALF_EXTENTS.x + tuning.projectile.radius + 0.1);
        spawn_projectile(
            &mut commands,
            &mut arena,
            origin,
            direction,
            Shooter::Enemy,
            &tuning.projectile,
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::collision::Aabb3;
    use crate::health::Health;
    use crate::projectile::Projectile;
    use crate::testing;

    #[test]
    fn assignment_picks_nearest_within_radius() {
        let collectibles = [Vec3::new(8.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 4.0), Vec3::new(30.0, 1.0, 0.0)];
        let assigned = assigned_collectible(Vec3::new(0.0, 0.9, 0.0), &collectibles, 10.0);
        assert_eq!(assigned, Some(Vec3::new(0.0, 1.0, 4.0)));
        assert_eq!(assigned_collectible(Vec3::new(0.0, 0.9, 0.0), &collectibles[2..], 10.0), None);
    }

    #[test]
    fn displaced_guard_closes_in_monotonically_then_jitters() {
        let tuning = EnemyTuning::default();
        let mut rng = StdRng::seed_from_u64(11);
        let target = Vec3::new(0.0, 1.0, 0.0);
        let mut position = Vec3::new(9.0, 0.9, 0.0);
        let dt = 1.0 / 30.0;

        let mut previous = horizontal_distance(position, target);
        let mut frames = 0;
        while previous > tuning.guard_radius {
            position += guard_step(position, target, dt, &tuning, &mut rng);
            let distance = horizontal_distance(position, target);
            assert!(distance < previous, "guard must strictly approach its post");
            previous = distance;
            frames += 1;
            assert!(frames < 1000);
        }

        let bound = tuning.jitter * dt * 2.0_f32.sqrt() + 1e-6;
        for _ in 0..100 {
            let step = guard_step(position, target, dt, &tuning, &mut rng);
            assert!(step.length() <= bound);
            assert_eq!(step.y, 0.0);
        }
    }

    #[test]
    fn wander_step_has_constant_speed() {
        let tuning = EnemyTuning::default();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let step = wander_step(0.1, &tuning, &mut rng);
            assert!((step.length() - tuning.wander_speed * 0.1).abs() < 1e-5);
        }
    }

    fn spawn_guard(app: &mut App, position: Vec3, ready: bool) -> Entity {
        let mut entity = app.world_mut().spawn((
            Transform::from_translation(position),
            Enemy::new(2.0),
            Health::full(),
        ));
        if ready {
            entity.insert(ModelReady);
        }
        entity.id()
    }

    fn spawn_orb(app: &mut App, position: Vec3) {
        app.world_mut()
            .spawn((Transform::from_translation(position), Collectible::default()));
    }

    fn position_of(app: &App, entity: Entity) -> Vec3 {
        app.world().get::<Transform>(entity).expect("transform").translation
    }

    fn enemy_shot_count(app: &mut App) -> usize {
        let world = app.world_mut();
        world
            .query::<&Projectile>()
            .iter(world)
            .filter(|projectile| projectile.shooter == Shooter::Enemy)
            .count()
    }

    #[test]
    fn enemies_wait_for_their_model_to_resolve() {
        let mut app = testing::sandbox_app();
        spawn_orb(&mut app, Vec3::new(0.0, 1.0, 0.0));
        let pending = spawn_guard(&mut app, Vec3::new(8.0, 0.9, 0.0), false);
        let ready = spawn_guard(&mut app, Vec3::new(-8.0, 0.9, 0.0), true);
        let failed = spawn_guard(&mut app, Vec3::new(0.0, 0.9, 8.0), false);
        app.world_mut().entity_mut(failed).insert(ModelFailed);

        testing::run_for(&mut app, 0.5);

        assert_eq!(position_of(&app, pending), Vec3::new(8.0, 0.9, 0.0));
        assert!(position_of(&app, ready).x > -8.0);
        assert!(position_of(&app, failed).z < 8.0);
    }

    #[test]
    fn step_into_a_wall_slides_along_it() {
        let mut world = CollisionWorld::default();
        world.insert(Aabb3::from_center_half(
            Vec3::new(4.0, 1.5, 0.0),
            Vec3::new(2.0, 1.5, 2.0),
        ));
        let start = Vec3::new(1.45, 0.9, 0.5);

        let moved = enemy_step(&world, start, Vec3::new(0.15, 0.0, -0.01));

        assert!(moved.x < 2.0 - ENEMY_HALF_EXTENTS.x);
        assert!((moved.z - start.z).abs() > 0.1);
        assert_eq!(moved.y, start.y);
    }

    #[test]
    fn guard_works_its_way_around_a_wall_to_its_post() {
        let mut app = testing::sandbox_app();
        testing::add_wall(&mut app, Vec3::new(4.0, 1.5, 0.0), Vec3::new(2.0, 1.5, 2.0));
        let post = Vec3::new(8.0, 1.0, 0.0);
        spawn_orb(&mut app, post);
        app.update();
        let guard = spawn_guard(&mut app, Vec3::new(0.0, 0.9, 0.5), true);

        testing::run_for(&mut app, 1.5);
        let pressed = position_of(&app, guard);
        testing::run_for(&mut app, 5.0);
        let settled = position_of(&app, guard);

        assert_ne!(pressed, settled);
        let guard_radius = EnemyTuning::default().guard_radius;
        assert!(horizontal_distance(settled, post) <= guard_radius + 0.1);
    }

    #[test]
    fn visible_player_draws_fire_at_most_once_per_cooldown() {
        let mut app = testing::sandbox_app();
        testing::spawn_bare_player(&mut app, Vec3::new(0.0, 0.9, 30.0));
        spawn_guard(&mut app, Vec3::new(0.0, 0.9, 0.0), true);

        app.update();
        assert_eq!(enemy_shot_count(&mut app), 1);

        testing::run_for(&mut app, 1.0);
        assert_eq!(enemy_shot_count(&mut app), 1);
    }

    #[test]
    fn walls_block_line_of_sight() {
        let mut app = testing::sandbox_app();
        testing::spawn_bare_player(&mut app, Vec3::new(0.0, 0.9, 20.0));
        testing::add_wall(&mut app, Vec3::new(0.0, 1.5, 10.0), Vec3::new(6.0, 1.5, 0.5));
        app.update();
        spawn_guard(&mut app, Vec3::new(0.0, 0.9, 0.0), true);

        testing::run_for(&mut app, 0.5);
        assert_eq!(enemy_shot_count(&mut app), 0);
    }
}
