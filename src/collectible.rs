use bevy::prelude::*;

use crate::collision::Aabb3;
use crate::config::Tuning;
use crate::movement::Capsule;
use crate::player::Player;
use crate::registry::{spawn_scoped, LevelArena};
use crate::state::GameSet;
use crate::visuals::Visual;

pub struct CollectiblePlugin;

impl Plugin for CollectiblePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CollectibleTally>()
            .add_event::<CollectiblePicked>()
            .add_systems(
                Update,
                (collect_on_contact, tally_pickups)
                    .chain()
                    .in_set(GameSet::Combat),
            );
    }
}

/// A glowing pickup. Once collected it is inert; its entity is despawned the same frame.
#[derive(Component, Debug, Default)]
pub struct Collectible {
    collected: bool,
}

impl Collectible {
    /// Returns true exactly once.
    pub fn try_collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct CollectiblePicked {
    pub entity: Entity,
    pub position: Vec3,
}

/// Pickups collected in the active level.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectibleTally {
    pub picked: u32,
    pub total: u32,
}

impl CollectibleTally {
    pub fn reset(&mut self, total: u32) {
        self.picked = 0;
        self.total = total;
    }

    /// A level that ended up with nothing to pick counts as done.
    pub fn is_complete(&self) -> bool {
        self.picked >= self.total
    }
}

pub fn spawn_collectible(commands: &mut Commands, arena: &mut LevelArena, position: Vec3) -> Entity {
    let color = Color::srgb(1.0, 0.85, 0.3);
    let entity = spawn_scoped(
        commands,
        arena,
        (
            Name::new("Collectible"),
            Collectible::default(),
            SpatialBundle::from_transform(Transform::from_translation(position)),
            Visual::orb(0.35, color, 8.0),
        ),
    );

    commands.entity(entity).with_children(|parent| {
        parent.spawn(PointLightBundle {
            point_light: PointLight {
                color,
                intensity: 40_000.0,
                range: 6.0,
                ..default()
            },
            ..default()
        });
    });

    entity
}

fn collect_on_contact(
    mut commands: Commands,
    tuning: Res<Tuning>,
    mut arena: ResMut<LevelArena>,
    players: Query<(&Transform, &Capsule), With<Player>>,
    mut collectibles: Query<(Entity, &Transform, &mut Collectible), Without<Player>>,
    mut picked: EventWriter<CollectiblePicked>,
) {
    let Ok((player_transform, capsule)) = players.get_single() else {
        return;
    };

    let player_box = Aabb3::from_center_half(player_transform.translation, capsule.half_extents());
    let reach = Vec3::splat(tuning.placement.pickup_radius);

    for (entity, transform, mut collectible) in &mut collectibles {
        if collectible.is_collected() {
            continue;
        }

        let pickup_box = Aabb3::from_center_half(transform.translation, reach);
        if !player_box.intersects(&pickup_box) || !collectible.try_collect() {
            continue;
        }

        picked.send(CollectiblePicked {
            entity,
            position: transform.translation,
        });
        commands.entity(entity).despawn_recursive();
        arena.release(entity);
    }
}

fn tally_pickups(mut picked: EventReader<CollectiblePicked>, mut tally: ResMut<CollectibleTally>) {
    for event in picked.read() {
        tally.picked += 1;
        info!(
            "Collected orb {:?} at {:.1?} ({}/{}).",
            event.entity, event.position, tally.picked, tally.total
        );
    }
}
