//! Render-side description of gameplay entities.
//!
//! Gameplay code attaches a `Visual` describing what an entity looks like; the presentation layer
//! turns it into mesh and material handles. Keeping the description as plain data lets the
//! simulation run in a headless `App` without any render assets.

use bevy::prelude::*;

use crate::loading::ModelReady;

pub struct VisualsPlugin;

impl Plugin for VisualsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AmbientLight {
            color: Color::srgb(0.7, 0.75, 0.9),
            brightness: 250.0,
        })
        .add_systems(PostUpdate, (attach_visuals, hide_placeholders));
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub enum Visual {
    Block { half_extents: Vec3, color: Color },
    Orb { radius: f32, color: Color, glow: f32 },
    /// Stand-in body shown until an imported model replaces it.
    Placeholder { radius: f32, half_height: f32, color: Color },
}

impl Visual {
    pub fn block(half_extents: Vec3, color: Color) -> Self {
        Self::Block {
            half_extents,
            color,
        }
    }

    pub fn orb(radius: f32, color: Color, glow: f32) -> Self {
        Self::Orb { radius, color, glow }
    }
}

fn attach_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    query: Query<(Entity, &Visual), Added<Visual>>,
) {
    for (entity, visual) in &query {
        let (mesh, material) = match *visual {
            Visual::Block {
                half_extents,
                color,
            } => {
                let size = half_extents * 2.0;
                (
                    meshes.add(Cuboid::new(size.x, size.y, size.z)),
                    materials.add(StandardMaterial {
                        base_color: color,
                        perceptual_roughness: 0.9,
                        ..default()
                    }),
                )
            }
            Visual::Orb {
                radius,
                color,
                glow,
            } => (
                meshes.add(Sphere::new(radius)),
                materials.add(StandardMaterial {
                    base_color: color,
                    emissive: LinearRgba::from(color) * glow,
                    ..default()
                }),
            ),
            Visual::Placeholder {
                radius,
                half_height,
                color,
            } => (
                meshes.add(Capsule3d::new(radius, (half_height - radius).max(0.0) * 2.0)),
                materials.add(StandardMaterial::from(color)),
            ),
        };

        if let Some(mut entity_commands) = commands.get_entity(entity) {
            entity_commands.insert((mesh, material));
        }
    }
}

/// Once an imported model is in place the stand-in mesh is dropped.
fn hide_placeholders(
    mut commands: Commands,
    query: Query<(Entity, &Visual), Added<ModelReady>>,
) {
    for (entity, visual) in &query {
        if matches!(visual, Visual::Placeholder { .. }) {
            if let Some(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.remove::<Handle<Mesh>>();
            }
        }
    }
}
