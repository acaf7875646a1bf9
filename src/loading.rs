//! Asynchronous model imports.
//!
//! Level builders attach a `ModelRequest`; the presentation layer issues the load and polls the
//! asset server each frame until it resolves. The handle lives on the requesting entity, so
//! despawning a level mid-import drops the handle and abandons the load with nothing left behind.

use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;

pub struct ModelLoadingPlugin;

impl Plugin for ModelLoadingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (request_models, poll_models).chain());
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct ModelRequest {
    pub path: &'static str,
    /// Blocking requests hold the level in `Loading` until they resolve.
    pub blocking: bool,
}

#[derive(Component, Debug)]
pub struct PendingModel(pub Handle<Scene>);

/// The model finished importing and is safe to reference.
#[derive(Component, Debug, Default)]
pub struct ModelReady;

/// The import failed. The entity keeps its placeholder shape in place of the model.
#[derive(Component, Debug, Default)]
pub struct ModelFailed;

/// True once no blocking request is still in flight.
pub fn blocking_models_resolved(
    requests: Query<&ModelRequest, (Without<ModelReady>, Without<ModelFailed>)>,
) -> bool {
    requests.iter().all(|request| !request.blocking)
}

fn request_models(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    query: Query<(Entity, &ModelRequest), Without<PendingModel>>,
) {
    for (entity, request) in &query {
        let handle: Handle<Scene> =
            asset_server.load(GltfAssetLabel::Scene(0).from_asset(request.path));
        commands.entity(entity).insert(PendingModel(handle));
    }
}

fn poll_models(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    query: Query<(Entity, &ModelRequest, &PendingModel), (Without<ModelReady>, Without<ModelFailed>)>,
) {
    for (entity, request, pending) in &query {
        match asset_server.get_load_state(pending.0.id()) {
            Some(LoadState::Loaded) => {
                let scene = pending.0.clone();
                commands
                    .entity(entity)
                    .insert(ModelReady)
                    .with_children(|parent| {
                        parent.spawn(SceneBundle { scene, ..default() });
                    });
                debug!("Model '{}' ready.", request.path);
            }
            Some(LoadState::Failed(_)) => {
                warn!(
                    "Unable to import model '{}'; the entity keeps its placeholder.",
                    request.path
                );
                commands.entity(entity).insert(ModelFailed);
            }
            _ => {}
        }
    }
}
