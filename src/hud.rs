//! Heads-up display state.
//!
//! Gameplay writes into `HudState`; the UI layer only reads it. Nothing flows back.

use bevy::prelude::*;

use crate::collectible::CollectibleTally;
use crate::health::Health;
use crate::player::Player;
use crate::projectile::EnemyDefeated;
use crate::state::GameSet;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HudState>().add_systems(
            Update,
            (sync_collectible_count, sync_player_health, count_defeated_enemies)
                .in_set(GameSet::Effects),
        );
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct HudState {
    /// `(picked, total)`; hidden on levels without pickups.
    pub collectibles: Option<(u32, u32)>,
    pub mission: String,
    /// Distance to the goal on levels that have one.
    pub distance: Option<f32>,
    /// Health bar fill in `[0, 1]`.
    pub health: f32,
    pub defeated: u32,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            collectibles: None,
            mission: String::new(),
            distance: None,
            health: 1.0,
            defeated: 0,
        }
    }
}

impl HudState {
    pub fn set_collectibles(&mut self, picked: u32, total: u32) {
        self.collectibles = (total > 0).then_some((picked, total));
    }

    pub fn set_mission(&mut self, text: impl Into<String>) {
        self.mission = text.into();
    }

    pub fn set_distance(&mut self, distance: Option<f32>) {
        self.distance = distance.map(|value| value.max(0.0));
    }

    pub fn set_health(&mut self, fraction: f32) {
        self.health = fraction.clamp(0.0, 1.0);
    }

    pub fn collectible_text(&self) -> Option<String> {
        self.collectibles
            .map(|(picked, total)| format!("Orbs: {picked} / {total}"))
    }

    pub fn defeated_text(&self) -> Option<String> {
        (self.defeated > 0).then(|| format!("Enemies down: {}", self.defeated))
    }

    pub fn distance_text(&self) -> Option<String> {
        self.distance.map(|distance| format!("Distance: {distance:.1} m"))
    }
}

fn sync_collectible_count(tally: Res<CollectibleTally>, mut hud: ResMut<HudState>) {
    if tally.is_changed() {
        hud.set_collectibles(tally.picked, tally.total);
    }
}

fn count_defeated_enemies(mut defeated: EventReader<EnemyDefeated>, mut hud: ResMut<HudState>) {
    let count = defeated.read().count() as u32;
    if count > 0 {
        hud.defeated += count;
    }
}

fn sync_player_health(
    players: Query<&Health, (With<Player>, Changed<Health>)>,
    mut hud: ResMut<HudState>,
) {
    if let Ok(health) = players.get_single() {
        hud.set_health(health.fraction());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn setters_clamp_and_hide() {
        let mut hud = HudState::default();
        hud.set_health(1.7);
        assert_eq!(hud.health, 1.0);
        hud.set_collectibles(0, 0);
        assert_eq!(hud.collectible_text(), None);
        hud.set_collectibles(2, 5);
        assert_eq!(hud.collectible_text().as_deref(), Some("Orbs: 2 / 5"));
        hud.set_distance(Some(12.345));
        assert_eq!(hud.distance_text().as_deref(), Some("Distance: 12.3 m"));
    }

    #[test]
    fn health_bar_follows_player_damage() {
        let mut app = testing::sandbox_app();
        let player = testing::spawn_bare_player(&mut app, Vec3::new(0.0, 0.9, 0.0));
        app.update();

        app.world_mut()
            .get_mut::<Health>(player)
            .expect("health")
            .reduce(25.0);
        app.update();

        assert!((app.world().resource::<HudState>().health - 0.75).abs() < 1e-6);
    }
}
