//! Physics integration using Avian 3D.
//!
//! Standard downward gravity. Collider debug drawing is off by default and
//! follows the `physics_debug` setting.

use avian3d::debug_render::{PhysicsDebugPlugin, PhysicsGizmos};
use avian3d::prelude::*;
use bevy::color::palettes::css::LIME;
use bevy::gizmos::config::{GizmoConfig, GizmoConfigStore};
use bevy::prelude::*;

use crate::settings::Settings;

/// Plugin for rigid body physics and its debug view.
pub struct PhysicsIntegrationPlugin;

impl Plugin for PhysicsIntegrationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PhysicsPlugins::default())
            .add_plugins(PhysicsDebugPlugin)
            .add_systems(Startup, configure_physics_debug_on_startup)
            .add_systems(
                Update,
                sync_physics_debug.run_if(resource_changed::<Settings>),
            );
    }
}

/// Configure physics debug rendering on startup.
fn configure_physics_debug_on_startup(
    mut config_store: ResMut<GizmoConfigStore>,
    settings: Res<Settings>,
) {
    let physics_gizmos = PhysicsGizmos {
        collider_color: Some(LIME.into()),
        ..Default::default()
    };

    // Negative depth bias draws colliders on top of the car body.
    let gizmo_config = GizmoConfig {
        enabled: settings.debug.physics_debug,
        depth_bias: -1.0,
        ..Default::default()
    };

    config_store.insert(gizmo_config, physics_gizmos);
}

/// Toggle physics debug visualization.
pub fn toggle_physics_debug(config_store: &mut GizmoConfigStore) {
    let (config, _) = config_store.config_mut::<PhysicsGizmos>();
    config.enabled = !config.enabled;
    tracing::info!("Physics debug visualization: {}", config.enabled);
}

/// Check if physics debug is currently enabled.
pub fn is_physics_debug_enabled(config_store: &GizmoConfigStore) -> bool {
    let (config, _) = config_store.config::<PhysicsGizmos>();
    config.enabled
}

fn sync_physics_debug(settings: Res<Settings>, mut config_store: ResMut<GizmoConfigStore>) {
    if is_physics_debug_enabled(&config_store) != settings.debug.physics_debug {
        toggle_physics_debug(&mut config_store);
    }
}
