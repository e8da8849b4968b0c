//! Raycast vehicle driving demo using Bevy and Avian.
//!
//! Drive a car around a flat skidpad with WASD or the arrow keys. The camera
//! either chases the car or orbits freely; an egui overlay shows performance,
//! car state and effect toggles.

mod camera;
mod input;
mod launch_params;
mod physics;
mod scene;
mod settings;
mod shadow;
mod ui;
mod vehicle;

use bevy::prelude::*;
use camera::CameraPlugin;
use input::InputPlugin;
use scene::ScenePlugin;
use settings::SettingsPlugin;
use shadow::ShadowPlugin;
use ui::DebugUiPlugin;
use vehicle::{CarDefinition, VehiclePlugin};

/// Per-frame ordering of the demo's systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SkidpadSystems {
    /// Keyboard sampling and action handling.
    Input,
    /// Vehicle controllers issue rig commands.
    Control,
    /// Camera, shadow and visual rigs follow the car.
    Rigs,
}

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                SkidpadSystems::Input,
                SkidpadSystems::Control,
                SkidpadSystems::Rigs,
            )
                .chain(),
        )
        .add_plugins((
            SettingsPlugin,
            InputPlugin,
            CameraPlugin,
            VehiclePlugin,
            ShadowPlugin,
            ScenePlugin,
            DebugUiPlugin,
        ))
        .add_plugins(physics::PhysicsIntegrationPlugin);
    }
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();
    let store = params.settings_store();
    let settings = store.load();
    let car = params.car_config();

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "skidpad".to_string(),
        resolution: (1600, 900).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    // The latter also keeps arrow keys from scrolling the page.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    app.insert_resource(params)
        .insert_resource(store)
        .insert_resource(settings)
        .insert_resource(CarDefinition(car))
        .add_plugins(AppPlugin)
        .run();
}
