//! Egui overlay: performance window, debug window and the speed HUD.
//!
//! The debug and performance windows hide together with Q; the speed HUD is
//! always shown.

mod debug;
mod performance;
mod speed;

use bevy::{diagnostic::FrameTimeDiagnosticsPlugin, prelude::*};
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};
use leafwing_input_manager::prelude::*;

use crate::{input::DemoAction, settings::Settings};

/// Resource controlling whether the debug UI is visible.
#[derive(Resource)]
pub struct UiVisible(pub bool);

impl Default for UiVisible {
    fn default() -> Self {
        Self(true)
    }
}

/// Plugin for the egui overlay.
pub struct DebugUiPlugin;

impl Plugin for DebugUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_plugins(FrameTimeDiagnosticsPlugin::default())
            .init_resource::<UiVisible>()
            .init_resource::<performance::FrameTimeHistory>()
            .add_systems(
                Update,
                (toggle_ui_visible, performance::record_frame_time),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    debug::debug_window_system.run_if(ui_visible),
                    performance::performance_window_system
                        .run_if(ui_visible.and(performance_enabled)),
                    speed::speed_hud_system,
                ),
            );
    }
}

fn ui_visible(visible: Res<UiVisible>) -> bool {
    visible.0
}

fn performance_enabled(settings: Res<Settings>) -> bool {
    settings.debug.show_performance
}

/// Toggle UI visibility with Q.
fn toggle_ui_visible(
    action_query: Query<&ActionState<DemoAction>>,
    mut visible: ResMut<UiVisible>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    if action_state.just_pressed(&DemoAction::ToggleUi) {
        visible.0 = !visible.0;
    }
}
