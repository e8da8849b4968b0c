//! Debug window: camera mode, effects, overlays and car state.

use bevy::{ecs::system::SystemParam, prelude::*};
use bevy_egui::{EguiContexts, egui};
use egui_extras::{Column, TableBuilder};

use crate::{
    camera::{CameraMode, CameraModeState, CameraModeTransitions},
    settings::Settings,
    vehicle::{Car, RaycastRig, ResetRequest, Speedometer},
};

/// Resources for the debug window.
#[derive(SystemParam)]
pub(super) struct DebugParams<'w, 's> {
    pub settings: ResMut<'w, Settings>,
    pub mode_state: Res<'w, CameraModeState>,
    pub transitions: ResMut<'w, CameraModeTransitions>,
    pub reset: ResMut<'w, ResetRequest>,
    pub car_query: Query<
        'w,
        's,
        (
            &'static Car,
            &'static Speedometer,
            Option<&'static RaycastRig>,
        ),
    >,
}

pub(super) fn debug_window_system(
    mut contexts: EguiContexts,
    mut params: DebugParams,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| {
            render_camera_section(ui, &mut params);
            ui.separator();
            render_settings_section(ui, &mut params.settings);
            ui.separator();
            render_car_section(ui, &mut params);
        });

    Ok(())
}

fn render_camera_section(ui: &mut egui::Ui, params: &mut DebugParams) {
    let current = params.mode_state.current();
    ui.horizontal(|ui| {
        ui.label("Camera (C):");
        for mode in [CameraMode::Follow, CameraMode::Orbit] {
            if ui.radio(current == mode, mode.label()).clicked() && current != mode {
                params.transitions.request(mode);
            }
        }
    });
}

/// Only write back on change so unrelated frames do not trigger a save.
fn render_settings_section(ui: &mut egui::Ui, settings: &mut ResMut<Settings>) {
    let mut effects = settings.post_processing.clone();
    let mut debug = settings.debug.clone();

    ui.collapsing("Post-processing", |ui| {
        ui.checkbox(&mut effects.bloom, "Bloom");
        ui.checkbox(&mut effects.depth_of_field, "Depth of field");
        ui.checkbox(&mut effects.tonemapping, "Tonemapping");
    });
    ui.collapsing("Overlays", |ui| {
        ui.checkbox(&mut debug.show_performance, "Performance window");
        ui.checkbox(&mut debug.show_shadow_helper, "Shadow frustum");
        ui.checkbox(&mut debug.physics_debug, "Physics colliders");
    });

    if effects != settings.post_processing {
        settings.post_processing = effects;
    }
    if debug != settings.debug {
        settings.debug = debug;
    }
}

fn render_car_section(ui: &mut egui::Ui, params: &mut DebugParams) {
    let Some((car, speedometer, rig)) = params.car_query.iter().next() else {
        ui.label("No car");
        return;
    };

    ui.horizontal(|ui| {
        ui.heading(&car.config.name);
        if ui.button("Reset (R)").clicked() {
            params.reset.request();
        }
    });

    let rows = [
        (
            "Rig:",
            if car.controller.is_ready() {
                "ready".to_string()
            } else {
                "waiting".to_string()
            },
        ),
        (
            "Steering:",
            format!("{:+.1}°", car.controller.steering_value().to_degrees()),
        ),
        (
            "Engine:",
            format!("{:+.0} N", car.last_command.engine_force),
        ),
        ("Speed:", format!("{:.1} km/h", speedometer.0.speed_kmh())),
        (
            "Grounded:",
            rig.map_or("-".to_string(), |rig| {
                format!("{}/{}", rig.grounded_wheels(), rig.wheels.len())
            }),
        ),
        ("Resets:", car.controller.last_reset().to_string()),
    ];

    TableBuilder::new(ui)
        .column(Column::exact(80.0))
        .column(Column::exact(120.0))
        .body(|mut body| {
            for (label, value) in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(label);
                    });
                    row.col(|ui| {
                        ui.label(value);
                    });
                });
            }
        });
}
