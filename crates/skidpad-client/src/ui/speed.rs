//! Speed readout in the bottom-right corner.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::vehicle::Speedometer;

fn speed_label(kmh: u32) -> String {
    format!("{kmh} km/h")
}

pub(super) fn speed_hud_system(
    mut contexts: EguiContexts,
    speed_query: Query<&Speedometer>,
) -> Result {
    let Some(speedometer) = speed_query.iter().next() else {
        return Ok(());
    };
    let ctx = contexts.ctx_mut()?;

    egui::Area::new(egui::Id::new("speed_hud"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-24.0, -24.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(speed_label(speedometer.0.display_kmh()))
                    .size(32.0)
                    .strong()
                    .color(egui::Color32::WHITE),
            );
        });

    Ok(())
}
