//! Draggable performance window.

use std::collections::VecDeque;

use bevy::{
    diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};
use bevy_egui::{EguiContexts, egui};
use egui_plot::{Line, Plot, PlotPoints};

/// Number of frame time samples to keep.
const FRAME_HISTORY_SIZE: usize = 120;

/// Recent frame times in milliseconds.
#[derive(Resource, Default)]
pub(super) struct FrameTimeHistory {
    samples: VecDeque<f32>,
}

impl FrameTimeHistory {
    /// Push a new sample, maintaining the history size limit.
    fn push_sample(&mut self, frame_time_ms: f32) {
        self.samples.push_back(frame_time_ms);
        if self.samples.len() > FRAME_HISTORY_SIZE {
            self.samples.pop_front();
        }
    }

    fn worst(&self) -> f32 {
        self.samples.iter().copied().fold(0.0, f32::max)
    }
}

pub(super) fn record_frame_time(time: Res<Time<Real>>, mut history: ResMut<FrameTimeHistory>) {
    history.push_sample(time.delta_secs() * 1000.0);
}

pub(super) fn performance_window_system(
    mut contexts: EguiContexts,
    diagnostics: Res<DiagnosticsStore>,
    history: Res<FrameTimeHistory>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);
    let frame_time = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    egui::Window::new("Performance")
        .default_pos([10.0, 360.0])
        .default_width(220.0)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("FPS: {fps:.0}"));
            ui.label(format!("Frame time: {frame_time:.2} ms"));
            ui.label(format!("Worst (last {FRAME_HISTORY_SIZE}): {:.2} ms", history.worst()));

            let points: PlotPoints = history
                .samples
                .iter()
                .enumerate()
                .map(|(i, &v)| [i as f64, f64::from(v)])
                .collect();
            Plot::new("frame_time_plot")
                .height(60.0)
                .show_axes(false)
                .allow_drag(false)
                .allow_zoom(false)
                .allow_scroll(false)
                .include_y(0.0)
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new("frame time", points).color(egui::Color32::LIGHT_GREEN),
                    );
                });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_capped() {
        let mut history = FrameTimeHistory::default();
        for i in 0..200 {
            history.push_sample(i as f32);
        }
        assert_eq!(history.samples.len(), FRAME_HISTORY_SIZE);
        assert_eq!(history.samples.front(), Some(&80.0));
        assert_eq!(history.worst(), 199.0);
    }
}
