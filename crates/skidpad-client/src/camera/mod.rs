//! Camera modes for the demo.
//!
//! ## Camera mode state machine
//!
//! Mode changes go through [`CameraModeTransitions`] so that setup for the
//! new mode happens in one place.
//!
//! ### States
//!
//! - **Orbit**: mouse-driven orbit camera around a focus point. The chase rig
//!   is disabled.
//! - **Follow**: the chase rig places the camera behind the car every frame.
//!
//! ### Valid transitions
//!
//! ```text
//! Orbit <-> Follow
//! ```

mod follow;
pub(crate) mod orbit;

use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    SkidpadSystems, input::DemoAction, launch_params::LaunchParams, settings::Settings,
    vehicle::Car,
};

pub use follow::{ChaseRig, ChaseStyle};
pub use orbit::OrbitCamera;

// ============================================================================
// Camera mode
// ============================================================================

/// Camera mode enumeration.
#[derive(Default, PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(not(target_family = "wasm"), derive(clap::ValueEnum))]
pub enum CameraMode {
    /// Free orbit around the scene.
    Orbit,
    /// Chase camera behind the car.
    #[default]
    Follow,
}

impl CameraMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::Orbit => CameraMode::Follow,
            CameraMode::Follow => CameraMode::Orbit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraMode::Orbit => "Orbit",
            CameraMode::Follow => "Follow",
        }
    }
}

/// Current camera mode.
#[derive(Resource, Default)]
pub struct CameraModeState {
    current: CameraMode,
}

impl CameraModeState {
    pub fn current(&self) -> CameraMode {
        self.current
    }

    pub fn is_orbit(&self) -> bool {
        self.current == CameraMode::Orbit
    }

    pub fn is_follow(&self) -> bool {
        self.current == CameraMode::Follow
    }
}

/// A pending camera mode switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ModeRequest {
    mode: CameraMode,
    /// Whether the new mode becomes the saved preference.
    remember: bool,
}

/// Camera mode transition requests.
#[derive(Resource, Default)]
pub struct CameraModeTransitions {
    pending: Vec<ModeRequest>,
}

impl CameraModeTransitions {
    /// Request a switch to `mode` and save it as the preferred mode.
    /// Requesting the current mode is a no-op.
    pub fn request(&mut self, mode: CameraMode) {
        self.pending.push(ModeRequest {
            mode,
            remember: true,
        });
    }

    /// Request a switch to `mode` for this session only.
    pub fn request_for_session(&mut self, mode: CameraMode) {
        self.pending.push(ModeRequest {
            mode,
            remember: false,
        });
    }

    fn take(&mut self) -> Vec<ModeRequest> {
        std::mem::take(&mut self.pending)
    }
}

/// Marker for the camera that renders the scene.
#[derive(Component)]
pub struct MainCamera;

// ============================================================================
// Plugin
// ============================================================================

/// Plugin for the orbit and chase cameras and mode management.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraModeState>()
            .init_resource::<CameraModeTransitions>()
            .add_systems(PostStartup, apply_initial_camera_mode)
            .add_systems(
                Update,
                (
                    toggle_camera_mode.in_set(SkidpadSystems::Input),
                    process_mode_transitions.in_set(SkidpadSystems::Input),
                    follow::attach_chase_target,
                    follow::chase_camera_system
                        .run_if(is_follow_mode)
                        .in_set(SkidpadSystems::Rigs),
                    orbit::orbit_camera_system
                        .run_if(is_orbit_mode)
                        .in_set(SkidpadSystems::Rigs),
                )
                    .chain(),
            );
    }
}

/// Run condition: Follow mode is active.
fn is_follow_mode(state: Res<CameraModeState>) -> bool {
    state.is_follow()
}

/// Run condition: Orbit mode is active.
fn is_orbit_mode(state: Res<CameraModeState>) -> bool {
    state.is_orbit()
}

// ============================================================================
// Mode transitions
// ============================================================================

/// Apply the launch override, or else the mode restored from settings.
fn apply_initial_camera_mode(
    params: Res<LaunchParams>,
    settings: Res<Settings>,
    mut transitions: ResMut<CameraModeTransitions>,
) {
    queue_initial_mode(&mut transitions, params.camera_mode, settings.camera_mode);
}

fn queue_initial_mode(
    transitions: &mut CameraModeTransitions,
    launch_override: Option<CameraMode>,
    saved: CameraMode,
) {
    match launch_override {
        Some(mode) => transitions.request_for_session(mode),
        None => transitions.request(saved),
    }
}

/// Toggle between orbit and follow with the C key.
fn toggle_camera_mode(
    action_query: Query<&ActionState<DemoAction>>,
    state: Res<CameraModeState>,
    mut transitions: ResMut<CameraModeTransitions>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    if action_state.just_pressed(&DemoAction::ToggleCameraMode) {
        transitions.request(state.current().toggled());
    }
}

/// Process camera mode transition requests.
fn process_mode_transitions(
    mut transitions: ResMut<CameraModeTransitions>,
    mut state: ResMut<CameraModeState>,
    mut settings: ResMut<Settings>,
    mut camera_query: Query<(&Transform, &mut OrbitCamera), With<MainCamera>>,
    car_query: Query<&Transform, (With<Car>, Without<MainCamera>)>,
) {
    for ModeRequest { mode, remember } in transitions.take() {
        if mode == CameraMode::Orbit {
            // Orbit around wherever the car is now, starting from the current view.
            let focus = car_query.iter().next().map_or(Vec3::ZERO, |t| t.translation);
            for (transform, mut orbit) in &mut camera_query {
                *orbit = OrbitCamera::from_view(transform.translation, focus);
            }
        }

        if state.current != mode {
            tracing::info!("Transitioned to {} camera", mode.label());
        }
        state.current = mode;
        if remember && settings.camera_mode != mode {
            settings.camera_mode = mode;
        }
    }
}
