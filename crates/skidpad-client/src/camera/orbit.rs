//! Mouse-driven orbit camera.
//!
//! Left-drag rotates around the focus point, the scroll wheel zooms.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use crate::input::DemoAction;

use super::MainCamera;

/// Radians of rotation per pixel of mouse movement.
const ORBIT_SENSITIVITY: f32 = 0.005;
/// Zoom factor per scroll step.
const ZOOM_STEP: f32 = 0.9;
const MIN_DISTANCE: f32 = 3.0;
pub(crate) const MAX_DISTANCE: f32 = 200.0;
/// Keep the camera between just above the horizon and just short of overhead.
const MIN_PITCH: f32 = -FRAC_PI_2 + 0.05;
const MAX_PITCH: f32 = -0.02;

/// Spherical camera placement around a focus point.
///
/// Pitch is negative above the focus.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_view(Vec3::new(0.0, 5.0, 12.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Orbit parameters that reproduce a camera at `position` looking at `focus`.
    pub fn from_view(position: Vec3, focus: Vec3) -> Self {
        let offset = position - focus;
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let (yaw, pitch) = if offset.length_squared() > 1e-6 {
            let dir = offset.normalize();
            (dir.x.atan2(dir.z), (-dir.y).asin())
        } else {
            (0.0, MAX_PITCH)
        };
        Self {
            focus,
            yaw,
            pitch: pitch.clamp(MIN_PITCH, MAX_PITCH),
            distance,
        }
    }

    /// Apply a mouse drag delta and scroll amount.
    pub fn apply_input(&mut self, drag: Vec2, scroll: f32) {
        self.yaw -= drag.x * ORBIT_SENSITIVITY;
        self.pitch = (self.pitch - drag.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
        if scroll != 0.0 {
            self.distance = (self.distance * ZOOM_STEP.powf(scroll)).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    pub fn position(&self) -> Vec3 {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
        self.focus + rotation * Vec3::Z * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.focus, Vec3::Y)
    }
}

/// Rotate and zoom the main camera from mouse input.
pub(super) fn orbit_camera_system(
    action_query: Query<&ActionState<DemoAction>>,
    mut camera_query: Query<(&mut Transform, &mut OrbitCamera), With<MainCamera>>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    let drag = if action_state.pressed(&DemoAction::OrbitDrag) {
        action_state.axis_pair(&DemoAction::Orbit)
    } else {
        Vec2::ZERO
    };
    let scroll = action_state.value(&DemoAction::Zoom);

    for (mut transform, mut orbit) in &mut camera_query {
        orbit.apply_input(drag, scroll);
        *transform = orbit.transform();
    }
}
