//! Chase camera rig.
//!
//! Derives a camera pose from the vehicle's world transform each tick. Two
//! policies are supported:
//!
//! - [`ChasePolicy::SmoothedTrail`]: the camera eases toward a point behind
//!   the vehicle and always looks slightly ahead of it.
//! - [`ChasePolicy::SteeringSwing`]: the camera is placed rigidly behind the
//!   vehicle and swings sideways opposite to the steering angle.
//!
//! Local offsets use the vehicle frame: forward is -Z, so a positive Z offset
//! puts the camera behind the car.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ensure_finite, ensure_in_range, ensure_positive};

/// World transform of the followed vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehiclePose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl VehiclePose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Transform a vehicle-local point to world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// Where the camera sits and what it looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

/// How the trailing camera closes the gap to its desired position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrailSmoothing {
    /// `lerp(camera, desired, factor)` once per tick, regardless of frame time.
    ///
    /// Responsiveness therefore depends on the frame rate.
    PerFrame { factor: f32 },
    /// Frame-rate independent exponential approach: the remaining gap shrinks
    /// by `exp(-decay_rate * dt)` each tick.
    Exponential { decay_rate: f32 },
}

impl TrailSmoothing {
    /// Interpolation factor for a tick of `dt` seconds.
    pub fn factor(&self, dt: f32) -> f32 {
        match *self {
            TrailSmoothing::PerFrame { factor } => factor,
            TrailSmoothing::Exponential { decay_rate } => {
                let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
                1.0 - (-decay_rate * dt).exp()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            TrailSmoothing::PerFrame { factor } => {
                ensure_positive("camera.smoothness", factor)?;
                ensure_in_range("camera.smoothness", factor, 0.0, 1.0)
            }
            TrailSmoothing::Exponential { decay_rate } => {
                ensure_positive("camera.decay_rate", decay_rate)
            }
        }
    }
}

/// Camera placement policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ChasePolicy {
    SmoothedTrail { smoothing: TrailSmoothing },
    /// Lateral offset is `-steering * strength`.
    SteeringSwing { strength: f32 },
}

/// Configuration for [`ChaseCamera`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseCameraConfig {
    /// Camera position in the vehicle frame.
    pub offset: Vec3,
    /// Look-at point in the vehicle frame.
    pub look_ahead: Vec3,
    pub policy: ChasePolicy,
}

impl Default for ChaseCameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 3.0, 8.0),
            look_ahead: Vec3::new(0.0, 0.0, -2.0),
            policy: ChasePolicy::SmoothedTrail {
                smoothing: TrailSmoothing::PerFrame { factor: 0.1 },
            },
        }
    }
}

impl ChaseCameraConfig {
    /// Rigid camera that swings with the steering.
    pub fn steering_swing(offset: Vec3, strength: f32) -> Self {
        Self {
            offset,
            policy: ChasePolicy::SteeringSwing { strength },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("camera.offset.x", self.offset.x),
            ("camera.offset.y", self.offset.y),
            ("camera.offset.z", self.offset.z),
            ("camera.look_ahead.x", self.look_ahead.x),
            ("camera.look_ahead.y", self.look_ahead.y),
            ("camera.look_ahead.z", self.look_ahead.z),
        ] {
            ensure_finite(field, value)?;
        }
        match self.policy {
            ChasePolicy::SmoothedTrail { smoothing } => smoothing.validate(),
            ChasePolicy::SteeringSwing { strength } => {
                ensure_finite("camera.swing_strength", strength)
            }
        }
    }
}

/// Stateful chase camera.
#[derive(Clone, Debug)]
pub struct ChaseCamera {
    config: ChaseCameraConfig,
    last: Option<CameraPose>,
}

impl ChaseCamera {
    pub fn new(config: ChaseCameraConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, last: None })
    }

    pub fn config(&self) -> &ChaseCameraConfig {
        &self.config
    }

    /// The pose produced by the last successful update.
    pub fn last_pose(&self) -> Option<CameraPose> {
        self.last
    }

    /// Compute this tick's camera pose.
    ///
    /// `camera_position` is where the camera currently is; the trail policy
    /// eases from there. Returns `None` and leaves the state untouched when
    /// there is no vehicle to follow.
    pub fn update(
        &mut self,
        camera_position: Vec3,
        target: Option<VehiclePose>,
        steering: f32,
        dt: f32,
    ) -> Option<CameraPose> {
        let target = target?;
        let look_at = target.transform_point(self.config.look_ahead);

        let position = match self.config.policy {
            ChasePolicy::SmoothedTrail { smoothing } => {
                let desired = target.transform_point(self.config.offset);
                camera_position.lerp(desired, smoothing.factor(dt))
            }
            ChasePolicy::SteeringSwing { strength } => {
                let swing = -steering * strength;
                target.transform_point(self.config.offset + Vec3::X * swing)
            }
        };

        let pose = CameraPose { position, look_at };
        self.last = Some(pose);
        Some(pose)
    }
}
