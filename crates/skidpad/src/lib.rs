//! Engine-independent core of the skidpad driving demo.
//!
//! This crate holds the vehicle control and camera-following logic: keyboard
//! sampling, steering integration, rig commands with one-shot resets, chase
//! camera and shadow rig placement, and speed reporting. Rendering and rigid
//! body dynamics live behind the narrow [`VehicleRig`] trait and plain
//! [`glam`] poses, so everything here runs in plain unit tests.
//!
//! # Design principles
//!
//! - **Owned state**: key state lives in the controller that reads it
//! - **Fail at construction**: invalid configuration is rejected up front;
//!   nothing in the per-tick path is fallible
//! - **Not ready is not an error**: a missing rig or target skips the tick
//!
//! # Example
//!
//! ```
//! use skidpad::{CarConfig, VehicleController, VehicleRig};
//! # use glam::{Quat, Vec3};
//! # struct Rig;
//! # impl VehicleRig for Rig {
//! #     fn apply_engine_force(&mut self, _: f32, _: usize) {}
//! #     fn set_steering_value(&mut self, _: f32, _: usize) {}
//! #     fn set_position(&mut self, _: Vec3) {}
//! #     fn set_rotation(&mut self, _: Quat) {}
//! #     fn set_velocity(&mut self, _: Vec3) {}
//! #     fn set_angular_velocity(&mut self, _: Vec3) {}
//! # }
//!
//! let mut controller = VehicleController::new(&CarConfig::default())?;
//! controller.input_mut().key_down("w");
//!
//! let mut rig = Rig;
//! let command = controller.tick(1.0 / 60.0, Some(&mut rig));
//! assert_eq!(command.map(|c| c.engine_force), Some(4000.0));
//! # Ok::<(), skidpad::ConfigError>(())
//! ```

pub mod camera;
pub mod config;
pub mod controller;
mod error;
pub mod input;
pub mod shadow;
pub mod speed;
pub mod steering;

pub use camera::{
    CameraPose, ChaseCamera, ChaseCameraConfig, ChasePolicy, TrailSmoothing, VehiclePose,
};
pub use config::{CarConfig, CarDimensions, ChassisPhysics, DrivingConfig, WheelSuspension};
pub use controller::{DriveCommand, VehicleController, VehicleRig, reset_trigger_from_raw};
pub use error::{ConfigError, Result};
pub use input::{DriveKey, InputSampler, KeyResponse, KeyState};
pub use shadow::{OrthoBounds, ShadowFollow, ShadowFollowConfig, ShadowFrame};
pub use speed::SpeedSampler;
pub use steering::SteeringIntegrator;
