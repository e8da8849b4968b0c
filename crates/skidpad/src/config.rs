//! Car configuration.
//!
//! Dimensions, suspension and driving parameters for a four-wheeled raycast
//! vehicle. Defaults describe the demo's sports car; alternative cars can be
//! loaded from JSON since every struct is `serde`-deserializable with defaults
//! for missing fields.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ensure_finite, ensure_in_range, ensure_positive};

/// Number of wheels on the rig.
pub const WHEEL_COUNT: usize = 4;

/// Steerable wheel indices (front left, front right).
pub const FRONT_WHEELS: [usize; 2] = [0, 1];

/// Driven wheel indices (rear left, rear right).
pub const REAR_WHEELS: [usize; 2] = [2, 3];

/// Complete description of a car.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    /// Display name.
    pub name: String,
    /// Body and wheel geometry.
    pub dimensions: CarDimensions,
    /// Chassis rigid body parameters.
    pub chassis: ChassisPhysics,
    /// Per-wheel suspension parameters (shared by all four wheels).
    pub wheels: WheelSuspension,
    /// Driver-facing parameters.
    pub driving: DrivingConfig,
    /// Ground-level spawn point; the chassis is raised by
    /// [`CarConfig::chassis_y_offset`] above it.
    pub spawn: Vec3,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            name: "Porsche 911 GT2".to_string(),
            dimensions: CarDimensions::default(),
            chassis: ChassisPhysics::default(),
            wheels: WheelSuspension::default(),
            driving: DrivingConfig::default(),
            spawn: Vec3::ZERO,
        }
    }
}

/// Body and wheel geometry in meters. Forward is -Z, right is +X.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarDimensions {
    /// Chassis box size (width, height, length).
    pub chassis_size: Vec3,
    pub wheel_radius: f32,
    pub wheel_width: f32,
    /// Distance between the front and rear axles.
    pub wheelbase: f32,
    /// Track width parameter. Wheels sit at `±track_width / 4`, so the left
    /// and right connection lines are `track_width / 2` apart.
    pub track_width: f32,
    /// Extra Z offset applied to the front axle.
    pub front_offset: f32,
    /// Extra Z offset applied to the rear axle.
    pub back_offset: f32,
    /// Y of the wheel connection points relative to the chassis center.
    pub connection_height: f32,
}

impl Default for CarDimensions {
    fn default() -> Self {
        Self {
            chassis_size: Vec3::new(1.65, 1.33, 4.1),
            wheel_radius: 0.3,
            wheel_width: 0.25,
            wheelbase: 2.5,
            track_width: 3.6,
            front_offset: -0.06,
            back_offset: -0.09,
            connection_height: -0.2,
        }
    }
}

/// Chassis rigid body parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisPhysics {
    /// Mass in kg.
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub allow_sleep: bool,
}

impl Default for ChassisPhysics {
    fn default() -> Self {
        Self {
            mass: 1500.0,
            linear_damping: 0.0,
            angular_damping: 0.4,
            allow_sleep: false,
        }
    }
}

/// Raycast wheel suspension parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelSuspension {
    pub suspension_stiffness: f32,
    pub suspension_rest_length: f32,
    /// Tire grip coefficient; lateral force is limited to `friction_slip * load`.
    pub friction_slip: f32,
    pub damping_relaxation: f32,
    pub damping_compression: f32,
    pub max_suspension_force: f32,
    /// Scales the height at which side forces act (0 = at the chassis center).
    pub roll_influence: f32,
    pub max_suspension_travel: f32,
    /// Wheel spin rate used while sliding, in rad/s.
    pub custom_sliding_rotational_speed: f32,
    pub use_custom_sliding_rotational_speed: bool,
}

impl Default for WheelSuspension {
    fn default() -> Self {
        Self {
            suspension_stiffness: 100.0,
            suspension_rest_length: 0.2,
            friction_slip: 3.0,
            damping_relaxation: 1.0,
            damping_compression: 1.4,
            max_suspension_force: 100_000.0,
            roll_influence: 0.06,
            max_suspension_travel: 0.3,
            custom_sliding_rotational_speed: -30.0,
            use_custom_sliding_rotational_speed: true,
        }
    }
}

/// Driver-facing parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivingConfig {
    /// Force applied to each driven wheel while accelerating, in newtons.
    pub engine_force: f32,
    /// Steering limit in radians.
    pub max_steering_value: f32,
    /// Steering rate in rad/s. Self-centering runs at twice this rate.
    pub steering_speed: f32,
}

impl Default for DrivingConfig {
    fn default() -> Self {
        Self {
            engine_force: 4000.0,
            max_steering_value: 0.5,
            steering_speed: 1.0,
        }
    }
}

impl DrivingConfig {
    /// Validate the driving parameters.
    pub fn validate(&self) -> Result<()> {
        ensure_finite("driving.engine_force", self.engine_force)?;
        ensure_positive("driving.max_steering_value", self.max_steering_value)?;
        ensure_positive("driving.steering_speed", self.steering_speed)?;
        Ok(())
    }
}

impl CarConfig {
    /// Validate every parameter that would make the rig misbehave.
    pub fn validate(&self) -> Result<()> {
        let d = &self.dimensions;
        ensure_positive("dimensions.chassis_size.x", d.chassis_size.x)?;
        ensure_positive("dimensions.chassis_size.y", d.chassis_size.y)?;
        ensure_positive("dimensions.chassis_size.z", d.chassis_size.z)?;
        ensure_positive("dimensions.wheel_radius", d.wheel_radius)?;
        ensure_positive("dimensions.wheel_width", d.wheel_width)?;
        ensure_positive("dimensions.wheelbase", d.wheelbase)?;
        ensure_positive("dimensions.track_width", d.track_width)?;
        ensure_finite("dimensions.front_offset", d.front_offset)?;
        ensure_finite("dimensions.back_offset", d.back_offset)?;
        ensure_finite("dimensions.connection_height", d.connection_height)?;

        let c = &self.chassis;
        ensure_positive("chassis.mass", c.mass)?;
        ensure_in_range("chassis.linear_damping", c.linear_damping, 0.0, 1.0)?;
        ensure_in_range("chassis.angular_damping", c.angular_damping, 0.0, 1.0)?;

        let w = &self.wheels;
        ensure_positive("wheels.suspension_stiffness", w.suspension_stiffness)?;
        ensure_positive("wheels.suspension_rest_length", w.suspension_rest_length)?;
        ensure_positive("wheels.friction_slip", w.friction_slip)?;
        ensure_positive("wheels.damping_relaxation", w.damping_relaxation)?;
        ensure_positive("wheels.damping_compression", w.damping_compression)?;
        ensure_positive("wheels.max_suspension_force", w.max_suspension_force)?;
        ensure_in_range("wheels.roll_influence", w.roll_influence, 0.0, 1.0)?;
        ensure_positive("wheels.max_suspension_travel", w.max_suspension_travel)?;
        ensure_finite(
            "wheels.custom_sliding_rotational_speed",
            w.custom_sliding_rotational_speed,
        )?;

        self.driving.validate()?;

        ensure_finite("spawn.x", self.spawn.x)?;
        ensure_finite("spawn.y", self.spawn.y)?;
        ensure_finite("spawn.z", self.spawn.z)?;
        Ok(())
    }

    /// Height of the chassis center above the ground when resting on its wheels.
    pub fn chassis_y_offset(&self) -> f32 {
        self.dimensions.chassis_size.y / 2.0 + self.dimensions.wheel_radius
    }

    /// World position the chassis body is placed at on spawn and reset.
    pub fn spawn_position(&self) -> Vec3 {
        self.spawn + Vec3::Y * self.chassis_y_offset()
    }

    /// Chassis-local suspension connection point for a wheel.
    ///
    /// Indices 0 and 1 are the front axle, 2 and 3 the rear; even indices are
    /// on the left (-X).
    pub fn wheel_connection_point(&self, index: usize) -> Vec3 {
        let d = &self.dimensions;
        let z = if index < 2 {
            -d.wheelbase / 2.0 + d.front_offset
        } else {
            d.wheelbase / 2.0 + d.back_offset
        };
        let side = if index % 2 == 1 { 0.5 } else { -0.5 };
        Vec3::new(d.track_width / 2.0 * side, d.connection_height, z)
    }

    /// Connection points for all four wheels, in index order.
    pub fn wheel_connection_points(&self) -> [Vec3; WHEEL_COUNT] {
        std::array::from_fn(|i| self.wheel_connection_point(i))
    }
}

/// Whether a wheel index belongs to the steerable front axle.
pub fn is_front_wheel(index: usize) -> bool {
    FRONT_WHEELS.contains(&index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_default_is_valid() {
        CarConfig::default().validate().unwrap();
    }

    #[test]
    fn test_chassis_y_offset() {
        let config = CarConfig::default();
        assert!((config.chassis_y_offset() - (1.33 / 2.0 + 0.3)).abs() < 1e-6);
        let spawn = CarConfig {
            spawn: Vec3::new(2.0, 1.0, -3.0),
            ..Default::default()
        }
        .spawn_position();
        assert!((spawn - Vec3::new(2.0, 1.0 + 0.965, -3.0)).length() < 1e-5);
    }

    #[test]
    fn test_wheel_connection_points() {
        let config = CarConfig::default();
        let points = config.wheel_connection_points();

        // Front axle is ahead (-Z), rear axle behind.
        assert!((points[0].z - (-1.31)).abs() < 1e-5);
        assert!((points[2].z - 1.16).abs() < 1e-5);
        // Left wheels at -X, right wheels at +X.
        assert!((points[0].x + 0.9).abs() < 1e-5);
        assert!((points[1].x - 0.9).abs() < 1e-5);
        assert!((points[3].x - 0.9).abs() < 1e-5);
        assert!(points.iter().all(|p| (p.y + 0.2).abs() < 1e-6));
    }

    #[test]
    fn test_connection_lines_are_half_track_apart() {
        let config = CarConfig {
            dimensions: CarDimensions {
                track_width: 2.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let points = config.wheel_connection_points();
        assert!((points[1].x - points[0].x - 1.0).abs() < 1e-6);
        assert!((points[3].x - points[2].x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_non_positive_steering() {
        let mut config = CarConfig::default();
        config.driving.max_steering_value = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "driving.max_steering_value",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_rejects_negative_radius() {
        let mut config = CarConfig::default();
        config.dimensions.wheel_radius = -0.3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "dimensions.wheel_radius",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CarConfig =
            serde_json::from_str(r#"{ "name": "Test", "driving": { "engine_force": 1500.0 } }"#)
                .unwrap();
        assert_eq!(config.name, "Test");
        assert_eq!(config.driving.engine_force, 1500.0);
        assert_eq!(config.driving.max_steering_value, 0.5);
        assert_eq!(config.wheels, WheelSuspension::default());
    }

    #[test]
    fn test_front_wheels() {
        assert!(is_front_wheel(0));
        assert!(is_front_wheel(1));
        assert!(!is_front_wheel(2));
        assert!(!is_front_wheel(3));
    }
}
