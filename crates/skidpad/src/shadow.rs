//! Shadow follow rig.
//!
//! Keeps a directional light and its shadow frustum centered on the vehicle,
//! so a small high-resolution shadow map covers the car wherever it drives.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, ensure_finite, ensure_positive};

/// Near plane of the shadow camera.
pub const SHADOW_NEAR: f32 = 0.1;

/// Configuration for [`ShadowFollow`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowFollowConfig {
    /// World-space offset from the vehicle to the light.
    pub light_offset: Vec3,
    /// Height of the shadow camera above the vehicle.
    pub camera_height: f32,
    /// Half extent of the orthographic shadow frustum.
    pub shadow_size: f32,
    /// Far plane of the shadow frustum.
    pub shadow_distance: f32,
}

impl Default for ShadowFollowConfig {
    fn default() -> Self {
        Self {
            light_offset: Vec3::new(50.0, 150.0, 50.0),
            camera_height: 50.0,
            shadow_size: 10.0,
            shadow_distance: 100.0,
        }
    }
}

impl ShadowFollowConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("shadow.light_offset.x", self.light_offset.x)?;
        ensure_finite("shadow.light_offset.y", self.light_offset.y)?;
        ensure_finite("shadow.light_offset.z", self.light_offset.z)?;
        ensure_positive("shadow.camera_height", self.camera_height)?;
        ensure_positive("shadow.shadow_size", self.shadow_size)?;
        ensure_positive("shadow.shadow_distance", self.shadow_distance)?;
        if self.shadow_distance <= SHADOW_NEAR {
            return Err(ConfigError::OutOfRange {
                field: "shadow.shadow_distance",
                value: self.shadow_distance,
                min: SHADOW_NEAR,
                max: f32::MAX,
            });
        }
        Ok(())
    }
}

/// Orthographic frustum bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthoBounds {
    /// A square frustum of half extent `size`.
    pub fn square(size: f32, near: f32, far: f32) -> Self {
        Self {
            left: -size,
            right: size,
            top: size,
            bottom: -size,
            near,
            far,
        }
    }

    /// Whether a point, expressed relative to the frustum center, lies
    /// inside the horizontal and vertical bounds.
    pub fn contains_xy(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }
}

/// Light and shadow camera placement for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowFrame {
    pub light_position: Vec3,
    pub light_target: Vec3,
    pub shadow_camera_position: Vec3,
    pub shadow_camera_target: Vec3,
    pub bounds: OrthoBounds,
}

impl ShadowFrame {
    /// Direction the light shines in.
    pub fn light_direction(&self) -> Vec3 {
        (self.light_target - self.light_position).normalize_or_zero()
    }
}

/// Stateless rig; the whole frame is rewritten every tick.
#[derive(Clone, Debug)]
pub struct ShadowFollow {
    config: ShadowFollowConfig,
}

impl ShadowFollow {
    pub fn new(config: ShadowFollowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ShadowFollowConfig {
        &self.config
    }

    /// Place the light and shadow camera around a vehicle at `target`.
    pub fn update(&self, target: Option<Vec3>) -> Option<ShadowFrame> {
        let target = target?;
        Some(ShadowFrame {
            light_position: target + self.config.light_offset,
            light_target: target,
            shadow_camera_position: target + Vec3::Y * self.config.camera_height,
            shadow_camera_target: target,
            bounds: OrthoBounds::square(
                self.config.shadow_size,
                SHADOW_NEAR,
                self.config.shadow_distance,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_default_frame() {
        let rig = ShadowFollow::new(ShadowFollowConfig::default()).unwrap();
        let frame = rig.update(Some(Vec3::new(1.0, 0.5, -2.0))).unwrap();
        assert_eq!(frame.light_position, Vec3::new(51.0, 150.5, 48.0));
        assert_eq!(frame.light_target, Vec3::new(1.0, 0.5, -2.0));
        assert_eq!(frame.shadow_camera_position, Vec3::new(1.0, 50.5, -2.0));
        assert_eq!(
            frame.bounds,
            OrthoBounds {
                left: -10.0,
                right: 10.0,
                top: 10.0,
                bottom: -10.0,
                near: 0.1,
                far: 100.0,
            }
        );
    }

    #[test]
    fn test_light_points_at_vehicle() {
        let rig = ShadowFollow::new(ShadowFollowConfig::default()).unwrap();
        let frame = rig.update(Some(Vec3::ZERO)).unwrap();
        let direction = frame.light_direction();
        assert!(direction.y < 0.0);
        assert!((direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_target_is_noop() {
        let rig = ShadowFollow::new(ShadowFollowConfig::default()).unwrap();
        assert!(rig.update(None).is_none());
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = ShadowFollowConfig {
            shadow_size: 0.0,
            ..Default::default()
        };
        assert!(ShadowFollow::new(config).is_err());
        let config = ShadowFollowConfig {
            shadow_distance: 0.05,
            ..Default::default()
        };
        assert!(ShadowFollow::new(config).is_err());
    }

    proptest! {
        #[test]
        fn prop_frustum_tracks_vehicle(
            x in -1000.0f32..1000.0,
            y in -10.0f32..10.0,
            z in -1000.0f32..1000.0,
            size in 1.0f32..50.0,
        ) {
            let rig = ShadowFollow::new(ShadowFollowConfig {
                shadow_size: size,
                ..Default::default()
            })
            .unwrap();
            let frame = rig.update(Some(Vec3::new(x, y, z))).unwrap();
            prop_assert_eq!(frame.bounds.left, -size);
            prop_assert_eq!(frame.bounds.right, size);
            prop_assert_eq!(frame.shadow_camera_position.x, x);
            prop_assert_eq!(frame.shadow_camera_position.z, z);
            // The vehicle sits at the frustum center.
            prop_assert!(frame.bounds.contains_xy(0.0, 0.0));
        }
    }
}
