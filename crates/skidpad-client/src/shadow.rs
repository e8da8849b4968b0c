//! Sun light that follows the car.
//!
//! The light keeps a fixed offset from the car and its single shadow cascade
//! reaches from the view camera to just past the car. The cascade grows with
//! the view distance so the car is never outside it.

use bevy::{
    color::palettes::css::{ORANGE, YELLOW},
    light::{CascadeShadowConfig, CascadeShadowConfigBuilder},
    prelude::*,
};
use skidpad::{ShadowFollow, ShadowFrame};

use crate::{SkidpadSystems, camera::MainCamera, settings::Settings, vehicle::Car};

/// Shadow rig state on the sun.
#[derive(Component)]
pub struct ShadowRig {
    pub follow: ShadowFollow,
    /// Placement from the most recent update.
    pub last_frame: Option<ShadowFrame>,
}

impl ShadowRig {
    pub fn new(follow: ShadowFollow) -> Self {
        Self {
            follow,
            last_frame: None,
        }
    }
}

/// Plugin that moves shadow rigs and draws their helper gizmos.
pub struct ShadowPlugin;

impl Plugin for ShadowPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                follow_car_with_shadow,
                draw_shadow_helper.run_if(shadow_helper_enabled),
            )
                .chain()
                .in_set(SkidpadSystems::Rigs),
        );
    }
}

fn shadow_helper_enabled(settings: Res<Settings>) -> bool {
    settings.debug.show_shadow_helper
}

/// Cascade covering everything between the view camera and just past the car.
fn cascade_for(frame: &ShadowFrame, camera_distance: f32) -> CascadeShadowConfig {
    let minimum = frame.bounds.near;
    let maximum = (camera_distance + frame.bounds.right).max(minimum + 1.0);
    CascadeShadowConfigBuilder {
        num_cascades: 1,
        minimum_distance: minimum,
        maximum_distance: maximum,
        first_cascade_far_bound: maximum,
        overlap_proportion: 0.2,
    }
    .build()
}

fn follow_car_with_shadow(
    car_query: Query<&Transform, (With<Car>, Without<ShadowRig>)>,
    camera_query: Query<&GlobalTransform, With<MainCamera>>,
    mut light_query: Query<(&mut ShadowRig, &mut Transform, &mut CascadeShadowConfig)>,
) {
    let target = car_query.iter().next().map(|t| t.translation);

    for (mut rig, mut transform, mut cascades) in &mut light_query {
        let Some(frame) = rig.follow.update(target) else {
            continue;
        };

        *transform =
            Transform::from_translation(frame.light_position).looking_at(frame.light_target, Vec3::Y);

        let camera_distance = camera_query
            .iter()
            .next()
            .map_or(0.0, |camera| camera.translation().distance(frame.shadow_camera_target));
        *cascades = cascade_for(&frame, camera_distance);

        rig.last_frame = Some(frame);
    }
}

/// Draw the light direction and the area the shadow frustum covers.
fn draw_shadow_helper(rig_query: Query<&ShadowRig>, mut gizmos: Gizmos) {
    for rig in &rig_query {
        let Some(frame) = rig.last_frame else {
            continue;
        };
        let bounds = frame.bounds;
        let height = frame.shadow_camera_position.y - frame.shadow_camera_target.y;
        let center = frame.shadow_camera_target + Vec3::Y * (height * 0.5);
        let size = Vec3::new(bounds.right - bounds.left, height, bounds.top - bounds.bottom);

        gizmos.cube(
            Transform::from_translation(center).with_scale(size),
            YELLOW,
        );
        gizmos.arrow(frame.light_position, frame.light_target, ORANGE);
    }
}

#[cfg(test)]
mod tests {
    use skidpad::ShadowFollowConfig;

    use super::*;
    use crate::camera::orbit::MAX_DISTANCE;

    #[test]
    fn test_cascade_reaches_past_target() {
        let follow = ShadowFollow::new(ShadowFollowConfig::default()).unwrap();
        let frame = follow.update(Some(Vec3::ZERO)).unwrap();
        let config = cascade_for(&frame, 20.0);
        assert_eq!(config.bounds.len(), 1);
        assert!((config.bounds[0] - 30.0).abs() < 1e-4);
        assert!((config.minimum_distance - frame.bounds.near).abs() < 1e-6);
    }

    #[test]
    fn test_cascade_contains_car_at_every_orbit_distance() {
        let follow = ShadowFollow::new(ShadowFollowConfig::default()).unwrap();
        let frame = follow.update(Some(Vec3::new(40.0, 0.0, -25.0))).unwrap();
        let mut distance = 0.0;
        while distance <= MAX_DISTANCE {
            let config = cascade_for(&frame, distance);
            assert!(
                config.bounds[0] >= distance + frame.bounds.right - 1e-3,
                "car at {distance} m outside cascade ending at {}",
                config.bounds[0]
            );
            distance += 2.5;
        }
    }

    #[test]
    fn test_cascade_with_short_shadow_distance() {
        let follow = ShadowFollow::new(ShadowFollowConfig {
            shadow_distance: 0.5,
            shadow_size: 0.1,
            ..Default::default()
        })
        .unwrap();
        let frame = follow.update(Some(Vec3::ZERO)).unwrap();
        let config = cascade_for(&frame, 0.0);
        assert!(config.bounds[0] > config.minimum_distance);
    }
}
