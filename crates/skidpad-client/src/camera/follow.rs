//! Chase camera that follows the car.

use bevy::prelude::*;
use skidpad::{ChaseCamera, ChaseCameraConfig, ChasePolicy, TrailSmoothing, VehiclePose};

use crate::vehicle::Car;

use super::MainCamera;

/// Decay rate of the frame-rate independent trail, in 1/s.
const SMOOTH_TRAIL_DECAY_RATE: f32 = 6.0;

/// Selectable chase camera presets.
#[derive(Default, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(not(target_family = "wasm"), derive(clap::ValueEnum))]
pub enum ChaseStyle {
    /// Eases a tenth of the way toward the target each frame.
    #[default]
    Trail,
    /// Eases toward the target at a fixed rate per second.
    SmoothTrail,
    /// Rigid camera that swings opposite to the steering.
    Swing,
}

impl ChaseStyle {
    pub fn config(self) -> ChaseCameraConfig {
        match self {
            ChaseStyle::Trail => ChaseCameraConfig::default(),
            ChaseStyle::SmoothTrail => ChaseCameraConfig {
                policy: ChasePolicy::SmoothedTrail {
                    smoothing: TrailSmoothing::Exponential {
                        decay_rate: SMOOTH_TRAIL_DECAY_RATE,
                    },
                },
                ..Default::default()
            },
            ChaseStyle::Swing => ChaseCameraConfig::steering_swing(Vec3::new(0.0, 3.0, 13.0), 1.0),
        }
    }
}

/// Chase rig state on the main camera.
#[derive(Component)]
pub struct ChaseRig {
    pub camera: ChaseCamera,
}

/// The car entity the chase rig follows.
#[derive(Component)]
pub struct ChaseTarget(pub Entity);

/// Hand the car to the chase rig once both exist.
pub(super) fn attach_chase_target(
    mut commands: Commands,
    camera_query: Query<Entity, (With<MainCamera>, With<ChaseRig>, Without<ChaseTarget>)>,
    car_query: Query<Entity, With<Car>>,
) {
    let Some(car) = car_query.iter().next() else {
        return;
    };
    for camera in &camera_query {
        commands.entity(camera).insert(ChaseTarget(car));
        tracing::debug!("Chase camera following {car:?}");
    }
}

/// Place the camera behind its target car.
///
/// Does nothing for a camera whose target has not been spawned or is gone.
pub(super) fn chase_camera_system(
    time: Res<Time>,
    mut camera_query: Query<(&mut Transform, &mut ChaseRig, &ChaseTarget), Without<Car>>,
    car_query: Query<(&Transform, &Car)>,
) {
    let dt = time.delta_secs();

    for (mut transform, mut rig, target) in &mut camera_query {
        let car = car_query.get(target.0).ok();
        let pose = car.map(|(car_transform, _)| {
            VehiclePose::new(car_transform.translation, car_transform.rotation)
        });
        let steering = car.map_or(0.0, |(_, car)| car.controller.steering_value());

        let Some(camera_pose) = rig
            .camera
            .update(transform.translation, pose, steering, dt)
        else {
            continue;
        };

        transform.translation = camera_pose.position;
        transform.look_at(camera_pose.look_at, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for style in [ChaseStyle::Trail, ChaseStyle::SmoothTrail, ChaseStyle::Swing] {
            assert!(ChaseCamera::new(style.config()).is_ok(), "{style:?}");
        }
    }
}
