//! Vehicle controller.
//!
//! Turns the sampled driving keys into per-wheel rig commands once per tick,
//! and performs one-shot resets when an external counter advances.
//!
//! ## Readiness
//!
//! The rig handle is produced by the physics engine some time after the
//! controller exists. Until then every tick and reset is skipped silently:
//!
//! ```text
//! NotReady --(rig handle available)--> Ready
//! ```
//!
//! Once ready the controller stays ready for the session.

use glam::{Quat, Vec3};

use crate::{
    config::{CarConfig, FRONT_WHEELS, REAR_WHEELS},
    error::Result,
    input::{InputSampler, KeyState},
    steering::SteeringIntegrator,
};

/// Narrow view of a raycast vehicle in the physics engine.
///
/// Calls are fire-and-forget; the controller never inspects a result.
/// Wheel indices 0 and 1 are the front (steerable) wheels, 2 and 3 the rear
/// (driven) wheels.
pub trait VehicleRig {
    /// Set the engine force on one wheel, in newtons. Persists until changed.
    fn apply_engine_force(&mut self, force: f32, wheel: usize);
    /// Set the steering angle of one wheel, in radians.
    fn set_steering_value(&mut self, angle: f32, wheel: usize);
    /// Teleport the chassis body.
    fn set_position(&mut self, position: Vec3);
    /// Set the chassis body orientation.
    fn set_rotation(&mut self, rotation: Quat);
    /// Set the chassis linear velocity.
    fn set_velocity(&mut self, velocity: Vec3);
    /// Set the chassis angular velocity.
    fn set_angular_velocity(&mut self, angular_velocity: Vec3);
}

/// Commands issued to the rig during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriveCommand {
    /// Force applied to each rear wheel.
    pub engine_force: f32,
    /// Steering angle applied to each front wheel.
    pub steering: f32,
}

/// Drives a [`VehicleRig`] from keyboard input.
#[derive(Clone, Debug)]
pub struct VehicleController {
    input: InputSampler,
    steering: SteeringIntegrator,
    engine_force: f32,
    reset_position: Vec3,
    /// Highest reset trigger already applied. Zero means none.
    last_reset: u64,
    ready: bool,
}

impl VehicleController {
    /// Create a controller for a car. Fails if the car configuration is invalid.
    pub fn new(config: &CarConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            input: InputSampler::new(),
            steering: SteeringIntegrator::new(&config.driving)?,
            engine_force: config.driving.engine_force,
            reset_position: config.spawn_position(),
            last_reset: 0,
            ready: false,
        })
    }

    /// The keyboard sampler owned by this controller.
    pub fn input(&self) -> &InputSampler {
        &self.input
    }

    /// Mutable access for feeding key events.
    pub fn input_mut(&mut self) -> &mut InputSampler {
        &mut self.input
    }

    /// Current steering angle in radians.
    pub fn steering_value(&self) -> f32 {
        self.steering.value()
    }

    /// Highest reset trigger applied so far.
    pub fn last_reset(&self) -> u64 {
        self.last_reset
    }

    /// Whether a rig handle has been seen.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Run one control tick.
    ///
    /// Returns `None` without touching anything when the rig is not ready.
    pub fn tick<R: VehicleRig + ?Sized>(
        &mut self,
        dt: f32,
        rig: Option<&mut R>,
    ) -> Option<DriveCommand> {
        let rig = self.ready_rig(rig)?;
        let keys = self.input.state();

        let engine_force = engine_force_for(keys, self.engine_force);
        // Always written, so a released key never leaves a stale force behind.
        for wheel in REAR_WHEELS {
            rig.apply_engine_force(engine_force, wheel);
        }

        let steering = self.steering.step(keys.left, keys.right, dt);
        for wheel in FRONT_WHEELS {
            rig.set_steering_value(steering, wheel);
        }

        Some(DriveCommand {
            engine_force,
            steering,
        })
    }

    /// Observe the external reset counter and reset the rig if it advanced.
    ///
    /// A trigger fires only when it is positive and greater than every
    /// trigger already applied, so holding the same value across ticks resets
    /// exactly once. A trigger seen while the rig is not ready stays pending
    /// and fires on the first call that has a rig.
    ///
    /// Returns whether a reset was applied.
    pub fn observe_reset<R: VehicleRig + ?Sized>(
        &mut self,
        trigger: u64,
        rig: Option<&mut R>,
    ) -> bool {
        if trigger == 0 || trigger <= self.last_reset {
            return false;
        }
        let Some(rig) = self.ready_rig(rig) else {
            return false;
        };

        self.last_reset = trigger;
        rig.set_position(self.reset_position);
        rig.set_rotation(Quat::IDENTITY);
        rig.set_velocity(Vec3::ZERO);
        rig.set_angular_velocity(Vec3::ZERO);

        self.steering.reset();
        for wheel in FRONT_WHEELS {
            rig.set_steering_value(0.0, wheel);
        }

        tracing::info!(trigger, position = ?self.reset_position, "Vehicle reset");
        true
    }

    fn ready_rig<'r, R: VehicleRig + ?Sized>(
        &mut self,
        rig: Option<&'r mut R>,
    ) -> Option<&'r mut R> {
        let rig = rig?;
        if !self.ready {
            self.ready = true;
            tracing::info!("Vehicle rig ready");
        }
        Some(rig)
    }
}

/// Engine force for the held keys. Forward wins over backward.
fn engine_force_for(keys: KeyState, engine_force: f32) -> f32 {
    if keys.forward {
        engine_force
    } else if keys.backward {
        -engine_force
    } else {
        0.0
    }
}

/// Interpret an untyped reset counter, such as one read from a script or
/// settings value. Negative, fractional and non-finite values are not
/// triggers.
pub fn reset_trigger_from_raw(raw: f64) -> Option<u64> {
    // 2^64 is exactly representable; anything at or above it cannot fit.
    if !raw.is_finite()
        || raw < 0.0
        || raw.fract() != 0.0
        || raw >= 18_446_744_073_709_551_616.0
    {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(raw as u64)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::config::DrivingConfig;

    /// A single call recorded by [`RecordingRig`].
    #[derive(Clone, Debug, PartialEq)]
    enum RigCall {
        EngineForce(f32, usize),
        Steering(f32, usize),
        Position(Vec3),
        Rotation(Quat),
        Velocity(Vec3),
        AngularVelocity(Vec3),
    }

    #[derive(Default)]
    struct RecordingRig {
        calls: Vec<RigCall>,
    }

    impl RecordingRig {
        fn body_mutations(&self) -> usize {
            self.calls
                .iter()
                .filter(|call| {
                    !matches!(call, RigCall::EngineForce(..) | RigCall::Steering(..))
                })
                .count()
        }
    }

    impl VehicleRig for RecordingRig {
        fn apply_engine_force(&mut self, force: f32, wheel: usize) {
            self.calls.push(RigCall::EngineForce(force, wheel));
        }
        fn set_steering_value(&mut self, angle: f32, wheel: usize) {
            self.calls.push(RigCall::Steering(angle, wheel));
        }
        fn set_position(&mut self, position: Vec3) {
            self.calls.push(RigCall::Position(position));
        }
        fn set_rotation(&mut self, rotation: Quat) {
            self.calls.push(RigCall::Rotation(rotation));
        }
        fn set_velocity(&mut self, velocity: Vec3) {
            self.calls.push(RigCall::Velocity(velocity));
        }
        fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
            self.calls.push(RigCall::AngularVelocity(angular_velocity));
        }
    }

    fn controller(steering_speed: f32) -> VehicleController {
        VehicleController::new(&CarConfig {
            driving: DrivingConfig {
                engine_force: 4000.0,
                max_steering_value: 0.5,
                steering_speed,
            },
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_forward_and_left_tick() {
        let mut controller = controller(2.0);
        controller.input_mut().key_down("w");
        controller.input_mut().key_down("a");

        let mut rig = RecordingRig::default();
        let command = controller.tick(0.1, Some(&mut rig)).unwrap();

        assert_eq!(command.engine_force, 4000.0);
        assert!((command.steering - 0.2).abs() < 1e-6);
        assert_eq!(
            rig.calls,
            vec![
                RigCall::EngineForce(4000.0, 2),
                RigCall::EngineForce(4000.0, 3),
                RigCall::Steering(command.steering, 0),
                RigCall::Steering(command.steering, 1),
            ]
        );
    }

    #[test]
    fn test_backward_applies_negative_force() {
        let mut controller = controller(1.0);
        controller.input_mut().key_down("ArrowDown");
        let mut rig = RecordingRig::default();
        let command = controller.tick(0.016, Some(&mut rig)).unwrap();
        assert_eq!(command.engine_force, -4000.0);
    }

    #[test]
    fn test_zero_force_written_when_idle() {
        let mut controller = controller(1.0);
        let mut rig = RecordingRig::default();
        controller.tick(0.016, Some(&mut rig));
        assert!(rig.calls.contains(&RigCall::EngineForce(0.0, 2)));
        assert!(rig.calls.contains(&RigCall::EngineForce(0.0, 3)));
    }

    #[test]
    fn test_forward_wins_over_backward() {
        let mut controller = controller(1.0);
        controller.input_mut().key_down("w");
        controller.input_mut().key_down("s");
        let mut rig = RecordingRig::default();
        let command = controller.tick(0.016, Some(&mut rig)).unwrap();
        assert_eq!(command.engine_force, 4000.0);
    }

    #[test]
    fn test_not_ready_skips_tick() {
        let mut controller = controller(2.0);
        controller.input_mut().key_down("a");
        assert!(controller.tick::<RecordingRig>(0.1, None).is_none());
        // Steering does not integrate while the rig is missing.
        assert_eq!(controller.steering_value(), 0.0);
        assert!(!controller.is_ready());

        let mut rig = RecordingRig::default();
        controller.tick(0.1, Some(&mut rig));
        assert!(controller.is_ready());
    }

    #[test]
    fn test_reset_applies_spawn_state() {
        let mut controller = controller(2.0);
        controller.input_mut().key_down("d");
        let mut rig = RecordingRig::default();
        controller.tick(0.1, Some(&mut rig));
        assert!(controller.steering_value() < 0.0);

        let mut rig = RecordingRig::default();
        assert!(controller.observe_reset(1, Some(&mut rig)));

        let spawn = CarConfig::default().spawn_position();
        assert_eq!(
            rig.calls,
            vec![
                RigCall::Position(spawn),
                RigCall::Rotation(Quat::IDENTITY),
                RigCall::Velocity(Vec3::ZERO),
                RigCall::AngularVelocity(Vec3::ZERO),
                RigCall::Steering(0.0, 0),
                RigCall::Steering(0.0, 1),
            ]
        );
        assert_eq!(controller.steering_value(), 0.0);
    }

    #[test]
    fn test_same_trigger_resets_once() {
        let mut controller = controller(1.0);
        let mut rig = RecordingRig::default();
        assert!(controller.observe_reset(3, Some(&mut rig)));
        let after_first = rig.body_mutations();
        assert!(!controller.observe_reset(3, Some(&mut rig)));
        assert_eq!(rig.body_mutations(), after_first);
    }

    #[test]
    fn test_trigger_sequence_fires_on_transitions() {
        let mut controller = controller(1.0);
        let mut rig = RecordingRig::default();
        let fired: Vec<bool> = [0, 0, 1, 1, 2]
            .into_iter()
            .map(|trigger| controller.observe_reset(trigger, Some(&mut rig)))
            .collect();
        assert_eq!(fired, vec![false, false, true, false, true]);
        assert_eq!(controller.last_reset(), 2);
    }

    #[test]
    fn test_stale_trigger_is_ignored() {
        let mut controller = controller(1.0);
        let mut rig = RecordingRig::default();
        assert!(controller.observe_reset(5, Some(&mut rig)));
        assert!(!controller.observe_reset(4, Some(&mut rig)));
    }

    #[test]
    fn test_reset_waits_for_rig() {
        let mut controller = controller(1.0);
        assert!(!controller.observe_reset::<RecordingRig>(1, None));
        assert_eq!(controller.last_reset(), 0);

        let mut rig = RecordingRig::default();
        assert!(controller.observe_reset(1, Some(&mut rig)));
        assert_eq!(rig.body_mutations(), 4);
    }

    #[test]
    fn test_malformed_raw_triggers() {
        assert_eq!(reset_trigger_from_raw(3.0), Some(3));
        assert_eq!(reset_trigger_from_raw(0.0), Some(0));
        assert_eq!(reset_trigger_from_raw(-1.0), None);
        assert_eq!(reset_trigger_from_raw(1.5), None);
        assert_eq!(reset_trigger_from_raw(f64::NAN), None);
        assert_eq!(reset_trigger_from_raw(f64::INFINITY), None);

        // A malformed value never reaches the controller as a new trigger.
        let mut controller = controller(1.0);
        let mut rig = RecordingRig::default();
        let trigger = reset_trigger_from_raw(-4.0).unwrap_or(controller.last_reset());
        assert!(!controller.observe_reset(trigger, Some(&mut rig)));
        assert!(rig.calls.is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = CarConfig::default();
        config.driving.max_steering_value = 0.0;
        assert!(VehicleController::new(&config).is_err());
    }

    proptest! {
        #[test]
        fn prop_reset_count_matches_distinct_increases(
            triggers in proptest::collection::vec(0u64..6, 0..32),
        ) {
            let mut controller = controller(1.0);
            let mut rig = RecordingRig::default();
            let mut expected = 0;
            let mut highest = 0;
            for trigger in triggers {
                if trigger > highest {
                    highest = trigger;
                    expected += 1;
                }
                controller.observe_reset(trigger, Some(&mut rig));
            }
            prop_assert_eq!(rig.body_mutations(), expected * 4);
        }

        #[test]
        fn prop_front_wheels_always_match(
            keys in proptest::collection::vec((any::<bool>(), any::<bool>(), 0.0f32..0.1), 1..32),
        ) {
            let mut controller = controller(1.5);
            for (left, right, dt) in keys {
                let input = controller.input_mut();
                if left { input.key_down("a") } else { input.key_up("a") };
                if right { input.key_down("d") } else { input.key_up("d") };

                let mut rig = RecordingRig::default();
                controller.tick(dt, Some(&mut rig));
                let angles: Vec<(f32, usize)> = rig
                    .calls
                    .iter()
                    .filter_map(|call| match call {
                        RigCall::Steering(angle, wheel) => Some((*angle, *wheel)),
                        _ => None,
                    })
                    .collect();
                prop_assert_eq!(angles.len(), 2);
                prop_assert_eq!(angles[0].0, angles[1].0);
                prop_assert_eq!((angles[0].1, angles[1].1), (0, 1));
            }
        }
    }
}
