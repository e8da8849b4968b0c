//! Rate-limited steering with self-centering.

use crate::{config::DrivingConfig, error::Result};

/// Self-centering runs this many times faster than steering input.
const RETURN_SPEED_FACTOR: f32 = 2.0;

/// Integrates the front-wheel steering angle one tick at a time.
///
/// The value is always within `[-max, max]`. Holding left increases it,
/// holding right decreases it, and with neither held it returns to zero at
/// twice the steering rate without crossing zero.
#[derive(Clone, Debug)]
pub struct SteeringIntegrator {
    value: f32,
    max: f32,
    speed: f32,
}

impl SteeringIntegrator {
    /// Create an integrator from validated driving parameters.
    pub fn new(driving: &DrivingConfig) -> Result<Self> {
        driving.validate()?;
        Ok(Self {
            value: 0.0,
            max: driving.max_steering_value,
            speed: driving.steering_speed,
        })
    }

    /// Advance by `dt` seconds and return the new value.
    ///
    /// When both directions are held, left wins: it is checked first.
    pub fn step(&mut self, left: bool, right: bool, dt: f32) -> f32 {
        // Negative or NaN frame times would move the value backwards.
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.value = if left {
            (self.value + self.speed * dt).min(self.max)
        } else if right {
            (self.value - self.speed * dt).max(-self.max)
        } else {
            let return_step = self.speed * RETURN_SPEED_FACTOR * dt;
            if self.value > 0.0 {
                (self.value - return_step).max(0.0)
            } else if self.value < 0.0 {
                (self.value + return_step).min(0.0)
            } else {
                0.0
            }
        };
        self.value
    }

    /// Current steering angle in radians.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Steering limit in radians.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Snap back to straight ahead.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Set the value directly, clamped to the limit.
    pub fn set(&mut self, value: f32) {
        if value.is_finite() {
            self.value = value.clamp(-self.max, self.max);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn integrator(speed: f32, max: f32) -> SteeringIntegrator {
        SteeringIntegrator::new(&DrivingConfig {
            engine_force: 4000.0,
            max_steering_value: max,
            steering_speed: speed,
        })
        .unwrap()
    }

    #[test]
    fn test_left_accumulates_and_clamps() {
        let mut steering = integrator(2.0, 0.5);
        assert!((steering.step(true, false, 0.1) - 0.2).abs() < 1e-6);
        assert!((steering.step(true, false, 0.1) - 0.4).abs() < 1e-6);
        assert_eq!(steering.step(true, false, 0.1), 0.5);
        assert_eq!(steering.step(true, false, 1.0), 0.5);
    }

    #[test]
    fn test_right_accumulates_and_clamps() {
        let mut steering = integrator(1.0, 0.5);
        assert!((steering.step(false, true, 0.25) + 0.25).abs() < 1e-6);
        assert_eq!(steering.step(false, true, 10.0), -0.5);
    }

    #[test]
    fn test_returns_to_center_at_double_speed() {
        let mut steering = integrator(1.0, 0.5);
        steering.set(0.5);
        assert!((steering.step(false, false, 0.1) - 0.3).abs() < 1e-6);
        // A large step lands exactly on zero instead of overshooting.
        assert_eq!(steering.step(false, false, 1.0), 0.0);

        steering.set(-0.5);
        assert!((steering.step(false, false, 0.1) + 0.3).abs() < 1e-6);
        assert_eq!(steering.step(false, false, 1.0), 0.0);
    }

    #[test]
    fn test_left_wins_when_both_held() {
        let mut steering = integrator(2.0, 0.5);
        assert!((steering.step(true, true, 0.1) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut steering = integrator(2.0, 0.5);
        steering.set(0.3);
        assert_eq!(steering.step(true, false, -1.0), 0.3);
        assert_eq!(steering.step(true, false, f32::NAN), 0.3);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = DrivingConfig {
            max_steering_value: -0.5,
            ..Default::default()
        };
        assert!(SteeringIntegrator::new(&config).is_err());
        let config = DrivingConfig {
            steering_speed: 0.0,
            ..Default::default()
        };
        assert!(SteeringIntegrator::new(&config).is_err());
    }

    proptest! {
        #[test]
        fn prop_left_is_min_of_sum_and_max(
            start in -0.5f32..=0.5,
            dt in 0.0f32..2.0,
            speed in 0.1f32..10.0,
        ) {
            let mut steering = integrator(speed, 0.5);
            steering.set(start);
            let value = steering.step(true, false, dt);
            prop_assert_eq!(value, (start + speed * dt).min(0.5));
            prop_assert!(value <= 0.5);
        }

        #[test]
        fn prop_right_is_max_of_difference_and_min(
            start in -0.5f32..=0.5,
            dt in 0.0f32..2.0,
            speed in 0.1f32..10.0,
        ) {
            let mut steering = integrator(speed, 0.5);
            steering.set(start);
            let value = steering.step(false, true, dt);
            prop_assert_eq!(value, (start - speed * dt).max(-0.5));
            prop_assert!(value >= -0.5);
        }

        #[test]
        fn prop_centering_converges_without_sign_change(
            start in -0.5f32..=0.5,
            dt in 0.001f32..0.1,
        ) {
            let mut steering = integrator(1.0, 0.5);
            steering.set(start);
            let sign = start.signum();
            // 0.5 rad at 2 rad/s needs at most 0.25 s.
            for _ in 0..((0.25 / dt).ceil() as usize + 1) {
                let value = steering.step(false, false, dt);
                prop_assert!(value == 0.0 || value.signum() == sign);
            }
            prop_assert_eq!(steering.value(), 0.0);
        }

        #[test]
        fn prop_value_stays_bounded(
            inputs in proptest::collection::vec((any::<bool>(), any::<bool>(), 0.0f32..1.0), 1..64),
        ) {
            let mut steering = integrator(3.0, 0.4);
            for (left, right, dt) in inputs {
                let value = steering.step(left, right, dt);
                prop_assert!(value.abs() <= 0.4);
            }
        }
    }
}
