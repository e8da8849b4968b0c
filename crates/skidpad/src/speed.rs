//! Speedometer.

use glam::Vec3;

/// Meters per second to kilometers per hour.
pub const MS_TO_KMH: f32 = 3.6;

/// Latest chassis velocity, reported as a speed.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpeedSampler {
    velocity: Vec3,
}

impl SpeedSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the velocity observed after a physics step. Non-finite vectors
    /// are dropped and the previous sample is kept.
    pub fn record(&mut self, velocity: Vec3) {
        if velocity.is_finite() {
            self.velocity = velocity;
        }
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Speed in km/h. Never negative.
    pub fn speed_kmh(&self) -> f32 {
        self.velocity.length() * MS_TO_KMH
    }

    /// Speed rounded to whole km/h for display.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn display_kmh(&self) -> u32 {
        self.speed_kmh().round() as u32
    }
}
