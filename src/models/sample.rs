//! Raw wearable sensor sample.
//!
//! One accelerometer triple plus the heart rate reported on the same tick.

use serde::{Deserialize, Serialize};

/// Standard gravity used to remove the stationary component from the
/// accelerometer magnitude.
pub const GRAVITY: f32 = 9.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub accel_x: f32,
    pub accel_y: f32,
    pub accel_z: f32,
    /// Beats per minute. `0` means the sensor had no reading this tick.
    pub heart_rate: f32,
}

impl Sample {
    pub fn new(accel_x: f32, accel_y: f32, accel_z: f32, heart_rate: f32) -> Self {
        Self {
            accel_x,
            accel_y,
            accel_z,
            heart_rate,
        }
    }

    /// A device lying still with gravity on the z axis.
    pub fn at_rest(heart_rate: f32) -> Self {
        Self::new(0.0, 0.0, GRAVITY, heart_rate)
    }

    pub fn magnitude(&self) -> f32 {
        (self.accel_x * self.accel_x + self.accel_y * self.accel_y + self.accel_z * self.accel_z)
            .sqrt()
    }

    /// Deviation of the acceleration magnitude from gravity-only acceleration.
    pub fn movement_intensity(&self) -> f32 {
        (self.magnitude() - GRAVITY).abs()
    }

    pub fn with_heart_rate(self, heart_rate: f32) -> Self {
        Self { heart_rate, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resting_sample_has_near_zero_intensity() {
        let sample = Sample::at_rest(70.0);
        assert!(sample.movement_intensity() < 1e-5);
    }

    #[test]
    fn intensity_is_symmetric_around_gravity() {
        let low = Sample::new(0.0, 0.0, GRAVITY - 2.0, 70.0);
        let high = Sample::new(0.0, 0.0, GRAVITY + 2.0, 70.0);
        assert!((low.movement_intensity() - 2.0).abs() < 1e-4);
        assert!((high.movement_intensity() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn free_fall_reads_as_full_gravity_deviation() {
        let sample = Sample::new(0.0, 0.0, 0.0, 0.0);
        assert!((sample.movement_intensity() - GRAVITY).abs() < 1e-6);
    }
}
