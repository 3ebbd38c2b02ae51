use serde::{Deserialize, Serialize};

/// Thresholds and window sizes for the context classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifierConfig {
    /// Raw labels kept for the majority vote
    pub history_len: usize,
    /// Samples required before sleep can be declared
    pub sleep_window_len: usize,

    /// Strictly above either of these is a workout
    pub workout_intensity: f32,
    pub workout_heart_rate: f32,

    /// Strictly above either of these is active
    pub active_intensity: f32,
    pub active_heart_rate: f32,

    /// Per-sample sleep evidence (strictly below)
    pub sleep_heart_rate: f32,
    pub still_intensity: f32,

    /// Minimum window fractions for sleep (inclusive)
    pub sleep_low_hr_fraction: f64,
    pub sleep_still_fraction: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            history_len: 6,
            sleep_window_len: 30,
            workout_intensity: 3.5,
            workout_heart_rate: 115.0,
            active_intensity: 1.5,
            active_heart_rate: 85.0,
            sleep_heart_rate: 65.0,
            still_intensity: 0.5,
            sleep_low_hr_fraction: 0.65,
            sleep_still_fraction: 0.80,
        }
    }
}
