use crate::models::{ContextLabel, RawLabel, Sample};

use super::config::ClassifierConfig;
use super::vote::majority_label;
use super::window::RollingWindow;

/// Turns noisy per-sample readings into a stable activity label.
///
/// Workouts are reported the moment a single sample crosses the workout
/// thresholds. Every other label needs window evidence: resting/active follow
/// a majority vote over the last few raw labels, and sleep needs a full
/// window of low heart rate and stillness.
#[derive(Debug, Clone)]
pub struct ContextClassifier {
    config: ClassifierConfig,
    raw_history: RollingWindow<RawLabel>,
    sleep_heart_rates: RollingWindow<f32>,
    sleep_intensities: RollingWindow<f32>,
}

impl ContextClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let mut classifier = Self {
            raw_history: RollingWindow::new(config.history_len),
            sleep_heart_rates: RollingWindow::new(config.sleep_window_len),
            sleep_intensities: RollingWindow::new(config.sleep_window_len),
            config,
        };
        classifier.seed_history();
        classifier
    }

    /// Back to the initial resting state with an empty sleep window.
    pub fn reset(&mut self) {
        self.sleep_heart_rates.clear();
        self.sleep_intensities.clear();
        self.seed_history();
    }

    // Cold start votes over a full resting history, not an empty one.
    fn seed_history(&mut self) {
        self.raw_history.clear();
        for _ in 0..self.config.history_len {
            self.raw_history.push(RawLabel::Resting);
        }
    }

    pub fn ingest(&mut self, sample: &Sample) -> ContextLabel {
        let intensity = sample.movement_intensity();
        let heart_rate = sample.heart_rate;

        self.sleep_heart_rates.push(heart_rate);
        self.sleep_intensities.push(intensity);
        debug_assert_eq!(self.sleep_heart_rates.len(), self.sleep_intensities.len());

        let raw = self.classify_raw(intensity, heart_rate);
        if raw == RawLabel::Workout {
            self.raw_history.clear();
            return ContextLabel::Workout;
        }

        self.raw_history.push(raw);

        if self.is_sleeping() {
            return ContextLabel::Sleeping;
        }

        majority_label(self.raw_history.iter())
            .map(|label| label.as_context())
            .unwrap_or(ContextLabel::Resting)
    }

    pub fn classify_raw(&self, intensity: f32, heart_rate: f32) -> RawLabel {
        let cfg = &self.config;
        if intensity > cfg.workout_intensity || heart_rate > cfg.workout_heart_rate {
            RawLabel::Workout
        } else if intensity > cfg.active_intensity || heart_rate > cfg.active_heart_rate {
            RawLabel::Active
        } else {
            RawLabel::Resting
        }
    }

    fn is_sleeping(&self) -> bool {
        if !self.sleep_heart_rates.is_full() || self.sleep_heart_rates.is_empty() {
            return false;
        }

        let sleep_hr = self.config.sleep_heart_rate;
        let still = self.config.still_intensity;
        let low_hr_fraction = self.sleep_heart_rates.fraction(|hr| *hr < sleep_hr);
        let still_fraction = self.sleep_intensities.fraction(|i| *i < still);

        low_hr_fraction >= self.config.sleep_low_hr_fraction
            && still_fraction >= self.config.sleep_still_fraction
    }

    pub fn history_len(&self) -> usize {
        self.raw_history.len()
    }

    pub fn raw_history(&self) -> Vec<RawLabel> {
        self.raw_history.iter().copied().collect()
    }

    pub fn sleep_window_len(&self) -> usize {
        self.sleep_heart_rates.len()
    }
}

impl Default for ContextClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}
