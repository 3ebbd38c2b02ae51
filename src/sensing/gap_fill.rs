use crate::models::Sample;

pub const DEFAULT_HEART_RATE: f32 = 70.0;

/// Replaces missing heart-rate readings with the last positive one.
///
/// Wearables report `0` on ticks without a reading; the classifier would
/// otherwise take that as a very low pulse.
#[derive(Debug, Clone)]
pub struct HeartRateGapFill {
    last_valid: f32,
}

impl HeartRateGapFill {
    pub fn new(seed: f32) -> Self {
        Self { last_valid: seed }
    }

    pub fn last_valid(&self) -> f32 {
        self.last_valid
    }

    pub fn apply(&mut self, sample: Sample) -> Sample {
        if sample.heart_rate > 0.0 {
            self.last_valid = sample.heart_rate;
            sample
        } else {
            sample.with_heart_rate(self.last_valid)
        }
    }
}

impl Default for HeartRateGapFill {
    fn default() -> Self {
        Self::new(DEFAULT_HEART_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_seed_until_first_reading() {
        let mut fill = HeartRateGapFill::default();
        assert_eq!(fill.apply(Sample::at_rest(0.0)).heart_rate, 70.0);
    }

    #[test]
    fn carries_last_positive_reading_forward() {
        let mut fill = HeartRateGapFill::default();
        assert_eq!(fill.apply(Sample::at_rest(58.0)).heart_rate, 58.0);
        assert_eq!(fill.apply(Sample::at_rest(0.0)).heart_rate, 58.0);
        assert_eq!(fill.apply(Sample::at_rest(-1.0)).heart_rate, 58.0);
        assert_eq!(fill.apply(Sample::at_rest(61.0)).heart_rate, 61.0);
        assert_eq!(fill.last_valid(), 61.0);
    }
}
