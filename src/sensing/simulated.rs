//! Scripted stand-in for the wearable, for demos and tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::sample::GRAVITY;
use crate::models::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityPhase {
    Resting,
    Active,
    Workout,
    Sleeping,
}

impl ActivityPhase {
    /// (heart-rate centre, heart-rate spread, intensity centre, intensity spread)
    fn profile(&self) -> (f32, f32, f32, f32) {
        match self {
            ActivityPhase::Resting => (70.0, 4.0, 0.2, 0.15),
            ActivityPhase::Active => (95.0, 5.0, 2.0, 0.3),
            ActivityPhase::Workout => (140.0, 8.0, 5.0, 1.0),
            ActivityPhase::Sleeping => (55.0, 3.0, 0.1, 0.08),
        }
    }
}

pub struct SimulatedSensor {
    rng: StdRng,
    script: Vec<(ActivityPhase, usize)>,
    phase_idx: usize,
    emitted_in_phase: usize,
    dropout_rate: f64,
    repeat: bool,
}

impl SimulatedSensor {
    pub fn new(seed: u64, script: Vec<(ActivityPhase, usize)>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            script,
            phase_idx: 0,
            emitted_in_phase: 0,
            dropout_rate: 0.0,
            repeat: false,
        }
    }

    /// Probability that a tick reports no heart rate (`0`).
    pub fn with_dropouts(mut self, rate: f64) -> Self {
        self.dropout_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Start the script over instead of ending.
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn next_sample(&mut self) -> Option<Sample> {
        loop {
            let (phase, len) = match self.script.get(self.phase_idx) {
                Some(step) => *step,
                None if self.repeat && !self.script.is_empty() => {
                    self.phase_idx = 0;
                    self.emitted_in_phase = 0;
                    continue;
                }
                None => return None,
            };

            if self.emitted_in_phase >= len {
                self.phase_idx += 1;
                self.emitted_in_phase = 0;
                continue;
            }

            self.emitted_in_phase += 1;
            return Some(self.draw(phase));
        }
    }

    fn draw(&mut self, phase: ActivityPhase) -> Sample {
        let (hr, hr_spread, intensity, intensity_spread) = phase.profile();
        let heart_rate = if self.rng.gen_bool(self.dropout_rate) {
            0.0
        } else {
            hr + self.rng.gen_range(-hr_spread..=hr_spread)
        };

        let intensity = (intensity + self.rng.gen_range(-intensity_spread..=intensity_spread)).max(0.0);
        let direction = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        Sample::new(0.0, 0.0, GRAVITY + direction * intensity, heart_rate)
    }
}

/// Push simulated samples into a latest-value feed at a fixed cadence.
pub async fn run_feed(
    mut sensor: SimulatedSensor,
    feed: watch::Sender<Option<Sample>>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sensor.next_sample() {
                    Some(sample) => {
                        if feed.send(Some(sample)).is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = cancel_token.cancelled() => break,
        }
    }
}
