use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::channel::ContextStore;
use crate::classifier::ContextClassifier;
use crate::models::{ContextLabel, ContextRecord, Sample};

use super::gap_fill::HeartRateGapFill;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Debug, Clone)]
pub struct SensingConfig {
    pub user_id: String,
    pub interval: Duration,
    pub write_timeout: Duration,
}

/// What the loop last published, for local observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensingUpdate {
    pub label: ContextLabel,
    pub heart_rate: f32,
    pub magnitude: f32,
    pub timestamp: DateTime<Utc>,
}

/// Gap fill, classify and package one sample. No I/O.
pub struct SensingPipeline {
    user_id: String,
    classifier: ContextClassifier,
    gap_fill: HeartRateGapFill,
}

impl SensingPipeline {
    pub fn new(user_id: impl Into<String>, classifier: ContextClassifier, gap_fill: HeartRateGapFill) -> Self {
        Self {
            user_id: user_id.into(),
            classifier,
            gap_fill,
        }
    }

    pub fn process(&mut self, sample: Sample, now: DateTime<Utc>) -> (ContextRecord, SensingUpdate) {
        let sample = self.gap_fill.apply(sample);
        let label = self.classifier.ingest(&sample);

        let record = ContextRecord::new(
            self.user_id.clone(),
            label,
            sample.heart_rate as i64,
            now.timestamp(),
        );
        let update = SensingUpdate {
            label,
            heart_rate: sample.heart_rate,
            magnitude: sample.magnitude(),
            timestamp: now,
        };
        (record, update)
    }
}

/// Samples the latest sensor reading on a fixed cadence and publishes the
/// classified context. Runs until `cancel_token` fires.
pub async fn sensing_loop(
    mut pipeline: SensingPipeline,
    feed: watch::Receiver<Option<Sample>>,
    store: Arc<dyn ContextStore>,
    config: SensingConfig,
    updates: watch::Sender<Option<SensingUpdate>>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log_info!(
        "sensing loop started for {} (every {:?}, store {})",
        config.user_id,
        config.interval,
        store.name()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let latest = *feed.borrow();
                let Some(sample) = latest else {
                    log_debug!("no sensor sample yet, skipping tick");
                    continue;
                };

                let (record, update) = pipeline.process(sample, Utc::now());
                log_debug!(
                    "classified {} (hr={}, |a|={:.2})",
                    update.label,
                    update.heart_rate,
                    update.magnitude
                );

                let put = store.put(&config.user_id, record);
                match tokio::time::timeout(config.write_timeout, put).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => log_error!("context write failed for {}: {err:#}", config.user_id),
                    Err(_) => log_warn!("context write timeout (> {:?}) for {}", config.write_timeout, config.user_id),
                }

                updates.send_replace(Some(update));
            }
            _ = cancel_token.cancelled() => {
                log_info!("sensing loop shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::InMemoryContextStore;

    #[test]
    fn pipeline_gap_fills_before_classifying() {
        let mut pipeline = SensingPipeline::new(
            "u",
            ContextClassifier::default(),
            HeartRateGapFill::new(130.0),
        );
        let now = Utc::now();
        let (record, update) = pipeline.process(Sample::at_rest(0.0), now);
        assert_eq!(update.label, ContextLabel::Workout);
        assert_eq!(record.movement, "WORKOUT");
        assert_eq!(record.heart_rate, 130);
        assert_eq!(record.timestamp, now.timestamp());
        assert_eq!(record.user_id, "u");
    }

    #[test]
    fn heart_rate_is_truncated_in_the_record() {
        let mut pipeline =
            SensingPipeline::new("u", ContextClassifier::default(), HeartRateGapFill::default());
        let (record, _) = pipeline.process(Sample::at_rest(72.9), Utc::now());
        assert_eq!(record.heart_rate, 72);
    }

    #[tokio::test]
    async fn loop_publishes_latest_sample_until_cancelled() {
        let store = Arc::new(InMemoryContextStore::new());
        let (feed_tx, feed_rx) = watch::channel(None);
        let (updates_tx, mut updates_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(sensing_loop(
            SensingPipeline::new("u", ContextClassifier::default(), HeartRateGapFill::default()),
            feed_rx,
            store.clone(),
            SensingConfig {
                user_id: "u".into(),
                interval: Duration::from_millis(10),
                write_timeout: Duration::from_millis(500),
            },
            updates_tx,
            cancel.clone(),
        ));

        feed_tx.send(Some(Sample::at_rest(150.0))).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                updates_rx.changed().await.unwrap();
                if updates_rx.borrow().as_ref().map(|u| u.label) == Some(ContextLabel::Workout) {
                    break;
                }
            }
        })
        .await
        .unwrap();

        let record = store.get("u").await.unwrap().unwrap();
        assert_eq!(record.label(), Some(ContextLabel::Workout));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
