use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::channel::ContextStore;
use crate::models::Sample;

use super::loop_worker::{sensing_loop, SensingConfig, SensingPipeline, SensingUpdate};

/// Owns the background sensing task: one per process.
pub struct SensingController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SensingController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the sensing loop. Returns a receiver that observes every
    /// published classification.
    pub fn start_sensing(
        &mut self,
        pipeline: SensingPipeline,
        feed: watch::Receiver<Option<Sample>>,
        store: Arc<dyn ContextStore>,
        config: SensingConfig,
    ) -> Result<watch::Receiver<Option<SensingUpdate>>> {
        if self.handle.is_some() {
            bail!("sensing already active");
        }

        let cancel_token = CancellationToken::new();
        let (updates_tx, updates_rx) = watch::channel(None);

        let handle = tokio::spawn(sensing_loop(
            pipeline,
            feed,
            store,
            config,
            updates_tx,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(updates_rx)
    }

    pub async fn stop_sensing(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("sensing loop task failed to join")?;
            info!("sensing stopped");
        }
        Ok(())
    }
}

impl Default for SensingController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::InMemoryContextStore;
    use crate::classifier::ContextClassifier;
    use crate::sensing::gap_fill::HeartRateGapFill;
    use tokio::time::Duration;

    fn config() -> SensingConfig {
        SensingConfig {
            user_id: "u".into(),
            interval: Duration::from_millis(10),
            write_timeout: Duration::from_millis(500),
        }
    }

    fn pipeline() -> SensingPipeline {
        SensingPipeline::new("u", ContextClassifier::default(), HeartRateGapFill::default())
    }

    #[tokio::test]
    async fn refuses_to_start_twice() {
        let store = Arc::new(InMemoryContextStore::new());
        let (_feed_tx, feed_rx) = watch::channel(None);
        let mut controller = SensingController::new();

        controller
            .start_sensing(pipeline(), feed_rx.clone(), store.clone(), config())
            .unwrap();
        assert!(controller.is_running());
        assert!(controller
            .start_sensing(pipeline(), feed_rx, store, config())
            .is_err());

        controller.stop_sensing().await.unwrap();
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        let mut controller = SensingController::new();
        assert!(controller.stop_sensing().await.is_ok());
    }
}
