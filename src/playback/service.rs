use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::channel::ContextStore;
use crate::models::ContextRecord;

use super::directive::{Decision, PlaybackDirective, PlaybackNotice};
use super::resolver::AssetResolver;
use super::sequencer::Sequencer;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Requests arriving from the playback front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// User asked for context music.
    Start,
    /// The current asset is about to end; `token` is the one we issued for it.
    NearlyFinished { token: String },
    /// Pause, stop or cancel.
    Stop,
    /// The player could not play the asset identified by `token`.
    Failed { token: Option<String>, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackResponse {
    pub directive: Option<PlaybackDirective>,
    pub asset_key: Option<String>,
    pub url: Option<String>,
    pub token: Option<String>,
    pub notices: Vec<PlaybackNotice>,
    pub speech: Option<String>,
}

impl PlaybackResponse {
    fn empty() -> Self {
        Self::default()
    }

    fn stop() -> Self {
        Self {
            directive: Some(PlaybackDirective::Stop),
            speech: Some("Paused.".to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlaybackTimeouts {
    pub channel: Duration,
    pub resolve: Duration,
}

impl Default for PlaybackTimeouts {
    fn default() -> Self {
        Self {
            channel: Duration::from_millis(2000),
            resolve: Duration::from_millis(2000),
        }
    }
}

/// Playback-side actor: reads the context channel once per boundary event,
/// asks the sequencer for the next asset and resolves it to a URL.
///
/// Every event yields a response. Channel and resolver failures degrade the
/// response (fallback mood, missing URL) but never abort it.
#[derive(Clone)]
pub struct PlaybackService {
    store: Arc<dyn ContextStore>,
    resolver: Arc<dyn AssetResolver>,
    sequencer: Sequencer,
    user_id: String,
    timeouts: PlaybackTimeouts,
}

impl PlaybackService {
    pub fn new(
        store: Arc<dyn ContextStore>,
        resolver: Arc<dyn AssetResolver>,
        sequencer: Sequencer,
        user_id: impl Into<String>,
        timeouts: PlaybackTimeouts,
    ) -> Self {
        Self {
            store,
            resolver,
            sequencer,
            user_id: user_id.into(),
            timeouts,
        }
    }

    pub async fn handle(&self, event: PlaybackEvent) -> PlaybackResponse {
        match event {
            PlaybackEvent::Start => self.start().await,
            PlaybackEvent::NearlyFinished { token } => self.next_track(Some(&token)).await,
            PlaybackEvent::Stop => PlaybackResponse::stop(),
            PlaybackEvent::Failed { token, reason } => {
                log_error!(
                    "playback failed for token {}: {reason}",
                    token.as_deref().unwrap_or("<none>")
                );
                PlaybackResponse::empty()
            }
        }
    }

    async fn start(&self) -> PlaybackResponse {
        let (fresh, notice) = self.read_context().await;
        // Any reported movement counts as found; unknown ones play the fallback mood.
        let speech = match fresh.as_ref() {
            Some(record) if !record.movement.trim().is_empty() => {
                let label = record.label().unwrap_or(self.sequencer.catalog().fallback);
                format!("Playing {} flow.", label.as_str().to_ascii_lowercase())
            }
            _ => "Context not found. Playing default flow.".to_string(),
        };

        let decision = self.sequencer.next(None, fresh.as_ref(), now_millis());
        let mut response = self.finish(decision, notice).await;
        response.speech = Some(speech);
        response
    }

    /// One boundary step: fresh channel read, sequencer decision, URL.
    pub async fn next_track(&self, previous_token: Option<&str>) -> PlaybackResponse {
        let (fresh, notice) = self.read_context().await;
        let decision = self.sequencer.next(previous_token, fresh.as_ref(), now_millis());
        self.finish(decision, notice).await
    }

    async fn read_context(&self) -> (Option<ContextRecord>, Option<PlaybackNotice>) {
        match tokio::time::timeout(self.timeouts.channel, self.store.get(&self.user_id)).await {
            Ok(Ok(record)) => {
                if record.is_none() {
                    log_info!("no context record for {}", self.user_id);
                }
                (record, None)
            }
            Ok(Err(err)) => {
                log_warn!("context read from {} failed: {err:#}", self.store.name());
                (None, Some(PlaybackNotice::ChannelUnavailable(err.to_string())))
            }
            Err(_) => {
                log_warn!(
                    "context read from {} timed out after {:?}",
                    self.store.name(),
                    self.timeouts.channel
                );
                (
                    None,
                    Some(PlaybackNotice::ChannelUnavailable("timed out".to_string())),
                )
            }
        }
    }

    async fn finish(&self, decision: Decision, channel_notice: Option<PlaybackNotice>) -> PlaybackResponse {
        let mut notices: Vec<PlaybackNotice> = channel_notice.into_iter().collect();

        let url = match tokio::time::timeout(
            self.timeouts.resolve,
            self.resolver.resolve(&decision.asset_key),
        )
        .await
        {
            Ok(Ok(url)) => Some(url),
            Ok(Err(err)) => {
                log_warn!("could not resolve {}: {err:#}", decision.asset_key);
                notices.push(PlaybackNotice::ResolutionFailed(err.to_string()));
                None
            }
            Err(_) => {
                log_warn!(
                    "resolving {} timed out after {:?}",
                    decision.asset_key,
                    self.timeouts.resolve
                );
                notices.push(PlaybackNotice::ResolutionFailed("timed out".to_string()));
                None
            }
        };

        PlaybackResponse {
            directive: Some(decision.directive),
            asset_key: Some(decision.asset_key),
            url,
            token: Some(decision.token),
            notices,
            speech: None,
        }
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
