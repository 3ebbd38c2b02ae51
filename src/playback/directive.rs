use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::ContextLabel;

/// What the front end should do with the asset attached to a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "previousToken", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackDirective {
    ReplaceCurrent,
    /// Queue behind the asset identified by this token.
    EnqueueAfter(String),
    Stop,
}

impl fmt::Display for PlaybackDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackDirective::ReplaceCurrent => f.write_str("REPLACE_CURRENT"),
            PlaybackDirective::EnqueueAfter(token) => write!(f, "ENQUEUE_AFTER({token})"),
            PlaybackDirective::Stop => f.write_str("STOP"),
        }
    }
}

/// One sequencer step: which asset to play next and the token to hand back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub mood: ContextLabel,
    pub track_index: u32,
    pub asset_key: String,
    pub token: String,
    pub directive: PlaybackDirective,
    /// True when the channel reported a different mood than the previous token.
    pub context_switched: bool,
}

/// Non-fatal problems surfaced to the front end alongside a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum PlaybackNotice {
    /// Context read failed or timed out; the decision used no fresh context.
    ChannelUnavailable(String),
    /// No playable URL for the chosen asset this cycle.
    ResolutionFailed(String),
}
