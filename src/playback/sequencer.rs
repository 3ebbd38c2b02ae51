use crate::models::{ContextLabel, ContextRecord, PlaybackToken, TokenDecode};

use super::catalog::MoodCatalog;
use super::directive::{Decision, PlaybackDirective};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Picks the next track at every boundary event.
///
/// Holds no session state of its own: the position in the playlist travels
/// in the token handed back by the front end, and the current mood comes from
/// a fresh read of the context channel.
#[derive(Debug, Clone)]
pub struct Sequencer {
    catalog: MoodCatalog,
}

impl Sequencer {
    pub fn new(catalog: MoodCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &MoodCatalog {
        &self.catalog
    }

    /// Decide the next asset.
    ///
    /// A missing or undecodable `previous_token` starts a fresh stream; a
    /// valid one continues it, switching playlists when the channel reports a
    /// different recognized mood.
    pub fn next(
        &self,
        previous_token: Option<&str>,
        fresh_context: Option<&ContextRecord>,
        now_millis: i64,
    ) -> Decision {
        let live_mood = fresh_context.and_then(ContextRecord::label);

        let Some(raw) = previous_token else {
            return self.cold_start(live_mood, now_millis);
        };

        match PlaybackToken::decode(raw) {
            TokenDecode::Resume(token) => {
                self.continue_stream(token, raw.to_string(), live_mood, now_millis)
            }
            TokenDecode::ColdStart => {
                log_warn!("unreadable playback token '{raw}', starting a new stream");
                self.cold_start(live_mood, now_millis)
            }
        }
    }

    fn cold_start(&self, live_mood: Option<ContextLabel>, now_millis: i64) -> Decision {
        let mood = live_mood.unwrap_or(self.catalog.fallback);
        log_info!("starting {} stream", mood);
        self.decide(mood, 0, now_millis, PlaybackDirective::ReplaceCurrent, false)
    }

    fn continue_stream(
        &self,
        token: PlaybackToken,
        previous: String,
        live_mood: Option<ContextLabel>,
        now_millis: i64,
    ) -> Decision {
        let (mood, index, switched) = match live_mood {
            Some(live) if live != token.mood => {
                log_info!("context switch detected: {} -> {}", token.mood, live);
                (live, 0, true)
            }
            _ => (token.mood, token.track_index.saturating_add(1), false),
        };

        let limit = self.catalog.track_limit(mood);
        let index = if index >= limit {
            log_info!(
                "end of {} playlist (index {} >= {}), looping to 0",
                mood,
                index,
                limit
            );
            0
        } else {
            index
        };

        self.decide(
            mood,
            index,
            now_millis,
            PlaybackDirective::EnqueueAfter(previous),
            switched,
        )
    }

    fn decide(
        &self,
        mood: ContextLabel,
        track_index: u32,
        now_millis: i64,
        directive: PlaybackDirective,
        context_switched: bool,
    ) -> Decision {
        let asset_key = asset_key(&self.catalog.base_name(mood), track_index);
        let token = PlaybackToken::new(mood, track_index, now_millis).encode();
        log_debug!("next asset {asset_key} token {token} ({directive})");

        Decision {
            mood,
            track_index,
            asset_key,
            token,
            directive,
            context_switched,
        }
    }
}

pub fn asset_key(base_name: &str, track_index: u32) -> String {
    format!("{base_name}_{track_index:03}")
}
