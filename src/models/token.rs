//! Opaque playback token handed to the front end and returned on the next
//! boundary event.
//!
//! Wire form: `{MOOD}_{index}_{issued_at_millis}`, e.g. `RESTING_1_1760000000000`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::ContextLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackToken {
    pub mood: ContextLabel,
    pub track_index: u32,
    /// Epoch milliseconds.
    pub issued_at: i64,
}

/// Outcome of reading a token back from the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDecode {
    Resume(PlaybackToken),
    ColdStart,
}

impl PlaybackToken {
    pub fn new(mood: ContextLabel, track_index: u32, issued_at: i64) -> Self {
        Self {
            mood,
            track_index,
            issued_at,
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Never fails: anything that is not a well-formed token decodes as
    /// [`TokenDecode::ColdStart`].
    pub fn decode(raw: &str) -> TokenDecode {
        Self::parse(raw)
            .map(TokenDecode::Resume)
            .unwrap_or(TokenDecode::ColdStart)
    }

    fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().split('_');
        let mood = ContextLabel::parse_loose(parts.next()?)?;
        let track_index = parts.next()?.parse::<u32>().ok()?;
        let issued_at = parts.next()?.parse::<i64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(mood, track_index, issued_at))
    }
}

impl fmt::Display for PlaybackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.mood, self.track_index, self.issued_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_mood_index_and_timestamp() {
        let token = PlaybackToken::new(ContextLabel::Resting, 1, 1_760_000_000_000);
        assert_eq!(token.encode(), "RESTING_1_1760000000000");
    }

    #[test]
    fn decodes_well_formed_token() {
        let decoded = PlaybackToken::decode("WORKOUT_4_1760000000123");
        assert_eq!(
            decoded,
            TokenDecode::Resume(PlaybackToken::new(ContextLabel::Workout, 4, 1_760_000_000_123))
        );
    }

    #[test]
    fn garbled_tokens_fall_back_to_cold_start() {
        for raw in [
            "",
            "RESTING",
            "RESTING_x_1",
            "RESTING_-1_1",
            "DANCING_1_1",
            "RESTING_1_1_extra",
            "RESTING_1_",
        ] {
            assert_eq!(PlaybackToken::decode(raw), TokenDecode::ColdStart, "{raw}");
        }
    }
}
