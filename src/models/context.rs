//! Activity labels and the record shared between sensing and playback.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// Single-sample classification with no memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawLabel {
    Workout,
    Active,
    Resting,
}

impl RawLabel {
    pub fn as_context(&self) -> ContextLabel {
        match self {
            RawLabel::Workout => ContextLabel::Workout,
            RawLabel::Active => ContextLabel::Active,
            RawLabel::Resting => ContextLabel::Resting,
        }
    }
}

/// Smoothed, publishable activity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextLabel {
    Sleeping,
    Workout,
    Active,
    Resting,
}

impl ContextLabel {
    pub const ALL: [ContextLabel; 4] = [
        ContextLabel::Sleeping,
        ContextLabel::Workout,
        ContextLabel::Active,
        ContextLabel::Resting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextLabel::Sleeping => "SLEEPING",
            ContextLabel::Workout => "WORKOUT",
            ContextLabel::Active => "ACTIVE",
            ContextLabel::Resting => "RESTING",
        }
    }

    /// Lenient parse for untrusted channel text: case-insensitive, trimmed,
    /// `None` for anything unrecognized.
    pub fn parse_loose(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for ContextLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_loose(s).ok_or_else(|| anyhow!("unknown context label '{s}'"))
    }
}

/// Payload of the context channel. One live record per user identity; every
/// write replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRecord {
    pub user_id: String,
    /// Label text as written by the sensing side. Readers must not trust it.
    pub movement: String,
    pub heart_rate: i64,
    /// Epoch seconds.
    pub timestamp: i64,
}

impl ContextRecord {
    pub fn new(user_id: impl Into<String>, label: ContextLabel, heart_rate: i64, timestamp: i64) -> Self {
        Self {
            user_id: user_id.into(),
            movement: label.as_str().to_string(),
            heart_rate,
            timestamp,
        }
    }

    pub fn label(&self) -> Option<ContextLabel> {
        ContextLabel::parse_loose(&self.movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ContextLabel::parse_loose("workout"), Some(ContextLabel::Workout));
        assert_eq!(ContextLabel::parse_loose(" Sleeping "), Some(ContextLabel::Sleeping));
        assert_eq!(ContextLabel::parse_loose("DANCING"), None);
        assert_eq!(ContextLabel::parse_loose(""), None);
    }

    #[test]
    fn from_str_rejects_unknown_labels() {
        assert!("HIGH".parse::<ContextLabel>().is_err());
        assert_eq!("resting".parse::<ContextLabel>().unwrap(), ContextLabel::Resting);
    }

    #[test]
    fn record_label_ignores_garbage() {
        let mut record = ContextRecord::new("u", ContextLabel::Active, 80, 1);
        assert_eq!(record.label(), Some(ContextLabel::Active));
        record.movement = "SEDENTARY".into();
        assert_eq!(record.label(), None);
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let record = ContextRecord::new("MY_ALEXA_USER", ContextLabel::Resting, 62, 1_700_000_000);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["userId"], "MY_ALEXA_USER");
        assert_eq!(json["movement"], "RESTING");
        assert_eq!(json["heartRate"], 62);
    }
}
