use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::ContextLabel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub base_name: String,
    pub track_count: u32,
}

impl MoodEntry {
    pub fn new(base_name: impl Into<String>, track_count: u32) -> Self {
        Self {
            base_name: base_name.into(),
            track_count,
        }
    }
}

/// Static mood -> playlist mapping, fixed at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodCatalog {
    pub fallback: ContextLabel,
    pub moods: BTreeMap<ContextLabel, MoodEntry>,
}

impl Default for MoodCatalog {
    fn default() -> Self {
        let moods = BTreeMap::from([
            (ContextLabel::Sleeping, MoodEntry::new("sleeping", 11)),
            (ContextLabel::Workout, MoodEntry::new("workout", 2)),
            (ContextLabel::Active, MoodEntry::new("active_2", 5)),
            (ContextLabel::Resting, MoodEntry::new("resting", 3)),
        ]);
        Self {
            fallback: ContextLabel::Active,
            moods,
        }
    }
}

impl MoodCatalog {
    pub fn empty(fallback: ContextLabel) -> Self {
        Self {
            fallback,
            moods: BTreeMap::new(),
        }
    }

    pub fn with_mood(mut self, label: ContextLabel, base_name: &str, track_count: u32) -> Self {
        self.moods.insert(label, MoodEntry::new(base_name, track_count));
        self
    }

    /// Playlist base name; lower-case label name when the mood is not configured.
    pub fn base_name(&self, label: ContextLabel) -> String {
        self.moods
            .get(&label)
            .map(|entry| entry.base_name.clone())
            .unwrap_or_else(|| label.as_str().to_ascii_lowercase())
    }

    /// Number of tracks to cycle through, at least 1.
    pub fn track_limit(&self, label: ContextLabel) -> u32 {
        self.moods
            .get(&label)
            .map(|entry| entry.track_count)
            .filter(|count| *count > 0)
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployed_playlists() {
        let catalog = MoodCatalog::default();
        assert_eq!(catalog.fallback, ContextLabel::Active);
        assert_eq!(catalog.base_name(ContextLabel::Active), "active_2");
        assert_eq!(catalog.track_limit(ContextLabel::Sleeping), 11);
        assert_eq!(catalog.track_limit(ContextLabel::Resting), 3);
        assert_eq!(catalog.track_limit(ContextLabel::Workout), 2);
    }

    #[test]
    fn missing_mood_loops_a_single_track() {
        let catalog = MoodCatalog::empty(ContextLabel::Resting);
        assert_eq!(catalog.track_limit(ContextLabel::Workout), 1);
        assert_eq!(catalog.base_name(ContextLabel::Workout), "workout");
    }

    #[test]
    fn zero_track_count_is_treated_as_one() {
        let catalog = MoodCatalog::empty(ContextLabel::Resting).with_mood(ContextLabel::Resting, "r", 0);
        assert_eq!(catalog.track_limit(ContextLabel::Resting), 1);
    }

    #[test]
    fn round_trips_through_settings_json() {
        let json = serde_json::to_string(&MoodCatalog::default()).unwrap();
        assert!(json.contains("\"SLEEPING\""));
        let parsed: MoodCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MoodCatalog::default());
    }
}
