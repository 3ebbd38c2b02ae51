// tests/context_flow_test.rs
// End-to-end checks across classifier, context channel and playback service

use std::sync::Arc;
use std::time::Duration;

use moodstream_lib::channel::{ContextStore, InMemoryContextStore};
use moodstream_lib::classifier::ContextClassifier;
use moodstream_lib::db::Database;
use moodstream_lib::models::{ContextLabel, ContextRecord, PlaybackToken, Sample, TokenDecode};
use moodstream_lib::playback::{
    BaseUrlResolver, MoodCatalog, PlaybackDirective, PlaybackEvent, PlaybackService,
    PlaybackTimeouts, Sequencer,
};
use tempfile::TempDir;

const USER: &str = "MY_ALEXA_USER";
const NOW: i64 = 1_760_000_000_000;

fn moving(intensity: f32, heart_rate: f32) -> Sample {
    Sample::new(0.0, 0.0, 9.8 + intensity, heart_rate)
}

fn service(store: Arc<dyn ContextStore>, catalog: MoodCatalog) -> PlaybackService {
    PlaybackService::new(
        store,
        Arc::new(BaseUrlResolver::new(
            "https://media.example.com",
            Duration::from_secs(600),
        )),
        Sequencer::new(catalog),
        USER,
        PlaybackTimeouts::default(),
    )
}

fn token_of(raw: &str) -> PlaybackToken {
    match PlaybackToken::decode(raw) {
        TokenDecode::Resume(token) => token,
        TokenDecode::ColdStart => panic!("issued token did not decode: {raw}"),
    }
}

#[test]
fn test_workout_spike_clears_history_then_resting_recovers() {
    let mut classifier = ContextClassifier::default();

    for _ in 0..6 {
        assert_eq!(classifier.ingest(&Sample::at_rest(70.0)), ContextLabel::Resting);
    }

    assert_eq!(classifier.ingest(&Sample::at_rest(130.0)), ContextLabel::Workout);
    assert_eq!(classifier.history_len(), 0);

    assert_eq!(classifier.ingest(&Sample::at_rest(70.0)), ContextLabel::Resting);
    assert_eq!(classifier.history_len(), 1);
}

#[test]
fn test_intensity_spike_is_workout_whatever_the_history() {
    let mut classifier = ContextClassifier::default();
    for _ in 0..6 {
        classifier.ingest(&moving(2.0, 90.0));
    }
    assert_eq!(classifier.ingest(&moving(3.6, 60.0)), ContextLabel::Workout);
    assert_eq!(classifier.history_len(), 0);
}

#[test]
fn test_sleep_needs_a_full_window_and_evaporates() {
    let mut classifier = ContextClassifier::default();

    // 20 low heart-rate samples followed by 10 at 70 bpm, all still.
    for i in 0..29 {
        let hr = if i < 20 { 55.0 } else { 70.0 };
        assert_ne!(
            classifier.ingest(&Sample::at_rest(hr)),
            ContextLabel::Sleeping,
            "sleeping reported after only {} samples",
            i + 1
        );
    }
    assert_eq!(classifier.ingest(&Sample::at_rest(70.0)), ContextLabel::Sleeping);

    // The oldest low reading falls out: 19 of 30 is below the bar.
    assert_eq!(classifier.ingest(&Sample::at_rest(70.0)), ContextLabel::Resting);
}

#[tokio::test]
async fn test_playback_follows_context_through_sqlite_channel() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("context.sqlite3")).unwrap();
    let store: Arc<dyn ContextStore> = Arc::new(db);
    let playback = service(store.clone(), MoodCatalog::default());

    let mut classifier = ContextClassifier::default();
    let label = classifier.ingest(&Sample::at_rest(70.0));
    store
        .put(USER, ContextRecord::new(USER, label, 70, 1))
        .await
        .unwrap();

    let start = playback.handle(PlaybackEvent::Start).await;
    assert_eq!(start.directive, Some(PlaybackDirective::ReplaceCurrent));
    assert_eq!(start.asset_key.as_deref(), Some("resting_000"));
    assert_eq!(start.speech.as_deref(), Some("Playing resting flow."));
    assert!(start.notices.is_empty());
    let url = start.url.clone().unwrap();
    assert!(url.starts_with("https://media.example.com/Media/stream_assets/resting_000.mp3?expires="));

    let first_token = start.token.clone().unwrap();
    let next = playback
        .handle(PlaybackEvent::NearlyFinished {
            token: first_token.clone(),
        })
        .await;
    assert_eq!(next.asset_key.as_deref(), Some("resting_001"));
    assert_eq!(
        next.directive,
        Some(PlaybackDirective::EnqueueAfter(first_token))
    );

    let label = classifier.ingest(&Sample::at_rest(130.0));
    assert_eq!(label, ContextLabel::Workout);
    store
        .put(USER, ContextRecord::new(USER, label, 130, 2))
        .await
        .unwrap();

    let switched = playback
        .handle(PlaybackEvent::NearlyFinished {
            token: next.token.clone().unwrap(),
        })
        .await;
    assert_eq!(switched.asset_key.as_deref(), Some("workout_000"));
    assert_eq!(token_of(&switched.token.unwrap()).mood, ContextLabel::Workout);
}

#[tokio::test]
async fn test_resting_stream_wraps_after_last_track() {
    let store: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::new());
    store
        .put(USER, ContextRecord::new(USER, ContextLabel::Resting, 68, 1))
        .await
        .unwrap();
    let playback = service(store, MoodCatalog::default());

    let mut response = playback.handle(PlaybackEvent::Start).await;
    let mut keys = vec![response.asset_key.clone().unwrap()];
    for _ in 0..3 {
        response = playback
            .handle(PlaybackEvent::NearlyFinished {
                token: response.token.clone().unwrap(),
            })
            .await;
        keys.push(response.asset_key.clone().unwrap());
    }

    assert_eq!(
        keys,
        vec!["resting_000", "resting_001", "resting_002", "resting_000"]
    );
}

#[tokio::test]
async fn test_unknown_movement_falls_back_without_failing() {
    let store: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::new());
    store
        .put(
            USER,
            ContextRecord {
                user_id: USER.into(),
                movement: "DANCING".into(),
                heart_rate: 100,
                timestamp: 1,
            },
        )
        .await
        .unwrap();
    let playback = service(store, MoodCatalog::default());

    let start = playback.handle(PlaybackEvent::Start).await;
    assert_eq!(start.asset_key.as_deref(), Some("active_2_000"));
    assert_eq!(start.speech.as_deref(), Some("Playing active flow."));
}

#[tokio::test]
async fn test_garbled_token_restarts_the_stream() {
    let store: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::new());
    store
        .put(USER, ContextRecord::new(USER, ContextLabel::Sleeping, 52, 1))
        .await
        .unwrap();
    let playback = service(store, MoodCatalog::default());

    let response = playback
        .handle(PlaybackEvent::NearlyFinished {
            token: "not-a-token".into(),
        })
        .await;
    assert_eq!(response.directive, Some(PlaybackDirective::ReplaceCurrent));
    assert_eq!(response.asset_key.as_deref(), Some("sleeping_000"));

    let stop = playback.handle(PlaybackEvent::Stop).await;
    assert_eq!(stop.directive, Some(PlaybackDirective::Stop));
    assert!(stop.token.is_none());
}

#[test]
fn test_tokens_carry_position_not_server_state() {
    let sequencer = Sequencer::new(MoodCatalog::default());
    let resting = ContextRecord::new(USER, ContextLabel::Resting, 70, 1);

    let first = sequencer.next(None, Some(&resting), NOW);
    // A second sequencer with the same catalog continues from the token alone.
    let other = Sequencer::new(MoodCatalog::default());
    let second = other.next(Some(&first.token), Some(&resting), NOW + 1);
    assert_eq!(second.track_index, 1);
    assert!(!second.context_switched);
}
