use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::audio::AudioEngineHandle;
use crate::classifier::ContextClassifier;
use crate::playback::{
    AssetResolver, BaseUrlResolver, LocalMediaResolver, PlaybackEvent, PlaybackResponse,
    PlaybackService, Sequencer,
};
use crate::sensing::simulated::run_feed;
use crate::sensing::{
    ActivityPhase, HeartRateGapFill, SensingConfig, SensingController, SensingPipeline,
    SensingUpdate, SimulatedSensor,
};
use crate::AppState;

const AUDIO_POLL_MS: u64 = 500;
const BOUNDARY_RETRY_SECS: u64 = 10;

#[derive(Parser, Debug)]
#[command(name = "moodstream", version, about = "Context-adaptive music from wearable sensors")]
pub struct Cli {
    /// Settings JSON file (defaults are used when absent)
    #[arg(long, global = true, env = "MOODSTREAM_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// SQLite file backing the context channel; in-process when omitted
    #[arg(long, global = true, env = "MOODSTREAM_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a simulated wearable and publish context until Ctrl-C
    Sense(SensorArgs),
    /// Run sensing and sequencing side by side, printing each playback response
    Simulate {
        #[command(flatten)]
        sensor: SensorArgs,
        #[command(flatten)]
        media: MediaArgs,
        /// Boundary events to run before exiting
        #[arg(long, default_value_t = 8)]
        boundaries: u32,
        /// Pretend track length between boundary events
        #[arg(long, default_value_t = 2000)]
        track_ms: u64,
    },
    /// Play context music on the local audio device until Ctrl-C
    Play {
        #[command(flatten)]
        media: MediaArgs,
        /// Also run a simulated wearable in this process
        #[arg(long)]
        with_sensor: bool,
        #[command(flatten)]
        sensor: SensorArgs,
    },
    /// Print the current context record
    Status,
}

#[derive(Args, Debug, Clone)]
pub struct SensorArgs {
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Sampling period; the settings file value is used when omitted
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// Fraction of ticks without a heart-rate reading
    #[arg(long, default_value_t = 0.05)]
    pub dropout_rate: f64,
}

#[derive(Args, Debug, Clone)]
pub struct MediaArgs {
    /// Local media root containing `stream_assets/`
    #[arg(long, conflicts_with = "media_base_url")]
    pub media_dir: Option<PathBuf>,
    /// Remote media prefix for time-limited URLs
    #[arg(long)]
    pub media_base_url: Option<String>,
    #[arg(long, default_value_t = 3600)]
    pub url_ttl_secs: u64,
}

impl MediaArgs {
    fn resolver(&self) -> Arc<dyn AssetResolver> {
        match (&self.media_dir, &self.media_base_url) {
            (_, Some(base)) => Arc::new(BaseUrlResolver::new(
                base.clone(),
                Duration::from_secs(self.url_ttl_secs),
            )),
            (Some(dir), None) => Arc::new(LocalMediaResolver::new(dir.clone())),
            (None, None) => Arc::new(LocalMediaResolver::new("media")),
        }
    }
}

/// The demo wearable's day: a bit of everything, looping.
pub fn default_script() -> Vec<(ActivityPhase, usize)> {
    vec![
        (ActivityPhase::Resting, 40),
        (ActivityPhase::Active, 30),
        (ActivityPhase::Workout, 20),
        (ActivityPhase::Resting, 20),
        (ActivityPhase::Sleeping, 60),
    ]
}

struct SensingSession {
    controller: SensingController,
    updates: watch::Receiver<Option<SensingUpdate>>,
    feed_cancel: CancellationToken,
    feed_task: JoinHandle<()>,
}

impl SensingSession {
    fn start(state: &AppState, args: &SensorArgs) -> Result<Self> {
        let settings = &state.settings;
        let interval = args
            .tick_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| settings.sample_interval());

        let (feed_tx, feed_rx) = watch::channel(None);
        let feed_cancel = CancellationToken::new();
        let sensor = SimulatedSensor::new(args.seed, default_script())
            .with_dropouts(args.dropout_rate)
            .repeating();
        let feed_task = tokio::spawn(run_feed(sensor, feed_tx, interval, feed_cancel.clone()));

        let pipeline = SensingPipeline::new(
            settings.user_id.clone(),
            ContextClassifier::new(settings.classifier.clone()),
            HeartRateGapFill::new(settings.default_heart_rate),
        );
        let config = SensingConfig {
            user_id: settings.user_id.clone(),
            interval,
            write_timeout: settings.channel_timeout(),
        };

        let mut controller = SensingController::new();
        let updates = controller.start_sensing(pipeline, feed_rx, state.store.clone(), config)?;

        Ok(Self {
            controller,
            updates,
            feed_cancel,
            feed_task,
        })
    }

    async fn shutdown(mut self) -> Result<()> {
        self.controller.stop_sensing().await?;
        self.feed_cancel.cancel();
        self.feed_task
            .await
            .context("sensor feed task failed to join")
    }
}

fn playback_service(state: &AppState, media: &MediaArgs) -> PlaybackService {
    PlaybackService::new(
        state.store.clone(),
        media.resolver(),
        Sequencer::new(state.settings.catalog.clone()),
        state.settings.user_id.clone(),
        state.settings.playback_timeouts(),
    )
}

fn print_response(response: &PlaybackResponse) -> Result<()> {
    println!("{}", serde_json::to_string(response)?);
    Ok(())
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    let state = AppState::load(cli.settings, cli.db)?;

    match cli.command {
        Command::Sense(sensor) => sense(&state, &sensor).await,
        Command::Simulate {
            sensor,
            media,
            boundaries,
            track_ms,
        } => simulate(&state, &sensor, &media, boundaries, Duration::from_millis(track_ms)).await,
        Command::Play {
            media,
            with_sensor,
            sensor,
        } => play(&state, &media, with_sensor.then_some(&sensor)).await,
        Command::Status => status(&state).await,
    }
}

async fn sense(state: &AppState, sensor: &SensorArgs) -> Result<()> {
    let mut session = SensingSession::start(state, sensor)?;
    let mut last_label = None;

    loop {
        tokio::select! {
            changed = session.updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(update) = session.updates.borrow_and_update().clone() else {
                    continue;
                };
                if last_label != Some(update.label) {
                    info!("context is now {} (hr={:.0})", update.label, update.heart_rate);
                    last_label = Some(update.label);
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    session.shutdown().await
}

async fn simulate(
    state: &AppState,
    sensor: &SensorArgs,
    media: &MediaArgs,
    boundaries: u32,
    track_len: Duration,
) -> Result<()> {
    let session = SensingSession::start(state, sensor)?;
    let service = playback_service(state, media);

    let mut response = service.handle(PlaybackEvent::Start).await;
    print_response(&response)?;

    for _ in 1..boundaries {
        let Some(token) = response.token.clone() else {
            break;
        };
        tokio::time::sleep(track_len).await;
        response = service.handle(PlaybackEvent::NearlyFinished { token }).await;
        print_response(&response)?;
    }

    session.shutdown().await
}

/// Decides when the `play` loop should raise a boundary event.
///
/// A boundary is due once at most the current track is left in the sink. A
/// response that did not grow the queue (no URL, or the audio thread could
/// not append it) holds further boundaries back for `retry_after`.
#[derive(Debug)]
struct BoundaryGate {
    retry_after: Duration,
    retry_at: Option<Instant>,
}

impl BoundaryGate {
    fn new(retry_after: Duration) -> Self {
        Self {
            retry_after,
            retry_at: None,
        }
    }

    fn due(&self, queued: usize, now: Instant) -> bool {
        queued <= 1 && self.retry_at.map_or(true, |at| now >= at)
    }

    fn record(&mut self, queued_before: usize, queued_after: usize, now: Instant) {
        if queued_after > queued_before {
            self.retry_at = None;
        } else {
            self.retry_at = Some(now + self.retry_after);
        }
    }

    fn holding(&self) -> bool {
        self.retry_at.is_some()
    }
}

async fn play(state: &AppState, media: &MediaArgs, sensor: Option<&SensorArgs>) -> Result<()> {
    let session = sensor
        .map(|args| SensingSession::start(state, args))
        .transpose()?;
    let service = playback_service(state, media);
    let audio = AudioEngineHandle::new();
    let mut gate = BoundaryGate::new(Duration::from_secs(BOUNDARY_RETRY_SECS));

    let mut response = service.handle(PlaybackEvent::Start).await;
    if let Some(speech) = response.speech.as_deref() {
        info!("{speech}");
    }
    audio.apply(&response)?;
    gate.record(0, audio.queued().await?, Instant::now());

    let mut poll = tokio::time::interval(Duration::from_millis(AUDIO_POLL_MS));
    loop {
        tokio::select! {
            _ = poll.tick() => {
                let queued = audio.queued().await?;
                if !gate.due(queued, Instant::now()) {
                    continue;
                }
                let Some(token) = response.token.clone() else {
                    continue;
                };
                response = service.handle(PlaybackEvent::NearlyFinished { token }).await;
                if !response.notices.is_empty() {
                    warn!("boundary notices: {:?}", response.notices);
                }
                audio.apply(&response)?;
                gate.record(queued, audio.queued().await?, Instant::now());
                if gate.holding() {
                    warn!(
                        "{} did not reach the audio queue, next boundary in {}s",
                        response.asset_key.as_deref().unwrap_or("<none>"),
                        BOUNDARY_RETRY_SECS
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let stop = service.handle(PlaybackEvent::Stop).await;
                audio.apply(&stop)?;
                break;
            }
        }
    }

    if let Some(session) = session {
        session.shutdown().await?;
    }
    Ok(())
}

async fn status(state: &AppState) -> Result<()> {
    match state.store.get(&state.settings.user_id).await? {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("no context record for {}", state.settings.user_id),
    }
    Ok(())
}
