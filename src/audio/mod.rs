use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use anyhow::{anyhow, Context, Result};
use log::{error, warn};
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::oneshot;

use crate::playback::resolver::path_from_file_url;
use crate::playback::{PlaybackDirective, PlaybackResponse};

enum AudioCommand {
    Replace(PathBuf),
    Enqueue(PathBuf),
    Stop,
    QueueLen(oneshot::Sender<usize>),
}

/// Local output for playback responses. rodio's output stream is not `Send`,
/// so a dedicated thread owns it and this handle only sends commands.
#[derive(Clone)]
pub struct AudioEngineHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl AudioEngineHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|_| anyhow!("audio handle lock poisoned"))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<()> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .context("failed to create audio output stream")?;
                        let new_sink =
                            Sink::try_new(&handle).context("failed to create audio sink")?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                fn append(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                    path: &Path,
                ) -> Result<()> {
                    ensure_sink(stream, sink)?;
                    let file = File::open(path)
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    let source = Decoder::new(BufReader::new(file))
                        .with_context(|| format!("failed to decode {}", path.display()))?;
                    if let Some(ref s) = sink {
                        s.append(source);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Replace(path) => {
                            if let Some(s_old) = sink.take() {
                                s_old.stop();
                            }
                            _stream = None;
                            if let Err(err) = append(&mut _stream, &mut sink, &path) {
                                error!("audio replace failed: {err:#}");
                            }
                        }
                        AudioCommand::Enqueue(path) => {
                            if let Err(err) = append(&mut _stream, &mut sink, &path) {
                                error!("audio enqueue failed: {err:#}");
                            }
                        }
                        AudioCommand::Stop => {
                            if let Some(s_old) = sink.take() {
                                s_old.stop();
                            }
                            _stream = None;
                        }
                        AudioCommand::QueueLen(reply) => {
                            let len = sink.as_ref().map(|s| s.len()).unwrap_or(0);
                            let _ = reply.send(len);
                        }
                    }
                }
            })
            .context("failed to spawn audio thread")?;

        *guard = Some(tx.clone());
        Ok(tx)
    }

    fn send(&self, command: AudioCommand) -> Result<()> {
        self.ensure_thread()?
            .send(command)
            .map_err(|_| anyhow!("audio thread is gone"))
    }

    /// Carry out the directive on a playback response. Responses without a
    /// local file URL are skipped with a warning.
    pub fn apply(&self, response: &PlaybackResponse) -> Result<()> {
        let replace = match response.directive.as_ref() {
            None => return Ok(()),
            Some(PlaybackDirective::Stop) => return self.stop(),
            Some(PlaybackDirective::ReplaceCurrent) => true,
            Some(PlaybackDirective::EnqueueAfter(_)) => false,
        };

        let Some(path) = response.url.as_deref().and_then(path_from_file_url) else {
            warn!(
                "no local file for {}, leaving the queue as is",
                response.asset_key.as_deref().unwrap_or("<none>")
            );
            return Ok(());
        };

        if replace {
            self.send(AudioCommand::Replace(path))
        } else {
            self.send(AudioCommand::Enqueue(path))
        }
    }

    pub fn stop(&self) -> Result<()> {
        let existing = self
            .tx
            .lock()
            .map_err(|_| anyhow!("audio handle lock poisoned"))?
            .clone();
        if let Some(tx) = existing {
            let _ = tx.send(AudioCommand::Stop);
        }
        Ok(())
    }

    /// Sources in the sink, including the one playing.
    pub async fn queued(&self) -> Result<usize> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(AudioCommand::QueueLen(reply_tx))?;
        reply_rx
            .await
            .map_err(|_| anyhow!("audio thread dropped queue length request"))
    }
}

impl Default for AudioEngineHandle {
    fn default() -> Self {
        Self::new()
    }
}
