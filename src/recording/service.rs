use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use super::repository::RecordingRepository;
use super::session::RecordingSession;
use crate::recorder::{Output, Recorder};

/// How often the running session is refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateIntervals {
    /// Duration is advanced by this much per tick
    pub duration_tick: Duration,
    pub amplitude_poll: Duration,
}

impl Default for UpdateIntervals {
    fn default() -> Self {
        Self {
            duration_tick: Duration::from_millis(1000),
            amplitude_poll: Duration::from_millis(100),
        }
    }
}

/// Audio recording as seen by the rest of the application
///
/// At most one session exists at a time. Observers follow it through
/// [`current_session`](AudioRecorder::current_session); a session that could
/// not start is still published, with `failed_to_start` set, until
/// [`clean_up`](AudioRecorder::clean_up).
#[async_trait::async_trait]
pub trait AudioRecorder: Send + Sync {
    /// Begin recording. Returns `false` without touching the live session
    /// when one is already recording.
    async fn start(&self, session_id: String, output: Output) -> Result<bool>;

    async fn pause(&self) -> Result<()>;

    async fn resume(&self) -> Result<()>;

    /// Finish recording and return the finished session. A session whose
    /// recorder fails to stop is discarded.
    async fn stop(&self) -> Result<Option<RecordingSession>>;

    /// Abandon any recording, delete its file and forget the session
    async fn clean_up(&self) -> Result<()>;

    fn current_session(&self) -> watch::Receiver<Option<RecordingSession>>;

    fn is_recording(&self) -> bool;
}

/// [`AudioRecorder`] that drives a [`Recorder`] from a background update task
pub struct ServiceAudioRecorder {
    recorder: Arc<Mutex<Box<dyn Recorder>>>,
    repository: RecordingRepository,
    intervals: UpdateIntervals,
    updates: Mutex<Option<JoinHandle<()>>>,
}

impl ServiceAudioRecorder {
    pub fn new(recorder: Box<dyn Recorder>, intervals: UpdateIntervals) -> Self {
        Self {
            recorder: Arc::new(Mutex::new(recorder)),
            repository: RecordingRepository::new(),
            intervals,
            updates: Mutex::new(None),
        }
    }

    fn spawn_updates(&self) -> JoinHandle<()> {
        let recorder = Arc::clone(&self.recorder);
        let repository = self.repository.clone();
        let UpdateIntervals {
            duration_tick,
            amplitude_poll,
        } = self.intervals;

        let start = Instant::now();
        let mut duration_timer = time::interval_at(start + duration_tick, duration_tick);
        let mut amplitude_timer = time::interval_at(start + amplitude_poll, amplitude_poll);

        tokio::spawn(async move {
            debug!("Session update task started");

            loop {
                tokio::select! {
                    _ = duration_timer.tick() => {
                        repository.add_duration(duration_tick);
                    }
                    _ = amplitude_timer.tick() => {
                        let amplitude = recorder.lock().await.amplitude();
                        repository.set_amplitude(amplitude);
                    }
                }
            }
        })
    }

    async fn stop_updates(&self) {
        let mut handle = self.updates.lock().await;
        if let Some(task) = handle.take() {
            task.abort();
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!("Session update task panicked: {}", e);
                }
            }
            debug!("Session update task stopped");
        }
    }
}

#[async_trait::async_trait]
impl AudioRecorder for ServiceAudioRecorder {
    async fn start(&self, session_id: String, output: Output) -> Result<bool> {
        // Held until the session is published so overlapping starts queue up
        let mut recorder = self.recorder.lock().await;

        if recorder.is_recording() {
            warn!("Recording already started, ignoring start for {}", session_id);
            return Ok(false);
        }

        info!("Starting recording session: {} ({:?})", session_id, output);

        match recorder.start(output) {
            Ok(()) => {
                self.repository.start(session_id);

                let mut handle = self.updates.lock().await;
                if let Some(stale) = handle.replace(self.spawn_updates()) {
                    stale.abort();
                }

                info!("Recording session started successfully");
            }
            Err(e) => {
                error!("Failed to start recording session {}: {}", session_id, e);
                if !recorder.is_recording() {
                    recorder.cancel();
                }
                self.repository.fail_to_start(session_id, e);
            }
        }

        Ok(true)
    }

    async fn pause(&self) -> Result<()> {
        self.recorder
            .lock()
            .await
            .pause()
            .context("Failed to pause recording")?;
        self.repository.set_paused(true);

        info!("Recording paused");
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.recorder
            .lock()
            .await
            .resume()
            .context("Failed to resume recording")?;
        self.repository.set_paused(false);

        info!("Recording resumed");
        Ok(())
    }

    async fn stop(&self) -> Result<Option<RecordingSession>> {
        let mut recorder = self.recorder.lock().await;

        if !recorder.is_recording() {
            warn!("Recording not active");
            return Ok(self.repository.current());
        }

        self.stop_updates().await;

        match recorder.stop() {
            Ok(file) => {
                info!("Recording ready: {}", file.display());
                self.repository.recording_ready(file);

                Ok(self.repository.current())
            }
            Err(e) => {
                // The recorder has already discarded the file
                error!("Failed to stop recorder, discarding session: {}", e);
                self.repository.clear();

                Err(e).context("Failed to stop recorder")
            }
        }
    }

    async fn clean_up(&self) -> Result<()> {
        let mut recorder = self.recorder.lock().await;

        self.stop_updates().await;
        recorder.cancel();
        self.repository.clear();

        info!("Recording session cleaned up");
        Ok(())
    }

    fn current_session(&self) -> watch::Receiver<Option<RecordingSession>> {
        self.repository.subscribe()
    }

    fn is_recording(&self) -> bool {
        self.repository
            .current()
            .map(|session| session.is_live())
            .unwrap_or(false)
    }
}

impl Drop for ServiceAudioRecorder {
    fn drop(&mut self) {
        if let Some(task) = self.updates.get_mut().take() {
            task.abort();
        }
    }
}
