use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::session::RecordingSession;
use crate::error::RecorderError;

/// Holds the current recording session and notifies observers of changes
#[derive(Clone)]
pub struct RecordingRepository {
    tx: Arc<watch::Sender<Option<RecordingSession>>>,
}

impl RecordingRepository {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<RecordingSession>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<RecordingSession> {
        self.tx.borrow().clone()
    }

    pub fn start(&self, id: String) {
        self.tx.send_replace(Some(RecordingSession::new(id)));
    }

    pub fn fail_to_start(&self, id: String, error: RecorderError) {
        let mut session = RecordingSession::new(id);
        session.failed_to_start = Some(error);
        self.tx.send_replace(Some(session));
    }

    /// Adds to the duration unless paused
    pub fn add_duration(&self, elapsed: Duration) {
        self.tx.send_modify(|session| {
            if let Some(session) = session.as_mut().filter(|s| !s.paused) {
                session.duration_ms += elapsed.as_millis() as u64;
            }
        });
    }

    pub fn set_amplitude(&self, amplitude: i32) {
        self.tx.send_modify(|session| {
            if let Some(session) = session {
                session.amplitude = amplitude;
            }
        });
    }

    pub fn set_paused(&self, paused: bool) {
        self.tx.send_modify(|session| {
            if let Some(session) = session {
                session.paused = paused;
            }
        });
    }

    pub fn recording_ready(&self, file: PathBuf) {
        self.tx.send_modify(|session| {
            if let Some(session) = session {
                session.file = Some(file);
                session.paused = false;
                session.amplitude = 0;
            }
        });
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for RecordingRepository {
    fn default() -> Self {
        Self::new()
    }
}
