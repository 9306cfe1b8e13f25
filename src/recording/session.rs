use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::path::PathBuf;

use crate::error::RecorderError;

/// Observable state of the current recording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingSession {
    /// Caller-chosen identifier (e.g. the question being answered)
    pub id: String,

    /// Recorded file, set once the recording has been stopped
    pub file: Option<PathBuf>,

    /// Recorded time in milliseconds, excluding pauses
    pub duration_ms: u64,

    /// Last polled microphone amplitude
    pub amplitude: i32,

    pub paused: bool,

    /// Why the recorder could not be started, if it could not
    #[serde(serialize_with = "serialize_failure")]
    pub failed_to_start: Option<RecorderError>,

    pub started_at: DateTime<Utc>,
}

impl RecordingSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file: None,
            duration_ms: 0,
            amplitude: 0,
            paused: false,
            failed_to_start: None,
            started_at: Utc::now(),
        }
    }

    /// Recording (or paused) and not yet finished
    pub fn is_live(&self) -> bool {
        self.file.is_none() && self.failed_to_start.is_none()
    }
}

fn serialize_failure<S: Serializer>(
    failure: &Option<RecorderError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match failure {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}
