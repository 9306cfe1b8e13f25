//! Recorder error types

use thiserror::Error;

/// Errors raised by the recording device and the session guard
///
/// Payloads are plain strings so the error stays `Clone` and can be
/// carried inside a published `RecordingSession`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    /// A call was made out of order (configure after prepare, start before
    /// prepare, release while recording, ...)
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    /// The microphone is held by another recording
    #[error("Microphone is already in use")]
    MicInUse,

    #[error("Device error: {0}")]
    Device(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl RecorderError {
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    /// Ordering violations are bugs in the caller and are never retried
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, Self::IllegalState(_) | Self::IllegalArgument(_))
    }
}

impl From<std::io::Error> for RecorderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

pub type RecorderResult<T> = Result<T, RecorderError>;
