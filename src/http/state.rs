use crate::recorder::Output;
use crate::recording::AudioRecorder;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The one recorder this process drives
    pub recorder: Arc<dyn AudioRecorder>,

    /// Output used when a start request does not name one
    pub default_output: Output,
}

impl AppState {
    pub fn new(recorder: Arc<dyn AudioRecorder>, default_output: Output) -> Self {
        Self {
            recorder,
            default_output,
        }
    }
}
