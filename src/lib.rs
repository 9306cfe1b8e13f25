pub mod config;
pub mod error;
pub mod http;
pub mod recorder;
pub mod recording;

pub use config::Config;
pub use error::{RecorderError, RecorderResult};
pub use http::{create_router, AppState};
pub use recorder::{
    append_amr, MediaRecorderRecorder, MediaRecorderWrapper, Microphone, Output, Phase, Recorder,
    SimulatedMediaRecorder,
};
pub use recording::{AudioRecorder, RecordingSession, ServiceAudioRecorder, UpdateIntervals};
