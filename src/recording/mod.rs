//! Recording session management
//!
//! This module provides the `AudioRecorder` abstraction that manages:
//! - Starting, pausing, resuming and stopping a recorder
//! - Duration accumulation and amplitude polling while recording
//! - Publishing the current session to observers

mod repository;
mod service;
mod session;

pub use repository::RecordingRepository;
pub use service::{AudioRecorder, ServiceAudioRecorder, UpdateIntervals};
pub use session::RecordingSession;
