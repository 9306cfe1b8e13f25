//! HTTP API for controlling the recorder
//!
//! - POST /recordings/start - Start a new recording
//! - POST /recordings/pause - Pause the current recording
//! - POST /recordings/resume - Resume a paused recording
//! - POST /recordings/stop - Stop and keep the recording
//! - POST /recordings/clean-up - Discard the recording
//! - GET /recordings/current - Query the current session
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{ErrorResponse, StartRecordingRequest};
pub use routes::create_router;
pub use state::AppState;
