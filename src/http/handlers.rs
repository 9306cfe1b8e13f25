use super::state::AppState;
use crate::error::RecorderError;
use crate::recorder::Output;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StartRecordingRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// Optional output kind (defaults to the configured one)
    pub output: Option<Output>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recordings/start
/// Start a new recording session
pub async fn start_recording(
    State(state): State<AppState>,
    Json(req): Json<StartRecordingRequest>,
) -> Response {
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("recording-{}", uuid::Uuid::new_v4()));
    let output = req.output.unwrap_or(state.default_output);

    info!("Starting recording for session: {}", session_id);

    match state.recorder.start(session_id.clone(), output).await {
        Ok(true) => {}
        Ok(false) => {
            let current = state.recorder.current_session().borrow().clone();
            let id = current.map(|s| s.id).unwrap_or_default();
            return error_response(StatusCode::CONFLICT, format!("Session {} is already recording", id));
        }
        Err(e) => {
            error!("Failed to start recording: {:#}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to start recording: {:#}", e),
            );
        }
    }

    let session = state.recorder.current_session().borrow().clone();

    match session {
        Some(session) => match &session.failed_to_start {
            None => (StatusCode::OK, Json(session)).into_response(),
            Some(RecorderError::MicInUse) => {
                warn!("Microphone in use, session {} not started", session_id);
                error_response(StatusCode::CONFLICT, RecorderError::MicInUse.to_string())
            }
            Some(e) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to start recording: {}", e),
            ),
        },
        None => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Session {} was not created", session_id),
        ),
    }
}

/// POST /recordings/pause
pub async fn pause_recording(State(state): State<AppState>) -> Response {
    match state.recorder.pause().await {
        Ok(()) => current_session_response(&state),
        Err(e) => error_response(StatusCode::CONFLICT, format!("{:#}", e)),
    }
}

/// POST /recordings/resume
pub async fn resume_recording(State(state): State<AppState>) -> Response {
    match state.recorder.resume().await {
        Ok(()) => current_session_response(&state),
        Err(e) => error_response(StatusCode::CONFLICT, format!("{:#}", e)),
    }
}

/// POST /recordings/stop
/// Stop recording and keep the file
pub async fn stop_recording(State(state): State<AppState>) -> Response {
    match state.recorder.stop().await {
        Ok(Some(session)) if session.file.is_some() => {
            info!("Recording stopped successfully for session: {}", session.id);
            (StatusCode::OK, Json(session)).into_response()
        }
        Ok(_) => error_response(StatusCode::NOT_FOUND, "No recording to stop"),
        Err(e) => {
            error!("Failed to stop recording: {:#}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to stop recording: {:#}", e),
            )
        }
    }
}

/// POST /recordings/clean-up
/// Discard the current session and its file
pub async fn clean_up_recording(State(state): State<AppState>) -> Response {
    match state.recorder.clean_up().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to clean up: {:#}", e),
        ),
    }
}

/// GET /recordings/current
pub async fn get_current_session(State(state): State<AppState>) -> Response {
    current_session_response(&state)
}

fn current_session_response(state: &AppState) -> Response {
    let session = state.recorder.current_session().borrow().clone();

    match session {
        Some(session) => (StatusCode::OK, Json(session)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No current session"),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
