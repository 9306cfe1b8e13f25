use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/recordings/start", post(handlers::start_recording))
        .route("/recordings/pause", post(handlers::pause_recording))
        .route("/recordings/resume", post(handlers::resume_recording))
        .route("/recordings/stop", post(handlers::stop_recording))
        .route("/recordings/clean-up", post(handlers::clean_up_recording))
        // Session queries
        .route("/recordings/current", get(handlers::get_current_session))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
