//! Timer API Endpoints
//!
//! REST endpoints for timer control, state and visibility re-sync.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::timer_engine::TimerSnapshot;
use crate::services::timer_service::{TimerService, VisibilityOutcome};

/// Body of a visibility change notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

/// Create timer API routes
pub fn create_timer_routes() -> Router<TimerService> {
    Router::new()
        .route("/", get(get_timer))
        .route("/start", post(start_timer))
        .route("/pause", post(pause_timer))
        .route("/reset", post(reset_timer))
        .route("/skip", post(skip_timer))
        .route("/visibility", post(visibility_changed))
}

/// Get current timer state
pub async fn get_timer(State(timer_service): State<TimerService>) -> AppResult<Json<TimerSnapshot>> {
    Ok(Json(timer_service.snapshot()?))
}

/// Start or resume the timer; a no-op when already running
pub async fn start_timer(State(timer_service): State<TimerService>) -> AppResult<Json<TimerSnapshot>> {
    Ok(Json(timer_service.start()?))
}

/// Pause the timer; a no-op when already paused
pub async fn pause_timer(State(timer_service): State<TimerService>) -> AppResult<Json<TimerSnapshot>> {
    Ok(Json(timer_service.pause()?))
}

/// Rewind the current phase
pub async fn reset_timer(State(timer_service): State<TimerService>) -> AppResult<Json<TimerSnapshot>> {
    Ok(Json(timer_service.reset()?))
}

/// Skip to the next phase
pub async fn skip_timer(State(timer_service): State<TimerService>) -> AppResult<Json<TimerSnapshot>> {
    Ok(Json(timer_service.skip()?))
}

/// Client visibility changed; re-sync the countdown when it becomes visible
pub async fn visibility_changed(
    State(timer_service): State<TimerService>,
    WithRejection(Json(request), _): WithRejection<Json<VisibilityRequest>, AppError>,
) -> AppResult<Json<VisibilityOutcome>> {
    Ok(Json(timer_service.visibility_changed(request.visible)?))
}
