//! Settings API endpoints
//!
//! Read and update timer settings, and report which settings controls the UI
//! must render as disabled while the timer runs.

use std::collections::BTreeMap;

use axum::{extract::State, response::Json, routing::get, Router};
use axum_extra::extract::WithRejection;
use strum::IntoEnumIterator;

use crate::error::{AppError, AppResult};
use crate::models::timer_settings::{SettingsField, SettingsUpdate, TimerSettings};
use crate::services::timer_service::{SettingsOutcome, TimerService};

/// Create settings API routes
pub fn create_settings_routes() -> Router<TimerService> {
    Router::new()
        .route("/", get(get_settings).put(update_settings))
        .route("/disabled", get(get_disabled_fields))
}

/// Get current settings
pub async fn get_settings(State(timer_service): State<TimerService>) -> AppResult<Json<TimerSettings>> {
    Ok(Json(timer_service.settings()?))
}

/// Apply a partial settings update
///
/// While the timer runs, duration and cadence changes are left out and listed
/// in `ignored_fields` rather than failing the whole request.
pub async fn update_settings(
    State(timer_service): State<TimerService>,
    WithRejection(Json(update), _): WithRejection<Json<SettingsUpdate>, AppError>,
) -> AppResult<Json<SettingsOutcome>> {
    Ok(Json(timer_service.update_settings(&update)?))
}

/// Map of every settings field to whether its control is disabled
pub async fn get_disabled_fields(
    State(timer_service): State<TimerService>,
) -> AppResult<Json<BTreeMap<SettingsField, bool>>> {
    let mut disabled = BTreeMap::new();
    for field in SettingsField::iter() {
        disabled.insert(field, timer_service.is_setting_disabled(field)?);
    }
    Ok(Json(disabled))
}
