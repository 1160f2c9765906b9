//! Error handling for Dorofi
//!
//! Maps timer and settings errors, and rejected request bodies, onto HTTP
//! responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::services::timer_engine::TimerEngineError;
use crate::services::timer_service::TimerServiceError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Timer error: {0}")]
    Timer(#[from] TimerServiceError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<TimerEngineError> for AppError {
    fn from(error: TimerEngineError) -> Self {
        AppError::Timer(TimerServiceError::Engine(error))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Timer(TimerServiceError::Engine(TimerEngineError::InvalidSettings(_)))
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Timer(TimerServiceError::Engine(
                TimerEngineError::SettingsLockedWhileRunning { .. },
            )) => StatusCode::CONFLICT,
            AppError::Timer(TimerServiceError::StatePoisoned) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Timer(TimerServiceError::Engine(TimerEngineError::InvalidSettings(_))) => {
                "InvalidDuration"
            }
            AppError::Timer(TimerServiceError::Engine(
                TimerEngineError::SettingsLockedWhileRunning { .. },
            )) => "SettingsLockedWhileRunning",
            AppError::Timer(TimerServiceError::StatePoisoned) => "TimerStateUnavailable",
            AppError::BadRequest(_) => "BadRequest",
        }
    }

    /// Check if this error should be logged as an error vs warning
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "timestamp": Utc::now().timestamp(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
