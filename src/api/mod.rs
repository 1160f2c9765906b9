//! API module for Dorofi
//!
//! Contains the REST endpoints and the router that serves them.

pub mod settings;
pub mod timer;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::services::timer_service::TimerService;

pub use settings::create_settings_routes;
pub use timer::create_timer_routes;

/// Build the full application router
pub fn create_router(timer_service: TimerService, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/timer", create_timer_routes())
        .nest("/api/settings", create_settings_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
        .with_state(timer_service)
}

/// CORS for the configured origins; an empty list allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(allow_origin)
}

async fn health_check() -> &'static str {
    "OK"
}
