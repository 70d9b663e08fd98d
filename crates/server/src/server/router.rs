//! Axum router construction.

use std::path::Path;
use std::time::Duration;

use axum::{
    handler::HandlerWithoutStateExt,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// Paths that match no route are served from `static_dir` when given, else
/// answered with a JSON 404.
pub fn build(state: AppState, timeout: Duration, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/encrypt", post(handlers::encrypt))
        .route("/decrypt", post(handlers::decrypt))
        .route("/health", get(handlers::health));

    let router = match static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).not_found_service(handlers::not_found.into_service()),
        ),
        None => router.fallback(handlers::not_found),
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(middleware::cors())
        .with_state(state)
}
