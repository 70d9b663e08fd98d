//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, CORS and response compression.

use std::time::Duration;

use tower_http::cors::CorsLayer;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Any origin, method and header may call the API.
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}
