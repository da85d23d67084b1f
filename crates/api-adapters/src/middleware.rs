//! Middleware
//!
//! Request tracing and CORS for the API router.

use std::time::Duration;

use axum::http::{header, HeaderName, Method};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::extractors::API_KEY_HEADER;

/// One `tracing` span per request, with method, uri and latency.
pub fn standard_middleware() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// Lets a browser frontend on another origin call the API with its key.
pub fn cors_policy(allow_any_origin: bool) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
        .max_age(Duration::from_secs(3600));

    if allow_any_origin {
        cors.allow_origin(Any)
    } else {
        cors
    }
}
