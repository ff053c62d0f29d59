pub mod handler;
pub mod middleware;
pub mod relay;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware as axum_mw};
use genrelay_core::config::Config;
use relay::Relay;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: Arc<Relay>,
}

pub fn build_router(state: AppState) -> Router {
    let body_limit_bytes = state.config.body_limit_mb * 1024 * 1024;

    let public_routes = Router::new().route("/health", axum::routing::get(handler::health::health));

    // Every method reaches the relay so it can answer 405 itself.
    let relay_routes = Router::new()
        .route(
            "/api/generate",
            axum::routing::any(handler::generate::generate),
        )
        .route(
            "/.netlify/functions/generate",
            axum::routing::any(handler::generate::generate),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes));

    // Compose, then global middleware layers (outer → inner)
    Router::new()
        .merge(public_routes)
        .merge(relay_routes)
        .layer(axum_mw::from_fn(
            middleware::request_logging::request_logging_middleware,
        ))
        .layer(axum_mw::from_fn(
            middleware::request_context::request_context_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
