use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{estimate, page};
use crate::middleware::rate_limit::{create_ip_governor, log_request};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/estimate", post(estimate::estimate))
        .route("/metrics", post(estimate::metrics))
        .route("/geocode", get(estimate::geocode));

    Router::new()
        .route("/", get(page::index))
        .route("/health", get(estimate::health))
        .nest("/api", api_routes)
        .with_state(state)
}

/// The router with per-IP rate limiting, request logging, tracing and CORS.
/// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_app(state: AppState) -> Router {
    create_router(state)
        .layer(create_ip_governor())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}
