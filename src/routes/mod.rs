use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::AppResult;
use crate::handlers::{driver, health};
use crate::middleware::rate_limit::{create_ip_governor, log_request};
use crate::AppState;

/// Application routes without transport layers.
pub fn create_router(state: AppState) -> Router {
    let driver_routes = Router::new().route("/nearby", get(driver::nearby_drivers));

    Router::new()
        .route("/health", get(health::health))
        .route("/auto-allocation", post(driver::auto_allocation))
        .nest("/api/drivers", driver_routes)
        .with_state(state)
}

/// Routes wrapped in tracing, CORS, concurrency and per-IP rate limiting.
///
/// `log_request` sits outside the governor so throttled requests are logged too. The
/// server must be started with `ConnectInfo<SocketAddr>`.
pub fn create_app(state: AppState, config: &Config) -> AppResult<Router> {
    let governor = create_ip_governor(config)?;

    Ok(create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(governor)
        .layer(middleware::from_fn(log_request)))
}
