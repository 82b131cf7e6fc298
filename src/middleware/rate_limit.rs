use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Type alias for the governor layer (IP-based rate limiting)
pub type IpGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Per-IP rate limiting: `rate_limit_burst` requests at once, one slot regained every
/// `rate_limit_replenish_ms`. Needs the server to expose `ConnectInfo<SocketAddr>`.
pub fn create_ip_governor(config: &Config) -> AppResult<IpGovernorLayer> {
    let governor_config = GovernorConfigBuilder::default()
        .per_millisecond(config.rate_limit_replenish_ms)
        .burst_size(config.rate_limit_burst)
        .finish()
        .ok_or_else(|| {
            AppError::Config(
                "RATE_LIMIT_BURST and RATE_LIMIT_REPLENISH_MS must be non-zero".to_string(),
            )
        })?;

    Ok(GovernorLayer::new(Arc::new(governor_config)))
}

/// Middleware to log request outcomes, calling out rate-limited clients
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            "Rate limited"
        );
    } else if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request failed"
        );
    } else {
        tracing::debug!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request completed"
        );
    }

    response
}
