//! Custodial key escrow service.
//!
//! Issues RSA identities, accepts session keys wrapped under them, and
//! recovers the latest escrowed key on request.
//!
//! # Architecture
//!
//! - [`services`] hold the escrow logic and talk to storage only through the
//!   `escrow-storage` repository traits
//! - [`handlers`] translate HTTP requests into service calls and map
//!   [`EscrowError`] onto status codes through [`AppError`]
//! - [`app`] assembles the router with request ids, tracing, and a body limit

pub mod client_ip;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

use axum::{Router, http};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use config::ServerConfig;
pub use error::{AppError, EscrowError, EscrowResult};
pub use state::AppState;

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the full HTTP application.
pub fn app(state: AppState) -> Router {
    let x_request_id = http::HeaderName::from_static(REQUEST_ID_HEADER);
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .merge(handlers::health::router())
        .merge(handlers::identities::router())
        .merge(handlers::recover::router())
        .merge(handlers::records::router())
        .with_state(state)
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
}
