//! Notes API - REST server for the multi-user notes service
//!
//! Provides sign-up/sign-in and owner-scoped note CRUD over HTTP.
//!
//! Author: hephaex@gmail.com

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::{body::Body, http::Request, routing::get, Router};
use handlers::health;
use middleware::{request_id::REQUEST_ID_HEADER, response_headers_middleware, UuidRequestId};
use notes_core::config::ServerConfig;
use notes_core::Storage;
use state::AppState;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};

/// Build the full application router
///
/// Layers, outermost first: request id, tracing, request id propagation,
/// response headers, write timeout, read timeout.
pub fn create_router<S>(state: AppState<S>, server: &ServerConfig) -> Router
where
    S: Storage + 'static,
{
    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(axum::middleware::from_fn(response_headers_middleware))
        .layer(TimeoutLayer::new(server.write_timeout()))
        .layer(RequestBodyTimeoutLayer::new(server.read_timeout()));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check::<S>))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .merge(routes::api_routes(&state))
        .layer(layers)
        .with_state(state)
}
