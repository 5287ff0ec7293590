//! Blended API - JSON REST backend for the Blended shop.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - `PostgreSQL` via sqlx for all shop data (schema `shop`)
//! - Cookie sessions (tower-sessions, signed, stored in `PostgreSQL`)
//! - Argon2 password hashing
//! - Per-IP rate limiting with governor
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`db`] - Repositories over the shop schema
//! - [`services`] - Auth, rating aggregation and order status logic
//! - [`routes`] - HTTP handlers
//! - [`middleware`] - Sessions, auth extractors, rate limits, headers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions::service::SignedCookie;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;

/// Build the complete application with its middleware stack.
///
/// The server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the rate limiters
/// can fall back to the peer address when no proxy headers are present.
pub fn app(
    state: AppState,
    session_layer: SessionManagerLayer<PostgresStore, SignedCookie>,
) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .nest(
            "/auth",
            routes::auth_routes().layer(middleware::auth_rate_limiter()),
        )
        .merge(routes::api_routes().layer(middleware::api_rate_limiter()))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
