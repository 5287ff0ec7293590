//! Integration tests for Blended.
//!
//! # Running Tests
//!
//! ```bash
//! # Tests that need no database run by default
//! cargo test -p blended-integration-tests
//!
//! # Database tests: point TEST_DATABASE_URL at a disposable database
//! TEST_DATABASE_URL=postgres://localhost/blended_test \
//!     cargo test -p blended-integration-tests -- --ignored
//! ```
//!
//! The harness drives the real router in-process with `tower::ServiceExt`,
//! including the `PostgreSQL` session store and the rate limiters. Each
//! [`Client`] gets its own forwarded IP so limiter buckets never collide.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU8, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use blended_api::config::{ApiConfig, SentryConfig};
use blended_api::state::AppState;
use blended_api::{app, db, middleware};

static NEXT_CLIENT: AtomicU8 = AtomicU8::new(1);

/// Connect to `TEST_DATABASE_URL` and apply migrations.
///
/// # Panics
///
/// Panics if the variable is unset or the database is unreachable; callers
/// are `#[ignore]`d tests that opt in to a database.
#[allow(clippy::expect_used)]
pub async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

/// A pool that never connects, for requests rejected before any query.
///
/// # Panics
///
/// Panics if the placeholder URL does not parse.
#[allow(clippy::expect_used)]
#[must_use]
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost:1/unreachable")
        .expect("URL parses")
}

/// Build the full application over `pool`.
///
/// # Panics
///
/// Panics if the fixed test signing key is rejected.
#[allow(clippy::expect_used)]
pub fn test_app(pool: PgPool) -> Router {
    let config = ApiConfig {
        database_url: SecretString::from("postgres://unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost".to_owned(),
        session_secret: SecretString::from("z9".repeat(32)),
        sentry: SentryConfig::default(),
    };
    let session_layer =
        middleware::create_session_layer(&pool, &config).expect("64-byte key is accepted");
    app(AppState::new(config, pool), session_layer)
}

/// Suffix that keeps emails and phones unique across runs.
#[must_use]
pub fn unique_suffix() -> String {
    let n = uuid::Uuid::new_v4().as_u128() % 1_000_000_000;
    format!("{n:09}")
}

/// A unique `+380` phone.
#[must_use]
pub fn unique_phone() -> String {
    format!("+380{}", unique_suffix())
}

/// Response status, headers and body.
///
/// The body is decoded JSON, `Null` when empty, or a JSON string holding the
/// raw text for non-JSON bodies.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// A cookie-keeping HTTP client bound to one app.
pub struct Client {
    app: Router,
    ip: String,
    cookie: Option<String>,
}

impl Client {
    /// Create a client with a fresh forwarded IP and no session.
    #[must_use]
    pub fn new(app: &Router) -> Self {
        let n = NEXT_CLIENT.fetch_add(1, Ordering::Relaxed);
        Self {
            app: app.clone(),
            ip: format!("10.0.0.{n}"),
            cookie: None,
        }
    }

    /// Send a request with extra headers.
    pub async fn send_with_headers(
        &mut self,
        method: &str,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        self.send_inner(method, uri, headers, body).await
    }

    /// Send a request, storing any session cookie the server sets.
    pub async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        self.send_inner(method, uri, &[], body).await
    }

    /// Build and dispatch a request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    #[allow(clippy::expect_used)]
    async fn send_inner(
        &mut self,
        method: &str,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", &self.ip);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(set_cookie.to_owned());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body is readable")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Register a regular user and keep the session.
    pub async fn register(&mut self, email: &str, phone: &str) -> TestResponse {
        self.send(
            "POST",
            "/auth/register",
            Some(serde_json::json!({
                "name": "Test",
                "lastname": "User",
                "email": email,
                "password": "correct horse battery",
                "phone": phone,
            })),
        )
        .await
    }

    /// Log in and keep the session.
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/auth/login",
            Some(serde_json::json!({"email": email, "password": password})),
        )
        .await
    }
}
