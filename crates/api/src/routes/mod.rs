//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Readiness (database ping)
//!
//! # Auth (strict rate limit)
//! POST   /auth/register                - Create account, start session
//! POST   /auth/login                   - Start session
//! POST   /auth/logout                  - End session
//!
//! # Profile (requires auth)
//! GET    /users/profile
//! PATCH  /users/profile
//! DELETE /users/profile
//!
//! # Catalogue
//! GET    /categories                   - ?page&perPage (3..=7, default 6)
//! GET    /categories/{id}
//! POST   /categories                   - Admin
//! PATCH  /categories/{id}              - Admin
//! GET    /products                     - ?page&perPage (default 12)&category
//! GET    /products/{id}
//! POST   /products                     - Auth; caller becomes owner
//! PATCH  /products/{id}                - Owner or admin
//! DELETE /products/{id}                - Owner or admin
//!
//! # Feedback
//! GET    /feedbacks                    - ?page&perPage (3..=12, default 3)&product&rate
//! POST   /feedbacks                    - Public; refreshes product rating
//! DELETE /feedbacks/{id}               - Admin; refreshes product rating
//!
//! # Orders
//! POST   /orders                       - Auth
//! GET    /orders                       - Auth; caller's orders
//! PATCH  /orders/{productId}/status    - Admin
//!
//! # Newsletter
//! POST   /subscriptions
//!
//! # Admin
//! GET    /admin/users
//! GET    /admin/orders
//! ```

pub mod admin;
pub mod auth;
pub mod categories;
pub mod feedback;
pub mod health;
pub mod orders;
pub mod products;
pub mod subscriptions;
pub mod users;

use std::ops::RangeInclusive;

use axum::{
    Router,
    routing::{get, patch, post},
};

use blended_core::PageRequest;

use crate::error::AppError;
use crate::state::AppState;

/// Validate paging query values for an endpoint.
fn page_request(
    page: Option<u32>,
    per_page: Option<u32>,
    default_per_page: u32,
    bounds: RangeInclusive<u32>,
) -> Result<PageRequest, AppError> {
    PageRequest::new(page, per_page, default_per_page, bounds)
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the health routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Create every API route except auth and health.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/profile",
            get(users::profile)
                .patch(users::update_profile)
                .delete(users::delete_profile),
        )
        .route("/categories", get(categories::index).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::show).patch(categories::update),
        )
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::delete),
        )
        .route("/feedbacks", get(feedback::index).post(feedback::create))
        .route("/feedbacks/{id}", axum::routing::delete(feedback::delete))
        .route("/orders", get(orders::index).post(orders::create))
        .route("/orders/{product_id}/status", patch(orders::update_status))
        .route("/subscriptions", post(subscriptions::subscribe))
        .route("/admin/users", get(admin::users))
        .route("/admin/orders", get(admin::orders))
}

/// Create all routes, without rate limiting.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/auth", auth_routes())
        .merge(api_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::extract::Path;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session, cookie::Key};

    use blended_core::{Email, UserId, UserRole};

    use super::*;
    use crate::config::{ApiConfig, SentryConfig};
    use crate::middleware::session::session_layer_with_store;
    use crate::middleware::set_current_user;
    use crate::models::CurrentUser;

    /// Router with an in-memory session store and a pool that never
    /// connects, so only paths that stop before the database are exercised.
    fn test_app() -> Router {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost:1/unreachable"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3030,
            base_url: "http://localhost:3030".to_owned(),
            session_secret: SecretString::from("s".repeat(64)),
            sentry: SentryConfig::default(),
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:1/unreachable")
            .unwrap();
        let state = AppState::new(config, pool);

        routes()
            .route("/test/login/{role}", post(login_as))
            .layer(session_layer_with_store(
                MemoryStore::default(),
                Key::from(&[7_u8; 64][..]),
                false,
            ))
            .with_state(state)
    }

    async fn login_as(session: Session, Path(role): Path<String>) -> StatusCode {
        let user = CurrentUser {
            id: UserId::new(1),
            email: Email::parse("tester@example.com").unwrap(),
            role: role.parse::<UserRole>().unwrap(),
        };
        set_current_user(&session, &user).await.unwrap();
        StatusCode::NO_CONTENT
    }

    /// Log in through the test route and return the session cookie.
    async fn cookie_for(app: &Router, role: &str) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/test/login/{role}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_owned()
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let response = send(&app, "GET", "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_protected_routes_require_session() {
        let app = test_app();
        for (method, uri) in [
            ("GET", "/users/profile"),
            ("GET", "/orders"),
            ("POST", "/products"),
            ("DELETE", "/feedbacks/1"),
            ("GET", "/admin/users"),
        ] {
            let response = send(&app, method, uri, None, None).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
            let body = json_body(response).await;
            assert_eq!(body["status"], 401);
        }
    }

    #[tokio::test]
    async fn test_admin_routes_forbid_regular_users() {
        let app = test_app();
        let cookie = cookie_for(&app, "user").await;

        let response = send(
            &app,
            "PATCH",
            "/orders/5/status",
            Some(&cookie),
            Some(serde_json::json!({"orderNum": 1, "status": "shipped"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(
            &app,
            "POST",
            "/categories",
            Some(&cookie),
            Some(serde_json::json!({"name": "Tea"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&app, "GET", "/admin/orders", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_order_status_rejected() {
        let app = test_app();
        let cookie = cookie_for(&app, "admin").await;

        let response = send(
            &app,
            "PATCH",
            "/orders/5/status",
            Some(&cookie),
            Some(serde_json::json!({"orderNum": 1001, "status": "lost"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("invalid order status 'lost'"), "{message}");
    }

    #[tokio::test]
    async fn test_order_without_phone_rejected() {
        let app = test_app();
        let cookie = cookie_for(&app, "user").await;

        let response = send(
            &app,
            "POST",
            "/orders",
            Some(&cookie),
            Some(serde_json::json!({
                "products": [{"productId": 3, "amount": 1}],
                "sum": 250,
                "userName": "Oksana",
                "userLastName": "Koval",
                "city": "Kyiv",
                "branchnumNp": "12"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Phone is required");
    }

    #[tokio::test]
    async fn test_feedback_rate_out_of_range() {
        let app = test_app();
        let response = send(
            &app,
            "POST",
            "/feedbacks",
            None,
            Some(serde_json::json!({
                "author": "Iryna", "rate": 6, "comment": "Too good", "product": 1
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pagination_bounds() {
        let app = test_app();
        let response = send(&app, "GET", "/categories?perPage=20", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "perPage must be between 3 and 7"
        );

        let response = send(&app, "GET", "/feedbacks?page=0", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "GET", "/products?category=Garden", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let app = test_app();
        let response = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(serde_json::json!({
                "name": "Taras", "email": "taras@example.com",
                "password": "long enough", "phone": "0501234567"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_subscription_rejects_bad_email() {
        let app = test_app();
        let response = send(
            &app,
            "POST",
            "/subscriptions",
            None,
            Some(serde_json::json!({"email": "not-an-email"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_without_session() {
        let app = test_app();
        let response = send(&app, "POST", "/auth/logout", None, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
