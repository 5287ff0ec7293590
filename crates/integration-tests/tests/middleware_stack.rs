//! Middleware behaviour of the assembled app. No database needed: every
//! request here is answered before a query runs.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::json;

use blended_integration_tests::{Client, lazy_pool, test_app};

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = test_app(lazy_pool());
    let mut client = Client::new(&app);

    let response = client.send("GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["cache-control"], "no-store");
    assert!(!response.headers["x-request-id"].is_empty());

    let response = client
        .send_with_headers("GET", "/health", &[("x-request-id", "trace-42")], None)
        .await;
    assert_eq!(response.headers["x-request-id"], "trace-42");
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let app = test_app(lazy_pool());
    let mut client = Client::new(&app);

    // Malformed bodies are rejected before any query, but still count
    for _ in 0..5 {
        let response = client
            .send("POST", "/auth/login", Some(json!({"email": "nobody"})))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    let response = client
        .send("POST", "/auth/login", Some(json!({"email": "nobody"})))
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    // Other clients have their own bucket
    let response = Client::new(&app)
        .send("POST", "/auth/login", Some(json!({"email": "nobody"})))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_body_shape() {
    let app = test_app(lazy_pool());

    let response = Client::new(&app)
        .send("GET", "/products?perPage=500", None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], 400);
    assert_eq!(response.body["message"], "perPage must be between 1 and 50");

    let response = Client::new(&app).send("GET", "/orders", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Not authorized");
}
