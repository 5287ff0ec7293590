//! Newsletter subscriptions.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use blended_core::Email;

use crate::db::SubscriptionRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::state::AppState;

/// `POST /subscriptions` body.
#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// Subscription response.
#[derive(Serialize)]
pub struct SubscribeResponse {
    pub message: &'static str,
    pub email: Email,
}

/// `POST /subscriptions`: 201 for a new address, 200 if already subscribed.
#[instrument(skip_all)]
pub async fn subscribe(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscribeResponse>)> {
    let email = Email::parse(&input.email)
        .map_err(|e| AppError::BadRequest(format!("Invalid email address: {e}")))?;

    let (subscription, created) = SubscriptionRepository::new(state.pool())
        .subscribe(&email)
        .await?;

    let status = if created {
        tracing::info!(subscription_id = %subscription.id, "new subscriber");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(SubscribeResponse {
            message: "Subscription successful",
            email: subscription.email,
        }),
    ))
}
