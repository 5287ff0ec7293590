//! Orders: placing, listing one's own, and admin status changes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::instrument;

use blended_core::{OrderNumber, ProductId};

use crate::db::{OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{NewOrder, Order};
use crate::services::orders;
use crate::state::AppState;

/// `PATCH /orders/{productId}/status` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub order_num: OrderNumber,
    /// Checked against the allowed set by the service, not by serde, so an
    /// unknown status gets a message listing the allowed ones.
    pub status: String,
}

/// `POST /orders`
///
/// The order is attributed to the account whose phone equals `userPhone`;
/// with no match it has no owner.
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<NewOrder>,
) -> Result<impl IntoResponse> {
    let input = input.validated().map_err(AppError::BadRequest)?;

    let owner = UserRepository::new(state.pool())
        .find_id_by_phone(&input.user_phone)
        .await?;
    let order = OrderRepository::new(state.pool())
        .create(owner, &input)
        .await?;

    tracing::info!(
        order_num = %order.order_num,
        owner = ?order.user_id,
        "order placed"
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /orders`: the caller's orders, 404 when there are none.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    if orders.is_empty() {
        return Err(AppError::NotFound("Order not found".to_owned()));
    }
    Ok(Json(orders))
}

/// `PATCH /orders/{productId}/status` (admin)
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> Result<Json<Order>> {
    let order = orders::update_status(
        &OrderRepository::new(state.pool()),
        product_id,
        body.order_num,
        &body.status,
    )
    .await?;

    Ok(Json(order))
}
