//! Admin listings.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use blended_core::PageInfo;

use super::page_request;
use crate::db::{OrderRepository, UserRepository};
use crate::error::Result;
use crate::extract::ApiQuery;
use crate::middleware::RequireAdmin;
use crate::models::{Order, User};
use crate::state::AppState;

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

/// Paging query for admin listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// One page of users.
#[derive(Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    #[serde(flatten)]
    pub page: PageInfo,
}

/// One page of orders.
#[derive(Serialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    #[serde(flatten)]
    pub page: PageInfo,
}

/// `GET /admin/users`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiQuery(query): ApiQuery<AdminQuery>,
) -> Result<Json<UserPage>> {
    let page = page_request(query.page, query.per_page, DEFAULT_PER_PAGE, 1..=MAX_PER_PAGE)?;
    let (users, total) = UserRepository::new(state.pool()).list(page).await?;

    Ok(Json(UserPage {
        users,
        page: PageInfo::new(page, total),
    }))
}

/// `GET /admin/orders`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiQuery(query): ApiQuery<AdminQuery>,
) -> Result<Json<OrderPage>> {
    let page = page_request(query.page, query.per_page, DEFAULT_PER_PAGE, 1..=MAX_PER_PAGE)?;
    let (orders, total) = OrderRepository::new(state.pool()).list_all(page).await?;

    Ok(Json(OrderPage {
        orders,
        page: PageInfo::new(page, total),
    }))
}
