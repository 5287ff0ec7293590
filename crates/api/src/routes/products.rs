//! Products.
//!
//! Anyone may browse; any logged-in user may create a product and becomes its
//! owner; only the owner or an admin may change or delete it.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use blended_core::{PageInfo, ProductCategory, ProductId};

use super::page_request;
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, NewProduct, Product, ProductFilter, ProductUpdate};
use crate::state::AppState;

const DEFAULT_PER_PAGE: u32 = 12;
const MAX_PER_PAGE: u32 = 50;

/// `GET /products` query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<ProductCategory>,
}

/// One page of products.
#[derive(Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(flatten)]
    pub page: PageInfo,
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_owned())
}

/// Load a product and check the caller may manage it.
async fn load_managed(
    repo: &ProductRepository<'_>,
    user: &CurrentUser,
    id: ProductId,
) -> Result<Product> {
    let product = repo.get_by_id(id).await?.ok_or_else(not_found)?;
    if !user.can_manage(product.owner_id) {
        return Err(AppError::Forbidden(
            "Only the owner or an admin may change this product".to_owned(),
        ));
    }
    Ok(product)
}

/// `GET /products`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<Json<ProductPage>> {
    let page = page_request(query.page, query.per_page, DEFAULT_PER_PAGE, 1..=MAX_PER_PAGE)?;
    let filter = ProductFilter {
        category: query.category,
    };
    let (products, total) = ProductRepository::new(state.pool())
        .list(filter, page)
        .await?;

    Ok(Json(ProductPage {
        products,
        page: PageInfo::new(page, total),
    }))
}

/// `GET /products/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// `POST /products`
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<NewProduct>,
) -> Result<impl IntoResponse> {
    let input = input.validated().map_err(AppError::BadRequest)?;

    let product = ProductRepository::new(state.pool())
        .create(user.id, &input)
        .await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PATCH /products/{id}` (owner or admin)
#[instrument(skip(state, user, update), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(update): ApiJson<ProductUpdate>,
) -> Result<Json<Product>> {
    let update = update.validated().map_err(AppError::BadRequest)?;

    let repo = ProductRepository::new(state.pool());
    load_managed(&repo, &user, id).await?;

    let product = repo.update(id, &update).await.map_err(|e| match e {
        RepositoryError::NotFound => not_found(),
        other => other.into(),
    })?;
    Ok(Json(product))
}

/// `DELETE /products/{id}` (owner or admin)
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    let repo = ProductRepository::new(state.pool());
    load_managed(&repo, &user, id).await?;

    repo.delete(id).await.map_err(|e| match e {
        RepositoryError::NotFound => not_found(),
        other => other.into(),
    })?;

    tracing::info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
