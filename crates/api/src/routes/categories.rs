//! Catalogue categories.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use blended_core::{CategoryId, PageInfo};

use super::page_request;
use crate::db::{CategoryRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Category, CategoryUpdate, NewCategory};
use crate::state::AppState;

const DEFAULT_PER_PAGE: u32 = 6;
const MIN_PER_PAGE: u32 = 3;
const MAX_PER_PAGE: u32 = 7;

/// `GET /categories` query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// One page of categories.
#[derive(Serialize)]
pub struct CategoryPage {
    pub categories: Vec<Category>,
    #[serde(flatten)]
    pub page: PageInfo,
}

fn map_conflict(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::Conflict(_) => {
            AppError::Conflict("Category with this name already exists".to_owned())
        }
        RepositoryError::NotFound => AppError::NotFound("Category not found".to_owned()),
        other => other.into(),
    }
}

/// `GET /categories`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CategoryQuery>,
) -> Result<Json<CategoryPage>> {
    let page = page_request(
        query.page,
        query.per_page,
        DEFAULT_PER_PAGE,
        MIN_PER_PAGE..=MAX_PER_PAGE,
    )?;
    let (categories, total) = CategoryRepository::new(state.pool()).list(page).await?;

    Ok(Json(CategoryPage {
        categories,
        page: PageInfo::new(page, total),
    }))
}

/// `GET /categories/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Category>> {
    CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))
}

/// `POST /categories` (admin)
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(input): ApiJson<NewCategory>,
) -> Result<impl IntoResponse> {
    let input = input.validated().map_err(AppError::BadRequest)?;

    let category = CategoryRepository::new(state.pool())
        .create(&input)
        .await
        .map_err(map_conflict)?;

    tracing::info!(category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PATCH /categories/{id}` (admin)
#[instrument(skip(state, admin, update), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(update): ApiJson<CategoryUpdate>,
) -> Result<Json<Category>> {
    let update = update.validated().map_err(AppError::BadRequest)?;

    let category = CategoryRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(map_conflict)?;
    Ok(Json(category))
}
