//! Product feedback. Writes refresh the product's rating aggregate.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use blended_core::{FeedbackId, PageInfo, ProductId, Rate};

use super::page_request;
use crate::db::FeedbackRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Feedback, FeedbackFilter, NewFeedback};
use crate::services::ratings::RatingService;
use crate::state::AppState;

const DEFAULT_PER_PAGE: u32 = 3;
const MIN_PER_PAGE: u32 = 3;
const MAX_PER_PAGE: u32 = 12;

/// `GET /feedbacks` query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub product: Option<ProductId>,
    pub rate: Option<Rate>,
}

/// One page of feedback.
#[derive(Serialize)]
pub struct FeedbackPage {
    pub feedbacks: Vec<Feedback>,
    #[serde(flatten)]
    pub page: PageInfo,
}

/// `GET /feedbacks`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FeedbackQuery>,
) -> Result<Json<FeedbackPage>> {
    let page = page_request(
        query.page,
        query.per_page,
        DEFAULT_PER_PAGE,
        MIN_PER_PAGE..=MAX_PER_PAGE,
    )?;
    let filter = FeedbackFilter {
        product_id: query.product,
        rate: query.rate,
    };
    let (feedbacks, total) = FeedbackRepository::new(state.pool())
        .list(filter, page)
        .await?;

    Ok(Json(FeedbackPage {
        feedbacks,
        page: PageInfo::new(page, total),
    }))
}

/// `POST /feedbacks`
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewFeedback>,
) -> Result<impl IntoResponse> {
    let input = input.validated().map_err(AppError::BadRequest)?;

    let (feedback, _) = RatingService::new(FeedbackRepository::new(state.pool()))
        .add_feedback(&input)
        .await?;

    Ok((StatusCode::CREATED, Json(feedback)))
}

/// `DELETE /feedbacks/{id}` (admin)
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<FeedbackId>,
) -> Result<StatusCode> {
    RatingService::new(FeedbackRepository::new(state.pool()))
        .remove_feedback(id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
