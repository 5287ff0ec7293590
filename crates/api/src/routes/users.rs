//! The logged-in user's own profile.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result, clear_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{RequireAuth, clear_current_user};
use crate::models::{ProfileUpdate, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// `GET /users/profile`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool()).get_user(user.id).await?;
    Ok(Json(user))
}

/// `PATCH /users/profile`
#[instrument(skip(state, user, update), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<User>> {
    let update = update.validated().map_err(AppError::BadRequest)?;

    let user = UserRepository::new(state.pool())
        .update_profile(user.id, &update)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::Unauthorized("Not authorized".to_owned()),
            other => other.into(),
        })?;
    Ok(Json(user))
}

/// `DELETE /users/profile`: delete the account and end the session.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn delete_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<StatusCode> {
    UserRepository::new(state.pool()).delete(user.id).await?;

    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();

    tracing::info!("account deleted");
    Ok(StatusCode::NO_CONTENT)
}
