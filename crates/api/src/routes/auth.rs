//! Registration, login and logout.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use blended_core::{Email, UserRole};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, NewUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

/// Put a freshly authenticated user into the session.
async fn start_session(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    set_current_user(session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// `POST /auth/register`
#[instrument(skip(state, session, input))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<impl IntoResponse> {
    let input = input.validated().map_err(AppError::BadRequest)?;

    let user = AuthService::new(state.pool())
        .register(&input, UserRole::User)
        .await?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /auth/login`
#[instrument(skip(state, session, input))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(input): ApiJson<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login(&input.email, &input.password)
        .await?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(user))
}

/// `POST /auth/logout`
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
