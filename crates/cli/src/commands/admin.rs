//! Admin account management commands.
//!
//! Registration through the API always creates regular users; admin accounts
//! are created or promoted here.
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use thiserror::Error;

use blended_api::db;
use blended_api::models::NewUser;
use blended_api::services::auth::{AuthError, AuthService};
use blended_core::{Email, Phone, UserId, UserRole};

use super::{MissingEnvVar, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVar),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Input rejected before touching the database.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Account operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Validate command-line input into a `NewUser`.
fn new_user(email: &str, name: &str, password: &str, phone: &str) -> Result<NewUser, AdminError> {
    let email = Email::parse(email).map_err(|e| AdminError::InvalidInput(e.to_string()))?;
    let phone = Phone::parse(phone).map_err(|e| AdminError::InvalidInput(e.to_string()))?;

    NewUser {
        name: name.to_owned(),
        email,
        password: password.to_owned(),
        phone,
        lastname: None,
        city: None,
    }
    .validated()
    .map_err(AdminError::InvalidInput)
}

/// Create a new admin account.
///
/// # Errors
///
/// Returns `AdminError` for invalid input, a taken email or phone, or a
/// database failure.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
    phone: &str,
) -> Result<UserId, AdminError> {
    let input = new_user(email, name, password, phone)?;

    tracing::info!("Connecting to shop database...");
    let pool = db::create_pool(&database_url()?).await?;

    let user = AuthService::new(&pool)
        .register(&input, UserRole::Admin)
        .await?;

    tracing::info!(
        "Admin account created! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}

/// Promote an existing account to admin.
///
/// The new role applies from the account's next login.
///
/// # Errors
///
/// Returns `AdminError` if the email is invalid, no account has it, or the
/// database fails.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email).map_err(|e| AdminError::InvalidInput(e.to_string()))?;

    let pool = db::create_pool(&database_url()?).await?;
    let user = AuthService::new(&pool).promote(&email).await?;

    tracing::info!("{} ({}) is now an admin", user.email, user.id);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_validation() {
        assert!(new_user("admin@example.com", "Admin", "long enough", "+380501234567").is_ok());
        assert!(matches!(
            new_user("admin", "Admin", "long enough", "+380501234567"),
            Err(AdminError::InvalidInput(_))
        ));
        assert!(matches!(
            new_user("admin@example.com", "Admin", "long enough", "0501234567"),
            Err(AdminError::InvalidInput(_))
        ));
        assert!(matches!(
            new_user("admin@example.com", "  ", "long enough", "+380501234567"),
            Err(AdminError::InvalidInput(_))
        ));
    }
}
