//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown email.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Email is registered to another account.
    #[error("email is already registered")]
    EmailTaken,

    /// Phone is registered to another account.
    #[error("phone is already registered")]
    PhoneTaken,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
