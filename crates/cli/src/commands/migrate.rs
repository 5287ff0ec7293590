//! Database migration command.
//!
//! Applies `crates/api/migrations/` to the database named by
//! `API_DATABASE_URL` (or `DATABASE_URL`). Already applied migrations are
//! skipped, so running it twice is harmless.

use thiserror::Error;

use blended_api::db;

use super::{MissingEnvVar, database_url};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVar),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the shop database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to shop database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running shop migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Shop migrations complete!");
    Ok(())
}
