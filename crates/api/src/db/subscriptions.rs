//! Newsletter subscription repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use blended_core::{Email, SubscriptionId};

use super::RepositoryError;
use crate::models::Subscription;

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: i32,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = RepositoryError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: SubscriptionId::new(row.id),
            email,
            created_at: row.created_at,
        })
    }
}

/// Repository for newsletter subscriptions.
pub struct SubscriptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an address. Returns the subscription and whether it is new.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn subscribe(&self, email: &Email) -> Result<(Subscription, bool), RepositoryError> {
        let inserted = sqlx::query_as::<_, SubscriptionRow>(
            r"
            INSERT INTO shop.subscription (email) VALUES ($1)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, created_at
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok((row.try_into()?, true));
        }

        let existing = sqlx::query_as::<_, SubscriptionRow>(
            "SELECT id, email, created_at FROM shop.subscription WHERE email = $1",
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;

        Ok((existing.try_into()?, false))
    }
}
