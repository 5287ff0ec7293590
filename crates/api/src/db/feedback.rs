//! Feedback repository; also the storage behind the rating aggregate.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use blended_core::{FeedbackId, PageRequest, ProductCategory, ProductId, Rate, RatingSummary};

use super::RepositoryError;
use crate::models::feedback::{Feedback, FeedbackFilter, NewFeedback};
use crate::services::ratings::FeedbackStore;

const FEEDBACK_COLUMNS: &str =
    "id, author, rate, comment, product_id, category, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct FeedbackRow {
    id: i32,
    author: String,
    rate: Rate,
    comment: String,
    product_id: i32,
    category: ProductCategory,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Self {
            id: FeedbackId::new(row.id),
            author: row.author,
            rate: row.rate,
            comment: row.comment,
            product_id: ProductId::new(row.product_id),
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product feedback.
pub struct FeedbackRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FeedbackRepository<'a> {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List one page of feedback, newest first, with the total matching count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: FeedbackFilter,
        page: PageRequest,
    ) -> Result<(Vec<Feedback>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
            r"
            SELECT {FEEDBACK_COLUMNS}
            FROM shop.feedback
            WHERE ($1::int IS NULL OR product_id = $1)
              AND ($2::smallint IS NULL OR rate = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(filter.product_id)
        .bind(filter.rate)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM shop.feedback
            WHERE ($1::int IS NULL OR product_id = $1)
              AND ($2::smallint IS NULL OR rate = $2)
            ",
        )
        .bind(filter.product_id)
        .bind(filter.rate)
        .fetch_one(self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}

impl FeedbackStore for FeedbackRepository<'_> {
    async fn insert(&self, input: &NewFeedback) -> Result<Feedback, RepositoryError> {
        let row = sqlx::query_as::<_, FeedbackRow>(&format!(
            r"
            INSERT INTO shop.feedback (author, rate, comment, product_id, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {FEEDBACK_COLUMNS}
            "
        ))
        .bind(&input.author)
        .bind(input.rate)
        .bind(&input.comment)
        .bind(input.product_id)
        .bind(input.category)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(row.into())
    }

    async fn delete(&self, id: FeedbackId) -> Result<Option<ProductId>, RepositoryError> {
        let product = sqlx::query_scalar::<_, ProductId>(
            "DELETE FROM shop.feedback WHERE id = $1 RETURNING product_id",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    async fn rates_for_product(&self, product: ProductId) -> Result<Vec<Rate>, RepositoryError> {
        let rates = sqlx::query_scalar::<_, Rate>(
            "SELECT rate FROM shop.feedback WHERE product_id = $1",
        )
        .bind(product)
        .fetch_all(self.pool)
        .await?;

        Ok(rates)
    }

    async fn save_summary(
        &self,
        product: ProductId,
        summary: RatingSummary,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE shop.product
            SET average_rate = $2, feedback_count = $3
            WHERE id = $1
            ",
        )
        .bind(product)
        .bind(summary.average)
        .bind(summary.count)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
