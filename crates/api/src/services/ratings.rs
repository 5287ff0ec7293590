//! Feedback writes and the per-product rating aggregate.
//!
//! Every feedback insert or delete is followed, within the same request, by a
//! rebuild of the product's cached aggregate from the rates that remain:
//!
//! 1. write the feedback row (or delete it)
//! 2. read every remaining rate of the product
//! 3. store [`RatingSummary::from_rates`] on the product
//!
//! The steps are separate statements. Two concurrent writes to the same
//! product may interleave and the later `save_summary` wins; the next write
//! to that product repairs the aggregate.

use thiserror::Error;
use tracing::instrument;

use blended_core::{FeedbackId, ProductId, Rate, RatingSummary};

use crate::db::RepositoryError;
use crate::models::{Feedback, NewFeedback};

/// Storage needed to keep rating aggregates in sync with feedback.
#[allow(async_fn_in_trait)]
pub trait FeedbackStore: Send + Sync {
    /// Insert a feedback row.
    ///
    /// Returns `RepositoryError::NotFound` when the product doesn't exist.
    async fn insert(&self, input: &NewFeedback) -> Result<Feedback, RepositoryError>;

    /// Delete a feedback row, returning the product it belonged to.
    async fn delete(&self, id: FeedbackId) -> Result<Option<ProductId>, RepositoryError>;

    /// Every rate currently stored for a product.
    async fn rates_for_product(&self, product: ProductId) -> Result<Vec<Rate>, RepositoryError>;

    /// Overwrite the product's cached aggregate.
    async fn save_summary(
        &self,
        product: ProductId,
        summary: RatingSummary,
    ) -> Result<(), RepositoryError>;
}

/// Errors from feedback operations.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// Feedback referenced a product that doesn't exist.
    #[error("product not found")]
    ProductNotFound,

    /// No feedback with the given ID.
    #[error("feedback not found")]
    FeedbackNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Applies feedback writes and rebuilds the affected aggregate.
pub struct RatingService<S> {
    store: S,
}

impl<S: FeedbackStore> RatingService<S> {
    /// Create a rating service over a feedback store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Store new feedback and refresh the product's aggregate.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::ProductNotFound` for an unknown product.
    /// Returns `FeedbackError::Repository` if a storage step fails.
    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn add_feedback(
        &self,
        input: &NewFeedback,
    ) -> Result<(Feedback, RatingSummary), FeedbackError> {
        let feedback = self.store.insert(input).await.map_err(|e| match e {
            RepositoryError::NotFound => FeedbackError::ProductNotFound,
            other => FeedbackError::Repository(other),
        })?;

        let summary = self.recompute(feedback.product_id).await?;
        Ok((feedback, summary))
    }

    /// Delete feedback and refresh the aggregate of the product it was left on.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::FeedbackNotFound` for an unknown ID.
    /// Returns `FeedbackError::Repository` if a storage step fails.
    #[instrument(skip(self), fields(feedback_id = %id))]
    pub async fn remove_feedback(
        &self,
        id: FeedbackId,
    ) -> Result<(ProductId, RatingSummary), FeedbackError> {
        let product = self
            .store
            .delete(id)
            .await?
            .ok_or(FeedbackError::FeedbackNotFound)?;

        let summary = self.recompute(product).await?;
        Ok((product, summary))
    }

    /// Rebuild a product's aggregate from its stored rates.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::Repository` if reading or saving fails.
    pub async fn recompute(&self, product: ProductId) -> Result<RatingSummary, FeedbackError> {
        let rates = self.store.rates_for_product(product).await?;
        let summary = RatingSummary::from_rates(rates);
        self.store.save_summary(product, summary).await?;

        tracing::debug!(
            %product,
            average = %summary.average,
            count = summary.count,
            "rating aggregate updated"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use blended_core::ProductCategory;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    /// Feedback store backed by in-process maps.
    #[derive(Default)]
    struct MemoryFeedbackStore {
        inner: Mutex<MemoryState>,
    }

    #[derive(Default)]
    struct MemoryState {
        summaries: HashMap<ProductId, RatingSummary>,
        feedback: Vec<Feedback>,
        next_id: i32,
    }

    impl MemoryFeedbackStore {
        fn with_products(ids: &[i32]) -> Self {
            let store = Self::default();
            {
                let mut state = store.inner.lock().unwrap();
                for &id in ids {
                    state.summaries.insert(ProductId::new(id), RatingSummary::default());
                }
            }
            store
        }

        fn summary(&self, id: i32) -> RatingSummary {
            self.inner.lock().unwrap().summaries[&ProductId::new(id)]
        }
    }

    impl FeedbackStore for MemoryFeedbackStore {
        async fn insert(&self, input: &NewFeedback) -> Result<Feedback, RepositoryError> {
            let mut state = self.inner.lock().unwrap();
            if !state.summaries.contains_key(&input.product_id) {
                return Err(RepositoryError::NotFound);
            }
            state.next_id += 1;
            let feedback = Feedback {
                id: FeedbackId::new(state.next_id),
                author: input.author.clone(),
                rate: input.rate,
                comment: input.comment.clone(),
                product_id: input.product_id,
                category: input.category,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            state.feedback.push(feedback.clone());
            Ok(feedback)
        }

        async fn delete(&self, id: FeedbackId) -> Result<Option<ProductId>, RepositoryError> {
            let mut state = self.inner.lock().unwrap();
            let Some(pos) = state.feedback.iter().position(|f| f.id == id) else {
                return Ok(None);
            };
            Ok(Some(state.feedback.remove(pos).product_id))
        }

        async fn rates_for_product(
            &self,
            product: ProductId,
        ) -> Result<Vec<Rate>, RepositoryError> {
            let state = self.inner.lock().unwrap();
            Ok(state
                .feedback
                .iter()
                .filter(|f| f.product_id == product)
                .map(|f| f.rate)
                .collect())
        }

        async fn save_summary(
            &self,
            product: ProductId,
            summary: RatingSummary,
        ) -> Result<(), RepositoryError> {
            self.inner.lock().unwrap().summaries.insert(product, summary);
            Ok(())
        }
    }

    fn feedback(product: i32, rate: i64) -> NewFeedback {
        NewFeedback {
            author: "Mariia".to_owned(),
            rate: Rate::new(rate).unwrap(),
            comment: "Works as described".to_owned(),
            product_id: ProductId::new(product),
            category: ProductCategory::Other,
        }
    }

    #[tokio::test]
    async fn test_add_then_delete_recomputes() {
        let service = RatingService::new(MemoryFeedbackStore::with_products(&[1]));

        let mut ids = Vec::new();
        for rate in [5, 4, 3] {
            let (created, _) = service.add_feedback(&feedback(1, rate)).await.unwrap();
            ids.push(created.id);
        }
        let summary = service.store.summary(1);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Decimal::new(40, 1));

        let (product, summary) = service.remove_feedback(ids[2]).await.unwrap();
        assert_eq!(product, ProductId::new(1));
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average.to_string(), "4.50");
        assert_eq!(service.store.summary(1), summary);
    }

    #[tokio::test]
    async fn test_deleting_last_feedback_resets_aggregate() {
        let service = RatingService::new(MemoryFeedbackStore::with_products(&[1]));
        let (created, summary) = service.add_feedback(&feedback(1, 2)).await.unwrap();
        assert_eq!(summary.count, 1);

        let (_, summary) = service.remove_feedback(created.id).await.unwrap();
        assert_eq!(summary, RatingSummary::default());
        assert_eq!(service.store.summary(1).average, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_aggregates_are_per_product() {
        let service = RatingService::new(MemoryFeedbackStore::with_products(&[1, 2]));
        service.add_feedback(&feedback(1, 5)).await.unwrap();
        service.add_feedback(&feedback(2, 1)).await.unwrap();
        service.add_feedback(&feedback(2, 2)).await.unwrap();

        assert_eq!(service.store.summary(1).average.to_string(), "5.00");
        assert_eq!(service.store.summary(2).average.to_string(), "1.50");
        assert_eq!(service.store.summary(2).count, 2);
    }

    #[tokio::test]
    async fn test_unknown_product_and_feedback() {
        let service = RatingService::new(MemoryFeedbackStore::with_products(&[1]));
        assert!(matches!(
            service.add_feedback(&feedback(9, 5)).await,
            Err(FeedbackError::ProductNotFound)
        ));
        assert!(matches!(
            service.remove_feedback(FeedbackId::new(42)).await,
            Err(FeedbackError::FeedbackNotFound)
        ));
    }
}
