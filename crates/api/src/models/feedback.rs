//! Product feedback domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use blended_core::{FeedbackId, ProductCategory, ProductId, Rate};

use super::required_text;

/// A feedback entry left on a product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: FeedbackId,
    pub author: String,
    pub rate: Rate,
    pub comment: String,
    #[serde(rename = "product")]
    pub product_id: ProductId,
    pub category: ProductCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for leaving feedback. `rate` is range-checked on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
    pub author: String,
    pub rate: Rate,
    pub comment: String,
    #[serde(rename = "product")]
    pub product_id: ProductId,
    #[serde(default)]
    pub category: ProductCategory,
}

impl NewFeedback {
    /// Trim author and comment and check their lengths.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message when either is shorter than 2 characters.
    pub fn validated(self) -> Result<Self, String> {
        Ok(Self {
            author: required_text("author", &self.author, 2)?,
            comment: required_text("comment", &self.comment, 2)?,
            ..self
        })
    }
}

/// Listing filter; both fields narrow the result when set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackFilter {
    pub product_id: Option<ProductId>,
    pub rate: Option<Rate>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feedback_parses_product_reference() {
        let input: NewFeedback = serde_json::from_str(
            r#"{"author":"Iryna","rate":5,"comment":"Great","product":12}"#,
        )
        .unwrap();
        assert_eq!(input.product_id, ProductId::new(12));
        assert_eq!(input.category, ProductCategory::Other);
        assert_eq!(input.rate.get(), 5);
    }

    #[test]
    fn test_new_feedback_rejects_out_of_range_rate() {
        let result = serde_json::from_str::<NewFeedback>(
            r#"{"author":"Iryna","rate":0,"comment":"Bad","product":12}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_new_feedback_short_fields() {
        let input: NewFeedback = serde_json::from_str(
            r#"{"author":" I ","rate":3,"comment":"ok","product":1}"#,
        )
        .unwrap();
        assert_eq!(
            input.validated().unwrap_err(),
            "'author' must be at least 2 characters"
        );
    }
}
