//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use blended_core::{ProductCategory, ProductId, RatingSummary, UserId};

use super::{bounded_amount, optional_text, required_text};

/// A product with its cached rating aggregate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category: ProductCategory,
    pub description: Option<String>,
    pub image: Option<String>,
    /// User who created the product; `None` once that account is deleted.
    #[serde(rename = "owner")]
    pub owner_id: Option<UserId>,
    #[serde(flatten)]
    pub rating: RatingSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: ProductCategory,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewProduct {
    /// Trim text fields and check name and price.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message for a blank name or a price out of range.
    pub fn validated(self) -> Result<Self, String> {
        Ok(Self {
            name: required_text("name", &self.name, 1)?,
            price: validate_price(self.price)?,
            category: self.category,
            description: optional_text(self.description),
            image: optional_text(self.image),
        })
    }
}

/// Partial product update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<ProductCategory>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl ProductUpdate {
    /// Trim and check the provided fields, requiring at least one.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message for an empty update or an invalid field.
    pub fn validated(self) -> Result<Self, String> {
        if self.name.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.image.is_none()
        {
            return Err("at least one field must be provided".to_owned());
        }
        Ok(Self {
            name: self
                .name
                .map(|name| required_text("name", &name, 1))
                .transpose()?,
            price: self.price.map(validate_price).transpose()?,
            category: self.category,
            description: self.description.map(|s| s.trim().to_owned()),
            image: self.image.map(|s| s.trim().to_owned()),
        })
    }
}

/// Query filter for product listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
}

fn validate_price(price: Decimal) -> Result<Decimal, String> {
    if price < Decimal::ZERO {
        return Err("'price' must not be negative".to_owned());
    }
    bounded_amount("price", price)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_upper_bound() {
        assert!(validate_price(Decimal::new(999_999_999_999, 2)).is_ok());
        assert_eq!(
            validate_price(Decimal::new(10_000_000_000, 0)),
            Err("'price' is too large".to_owned())
        );
    }

    #[test]
    fn test_new_product_defaults_category() {
        let input: NewProduct =
            serde_json::from_str(r#"{"name":"Kettle","price":"24.99"}"#).unwrap();
        let input = input.validated().unwrap();
        assert_eq!(input.category, ProductCategory::Other);
        assert_eq!(input.price.to_string(), "24.99");
    }

    #[test]
    fn test_new_product_rejects_negative_price() {
        let input: NewProduct =
            serde_json::from_str(r#"{"name":"Kettle","price":"-1"}"#).unwrap();
        assert_eq!(
            input.validated().unwrap_err(),
            "'price' must not be negative"
        );
    }

    #[test]
    fn test_new_product_rejects_unknown_category() {
        let result = serde_json::from_str::<NewProduct>(
            r#"{"name":"Kettle","price":"1","category":"Garden"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_product_update_validation() {
        assert!(ProductUpdate::default().validated().is_err());
        let update = ProductUpdate {
            price: Some(Decimal::new(1999, 3)),
            ..ProductUpdate::default()
        };
        assert_eq!(update.validated().unwrap().price, Some(Decimal::new(200, 2)));
    }

    #[test]
    fn test_product_serializes_flat_rating() {
        let product = Product {
            id: ProductId::new(7),
            name: "Kettle".to_owned(),
            price: Decimal::new(2499, 2),
            category: ProductCategory::Electronics,
            description: None,
            image: None,
            owner_id: Some(UserId::new(3)),
            rating: RatingSummary::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["owner"], 3);
        assert_eq!(json["price"], "24.99");
        assert_eq!(json["category"], "Electronics");
        assert_eq!(json["feedbackCount"], 0);
        assert!(json.get("averageRate").is_some());
    }
}
