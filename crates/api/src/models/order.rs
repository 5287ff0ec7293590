//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use blended_core::{OrderId, OrderNumber, OrderStatus, ProductId, UserId};

use super::{bounded_amount, optional_text, required_text};

/// One `(product, quantity)` pair inside an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    #[serde(rename = "amount")]
    pub quantity: i32,
}

/// A placed order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_num: OrderNumber,
    /// Account whose phone matched `user_phone` when the order was placed.
    #[serde(rename = "owner")]
    pub user_id: Option<UserId>,
    #[serde(rename = "products")]
    pub lines: Vec<OrderLine>,
    pub sum: Decimal,
    pub user_name: String,
    pub user_last_name: String,
    pub user_phone: String,
    pub city: String,
    pub branchnum_np: String,
    pub comment: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for placing an order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(rename = "products")]
    pub lines: Vec<OrderLine>,
    pub sum: Decimal,
    pub user_name: String,
    pub user_last_name: String,
    #[serde(default)]
    pub user_phone: String,
    pub city: String,
    pub branchnum_np: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
}

impl NewOrder {
    /// Check lines, sum and the delivery fields.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message for the first invalid field.
    pub fn validated(self) -> Result<Self, String> {
        let user_phone = self.user_phone.trim().to_owned();
        if user_phone.is_empty() {
            return Err("Phone is required".to_owned());
        }
        if self.lines.is_empty() {
            return Err("'products' must contain at least one item".to_owned());
        }
        if self.lines.iter().any(|line| line.quantity < 1) {
            return Err("'amount' must be at least 1".to_owned());
        }
        if self.sum < Decimal::ONE {
            return Err("'sum' must be at least 1".to_owned());
        }
        let sum = bounded_amount("sum", self.sum)?;

        Ok(Self {
            lines: self.lines,
            sum,
            user_name: required_text("userName", &self.user_name, 1)?,
            user_last_name: required_text("userLastName", &self.user_last_name, 1)?,
            user_phone,
            city: required_text("city", &self.city, 1)?,
            branchnum_np: required_text("branchnumNp", &self.branchnum_np, 1)?,
            comment: optional_text(self.comment),
            status: self.status,
        })
    }
}
