//! Order status updates.
//!
//! Statuses form a flat set: any member may replace any other. An update
//! addresses an order by its number together with one of the products it
//! contains.

use thiserror::Error;
use tracing::instrument;

use blended_core::{InvalidVariant, OrderNumber, OrderStatus, ProductId};

use crate::db::RepositoryError;
use crate::models::Order;

/// Storage needed to change an order's status.
#[allow(async_fn_in_trait)]
pub trait OrderStore: Send + Sync {
    /// Set the status of order `order_num` if it has a line for `product`.
    ///
    /// Returns `None` when no such order/line pair exists.
    async fn set_status(
        &self,
        product: ProductId,
        order_num: OrderNumber,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;
}

/// Errors from order status updates.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Status outside the allowed set.
    #[error(transparent)]
    InvalidStatus(#[from] InvalidVariant),

    /// No order with this number contains the product.
    #[error("Order not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validate `status` and apply it to the matching order.
///
/// The status is checked before storage is touched.
///
/// # Errors
///
/// Returns `OrderError::InvalidStatus` for a status outside the allowed set.
/// Returns `OrderError::NotFound` if no order `order_num` has a line for `product`.
/// Returns `OrderError::Repository` if the update fails.
#[instrument(skip(store))]
pub async fn update_status<S: OrderStore>(
    store: &S,
    product: ProductId,
    order_num: OrderNumber,
    status: &str,
) -> Result<Order, OrderError> {
    let status: OrderStatus = status.parse()?;

    let order = store
        .set_status(product, order_num, status)
        .await?
        .ok_or(OrderError::NotFound)?;

    tracing::info!(%status, "order status updated");
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use blended_core::OrderId;

    use super::*;
    use crate::models::OrderLine;

    struct MemoryOrderStore {
        orders: Mutex<Vec<Order>>,
        calls: Mutex<usize>,
    }

    impl MemoryOrderStore {
        fn with_order(order_num: i32, products: &[i32]) -> Self {
            let order = Order {
                id: OrderId::new(1),
                order_num: OrderNumber::new(order_num),
                user_id: None,
                lines: products
                    .iter()
                    .map(|&id| OrderLine {
                        product_id: ProductId::new(id),
                        quantity: 1,
                    })
                    .collect(),
                sum: Decimal::new(100, 0),
                user_name: "Andrii".to_owned(),
                user_last_name: "Shevchenko".to_owned(),
                user_phone: "+380631234567".to_owned(),
                city: "Odesa".to_owned(),
                branchnum_np: "3".to_owned(),
                comment: String::new(),
                status: OrderStatus::Pending,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            Self {
                orders: Mutex::new(vec![order]),
                calls: Mutex::new(0),
            }
        }
    }

    impl OrderStore for MemoryOrderStore {
        async fn set_status(
            &self,
            product: ProductId,
            order_num: OrderNumber,
            status: OrderStatus,
        ) -> Result<Option<Order>, RepositoryError> {
            *self.calls.lock().unwrap() += 1;
            let mut orders = self.orders.lock().unwrap();
            let found = orders.iter_mut().find(|o| {
                o.order_num == order_num && o.lines.iter().any(|l| l.product_id == product)
            });
            Ok(found.map(|order| {
                order.status = status;
                order.clone()
            }))
        }
    }

    #[tokio::test]
    async fn test_any_status_may_follow_any_other() {
        let store = MemoryOrderStore::with_order(1001, &[7, 8]);
        for next in ["delivered", "pending", "cancelled", "processing", "shipped"] {
            let order = update_status(&store, ProductId::new(8), OrderNumber::new(1001), next)
                .await
                .unwrap();
            assert_eq!(order.status.as_str(), next);
        }
    }

    #[tokio::test]
    async fn test_invalid_status_rejected_before_storage() {
        let store = MemoryOrderStore::with_order(1001, &[7]);
        let err = update_status(&store, ProductId::new(7), OrderNumber::new(1001), "lost")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidStatus(_)));
        assert_eq!(*store.calls.lock().unwrap(), 0);
        assert_eq!(store.orders.lock().unwrap()[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_order_or_line_not_found() {
        let store = MemoryOrderStore::with_order(1001, &[7]);
        let err = update_status(&store, ProductId::new(8), OrderNumber::new(1001), "shipped")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound));

        let err = update_status(&store, ProductId::new(7), OrderNumber::new(9999), "shipped")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound));
    }
}
