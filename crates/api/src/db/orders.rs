//! Order repository.
//!
//! Order numbers come from the `order_num` row of `shop.counter`, which is
//! incremented inside the order's insert transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use blended_core::{OrderId, OrderNumber, OrderStatus, PageRequest, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{NewOrder, Order, OrderLine};
use crate::services::orders::OrderStore;

const ORDER_COLUMNS: &str = "id, order_num, user_id, sum, user_name, user_last_name, user_phone, \
                             city, branchnum_np, comment, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_num: i32,
    user_id: Option<i32>,
    sum: Decimal,
    user_name: String,
    user_last_name: String,
    user_phone: String,
    city: String,
    branchnum_np: String,
    comment: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: OrderId::new(self.id),
            order_num: OrderNumber::new(self.order_num),
            user_id: self.user_id.map(UserId::new),
            lines,
            sum: self.sum,
            user_name: self.user_name,
            user_last_name: self.user_last_name,
            user_phone: self.user_phone,
            city: self.city,
            branchnum_np: self.branchnum_np,
            comment: self.comment,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: i32,
    product_id: i32,
    quantity: i32,
}

/// Repository for orders and their lines.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order, assigning the next order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn create(
        &self,
        owner: Option<UserId>,
        input: &NewOrder,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_num: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.counter (name, seq) VALUES ('order_num', 1)
            ON CONFLICT (name) DO UPDATE SET seq = shop.counter.seq + 1
            RETURNING seq
            ",
        )
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO shop."order"
                (order_num, user_id, sum, user_name, user_last_name, user_phone,
                 city, branchnum_np, comment, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_num)
        .bind(owner)
        .bind(input.sum)
        .bind(&input.user_name)
        .bind(&input.user_last_name)
        .bind(&input.user_phone)
        .bind(&input.city)
        .bind(&input.branchnum_np)
        .bind(input.comment.as_deref().unwrap_or_default())
        .bind(input.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_write)?;

        let positions: Vec<i32> = (1..).take(input.lines.len()).collect();
        let products: Vec<i32> = input.lines.iter().map(|l| l.product_id.as_i32()).collect();
        let quantities: Vec<i32> = input.lines.iter().map(|l| l.quantity).collect();

        sqlx::query(
            r"
            INSERT INTO shop.order_line (order_id, position, product_id, quantity)
            SELECT $1, t.position, t.product_id, t.quantity
            FROM UNNEST($2::int[], $3::int[], $4::int[]) AS t(position, product_id, quantity)
            ",
        )
        .bind(row.id)
        .bind(&positions)
        .bind(&products)
        .bind(&quantities)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into_order(input.lines.clone()))
    }

    /// All orders owned by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM shop."order"
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    /// One page of all orders, newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self, page: PageRequest) -> Result<(Vec<Order>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM shop."order"
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM shop."order""#)
            .fetch_one(self.pool)
            .await?;

        Ok((self.attach_lines(rows).await?, total))
    }

    /// Load the lines of each order row, keeping line order.
    async fn attach_lines(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let line_rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT order_id, product_id, quantity
            FROM shop.order_line
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut lines: HashMap<i32, Vec<OrderLine>> = HashMap::new();
        for line in line_rows {
            lines.entry(line.order_id).or_default().push(OrderLine {
                product_id: ProductId::new(line.product_id),
                quantity: line.quantity,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let order_lines = lines.remove(&row.id).unwrap_or_default();
                row.into_order(order_lines)
            })
            .collect())
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn set_status(
        &self,
        product: ProductId,
        order_num: OrderNumber,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE shop."order" o
            SET status = $1, updated_at = NOW()
            WHERE o.order_num = $2
              AND EXISTS (
                  SELECT 1 FROM shop.order_line l
                  WHERE l.order_id = o.id AND l.product_id = $3
              )
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(order_num)
        .bind(product)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self.attach_lines(vec![row]).await?.pop())
    }
}
