//! Order repository for database operations.
//!
//! The payment confirmation path relies on [`OrderRepository::confirm_pending`]
//! being a single conditional `UPDATE ... RETURNING` statement: two concurrent
//! confirmation calls for the same order can never both match the
//! `payment_status = 'pending'` predicate, so at most one caller wins the
//! transition. There is no application-level lock and no secondary
//! arbitration.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use marigold_core::{OrderId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

/// Raw row shape for `storefront.orders`.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_id: i32,
    provider_order_id: String,
    provider_payment_id: Option<String>,
    provider_signature: Option<String>,
    payment_status: String,
    order_status: String,
    paid_at: Option<DateTime<Utc>>,
    tracking_number: Option<String>,
    carrier: Option<String>,
    items: Json<Vec<OrderItem>>,
    subtotal: Decimal,
    discount: Decimal,
    shipping: Decimal,
    tax: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_status = row.payment_status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment status in database: {e}"))
        })?;
        let order_status = row.order_status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            user_id: UserId::new(row.user_id),
            provider_order_id: row.provider_order_id,
            provider_payment_id: row.provider_payment_id,
            provider_signature: row.provider_signature,
            payment_status,
            paid_at: row.paid_at,
            order_status,
            tracking_number: row.tracking_number,
            carrier: row.carrier,
            items: row.items.0,
            subtotal: row.subtotal,
            discount: row.discount,
            shipping: row.shipping,
            tax: row.tax,
            total: row.total,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, provider_order_id, provider_payment_id, \
     provider_signature, payment_status, order_status, paid_at, tracking_number, carrier, \
     items, subtotal, discount, shipping, tax, total, created_at, updated_at";

/// The minimal view of an order returned by a winning confirmation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConfirmedOrder {
    pub id: OrderId,
    pub order_number: String,
    pub total: Decimal,
}

/// Input for creating an order at checkout submission.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub provider_order_id: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Atomically transition an order from `pending` to `completed`/`confirmed`.
    ///
    /// Matches on `(provider_order_id, user_id, payment_status = 'pending')`
    /// and records the provider payment reference, signature, and paid
    /// timestamp in the same statement. Returns `None` when no pending order
    /// matched - either the order does not exist or another call already won
    /// the transition; the caller distinguishes the two by re-reading.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn confirm_pending(
        &self,
        provider_order_id: &str,
        user_id: UserId,
        provider_payment_id: &str,
        provider_signature: &str,
    ) -> Result<Option<ConfirmedOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, ConfirmedOrder>(
            r"
            UPDATE storefront.orders
            SET payment_status = 'completed',
                order_status = 'confirmed',
                provider_payment_id = $3,
                provider_signature = $4,
                paid_at = now(),
                updated_at = now()
            WHERE provider_order_id = $1
              AND user_id = $2
              AND payment_status = 'pending'
            RETURNING id, order_number, total
            ",
        )
        .bind(provider_order_id)
        .bind(user_id)
        .bind(provider_payment_id)
        .bind(provider_signature)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Mark a pending order as failed/cancelled (explicit failure path).
    ///
    /// Conditional on `payment_status = 'pending'` so a completed order can
    /// never be clobbered by a late failure callback.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_failed(
        &self,
        provider_order_id: &str,
        user_id: UserId,
    ) -> Result<Option<(OrderId, String)>, RepositoryError> {
        let row: Option<(OrderId, String)> = sqlx::query_as(
            r"
            UPDATE storefront.orders
            SET payment_status = 'failed',
                order_status = 'cancelled',
                updated_at = now()
            WHERE provider_order_id = $1
              AND user_id = $2
              AND payment_status = 'pending'
            RETURNING id, order_number
            ",
        )
        .bind(provider_order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Get an order by its provider order reference, without a status
    /// condition. Used to classify a failed conditional update as either an
    /// idempotent replay (already completed) or a missing order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is invalid.
    pub async fn find_by_provider_order_id(
        &self,
        provider_order_id: &str,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.orders \
             WHERE provider_order_id = $1 AND user_id = $2"
        ))
        .bind(provider_order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Get an order by its externally-visible order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is invalid.
    pub async fn find_by_number(
        &self,
        order_number: &str,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.orders \
             WHERE order_number = $1 AND user_id = $2"
        ))
        .bind(order_number)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.orders \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Create a new pending order at checkout submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the provider order reference
    /// already exists for this user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        new_order: NewOrder,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO storefront.orders \
             (order_number, user_id, provider_order_id, items, subtotal, discount, shipping, tax, total) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&new_order.order_number)
        .bind(user_id)
        .bind(&new_order.provider_order_id)
        .bind(Json(&new_order.items))
        .bind(new_order.subtotal)
        .bind(new_order.discount)
        .bind(new_order.shipping)
        .bind(new_order.tax)
        .bind(new_order.total)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "order already exists for this provider reference".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        Order::try_from(row)
    }
}
