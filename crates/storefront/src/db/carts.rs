//! Cart repository for database operations.
//!
//! Carts have no concurrency guarantee beyond last-write-wins: the
//! post-payment clear is a one-directional reset, not a merge.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use marigold_core::{CartId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartItem};

/// Raw row shape for `storefront.carts`.
#[derive(sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: i32,
    items: Json<Vec<CartItem>>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: UserId::new(row.user_id),
            items: row.items.0,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart, if one has been created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, items, updated_at FROM storefront.carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    /// Replace the cart's item list, creating the cart lazily if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn replace_items(
        &self,
        user_id: UserId,
        items: &[CartItem],
    ) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO storefront.carts (user_id, items, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id)
            DO UPDATE SET items = EXCLUDED.items, updated_at = now()
            RETURNING id, user_id, items, updated_at
            ",
        )
        .bind(user_id)
        .bind(Json(items))
        .fetch_one(self.pool)
        .await?;

        Ok(Cart::from(row))
    }

    /// Clear the cart's item list.
    ///
    /// A no-op when the user has no cart row yet; an empty cart and a missing
    /// cart are equivalent to readers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE storefront.carts SET items = '[]'::jsonb, updated_at = now() \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
