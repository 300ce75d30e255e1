//! User repository for database operations.
//!
//! Identity verification is an external collaborator; this repository only
//! resolves the local user row backing sessions, carts, and orders.

use sqlx::PgPool;

use marigold_core::UserId;

use super::RepositoryError;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find or create a user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_email(&self, email: &str) -> Result<UserId, RepositoryError> {
        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO storefront.users (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id
            ",
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;

        Ok(UserId::new(id))
    }

    /// Check whether a user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM storefront.users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.is_some())
    }
}
