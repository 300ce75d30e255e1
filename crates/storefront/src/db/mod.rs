//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `marigold_storefront`
//!
//! ## Tables
//!
//! - `users` - Account identities (session issuance is external)
//! - `products`, `collections` - Catalog read model
//! - `carts` - One cart per user, items as a jsonb document
//! - `orders` - One row per purchase attempt; the payment confirmation
//!   transition is a single atomic conditional update against this table
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p marigold-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod carts;
pub mod catalog;
pub mod orders;
pub mod users;

pub use carts::CartRepository;
pub use catalog::CatalogRepository;
pub use orders::{ConfirmedOrder, NewOrder, OrderRepository};
pub use users::UserRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique-constraint conflict (e.g. duplicate provider order reference).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored value failed validation on read.
    #[error("Data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
