//! Catalog repository: read-heavy product and collection queries.
//!
//! Every public read here is fronted by the response cache; these queries are
//! the `compute()` side of the read-through contract and stay idempotent.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use marigold_core::{CollectionId, ProductId};

use super::RepositoryError;
use crate::models::{Collection, Product};

/// Raw row shape for `storefront.products`.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    slug: String,
    name: String,
    description: String,
    price: Decimal,
    image_url: Option<String>,
    collection_ids: Vec<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            slug: row.slug,
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            collection_ids: row.collection_ids.into_iter().map(CollectionId::new).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Raw row shape for `storefront.collections`.
#[derive(sqlx::FromRow)]
struct CollectionRow {
    id: i32,
    slug: String,
    name: String,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Self {
            id: CollectionId::new(row.id),
            slug: row.slug,
            name: row.name,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, slug, name, description, price, image_url, collection_ids, created_at, updated_at";

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// List products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products \
             ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Randomly sample products for rotating listings (homepage featured).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sample_products(&self, count: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products ORDER BY random() LIMIT $1"
        ))
        .bind(count)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get products by ID, preserving no particular order.
    ///
    /// Used to join cart lines against current catalog data for the checkout
    /// summary (order snapshots are taken from this at submission time).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products WHERE id = ANY($1)"
        ))
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// List products belonging to a collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products_in_collection(
        &self,
        collection_id: CollectionId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products \
             WHERE $1 = ANY(collection_ids) ORDER BY created_at DESC"
        ))
        .bind(collection_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// List all collections.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_collections(&self) -> Result<Vec<Collection>, RepositoryError> {
        let rows = sqlx::query_as::<_, CollectionRow>(
            "SELECT id, slug, name FROM storefront.collections ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Collection::from).collect())
    }

    /// Get a collection by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_collection_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Collection>, RepositoryError> {
        let row = sqlx::query_as::<_, CollectionRow>(
            "SELECT id, slug, name FROM storefront.collections WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Collection::from))
    }

    /// Distinct collection IDs referenced by any product's foreign-key array.
    ///
    /// Feeds the trending-collections derivation on the homepage.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn trending_collection_ids(&self) -> Result<Vec<CollectionId>, RepositoryError> {
        let rows: Vec<(i32,)> = sqlx::query_as(
            "SELECT DISTINCT unnest(collection_ids) AS collection_id \
             FROM storefront.products ORDER BY collection_id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| CollectionId::new(id)).collect())
    }

    /// Get collections by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_collections_by_ids(
        &self,
        ids: &[CollectionId],
    ) -> Result<Vec<Collection>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let rows = sqlx::query_as::<_, CollectionRow>(
            "SELECT id, slug, name FROM storefront.collections WHERE id = ANY($1) ORDER BY name",
        )
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Collection::from).collect())
    }

}
