//! Catalog read models.
//!
//! Products and collections are read-heavy and served through the response
//! cache; mutations happen through catalog imports (CLI seed) rather than
//! this service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marigold_core::{CollectionId, ProductId};

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    /// Collections this product belongs to (foreign-key array).
    pub collection_ids: Vec<CollectionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub slug: String,
    pub name: String,
}
