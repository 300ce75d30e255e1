//! Cart domain model.
//!
//! One cart per user, created lazily on first write. The item list is
//! cleared best-effort by the payment side-effect coordinator after a
//! successful confirmation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marigold_core::{CartId, ProductId, UserId};

/// A cart line: a product reference plus quantity and selected variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub variant: Option<String>,
}

/// A user's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
