//! Cart route handlers.
//!
//! The cart view is cached per user; the single mutation here demonstrates
//! the invalidation contract: it removes exactly the user's `cart:` and
//! `checkout:` keys and nothing else.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cache::{FreshnessPolicy, keys};
use crate::db::CartRepository;
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::CartItem;
use crate::state::AppState;

use super::cached_json;

/// Cart display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            item_count: 0,
        }
    }

    /// Build a view from cart items.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let item_count = items.iter().map(|i| i.quantity).sum();
        Self { items, item_count }
    }
}

/// Replace-cart request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub items: Vec<CartItem>,
}

/// Show the current user's cart.
#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Response, AppError> {
    let policy = FreshnessPolicy::PER_USER;
    let key = keys::cart(user_id);

    let (view, status): (CartView, _) = state
        .cache()
        .read_through(&key, policy, || async {
            let cart = CartRepository::new(state.pool())
                .get(user_id)
                .await
                .map_err(AppError::from)?;

            Ok::<_, AppError>(cart.map_or_else(CartView::empty, |c| CartView::from_items(c.items)))
        })
        .await?;

    Ok(cached_json(policy, status, view).into_response())
}

/// Replace the cart's item list.
#[instrument(skip(state, request), fields(user_id = %user_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>, AppError> {
    let cart = CartRepository::new(state.pool())
        .replace_items(user_id, &request.items)
        .await?;

    // This write made exactly the user's cart and checkout reads stale.
    state
        .cache()
        .invalidate(&[keys::cart(user_id), keys::checkout(user_id)])
        .await;

    Ok(Json(CartView::from_items(cart.items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marigold_core::ProductId;

    #[test]
    fn test_cart_view_counts_quantities() {
        let view = CartView::from_items(vec![
            CartItem {
                product_id: ProductId::new(1),
                quantity: 2,
                variant: None,
            },
            CartItem {
                product_id: ProductId::new(2),
                quantity: 3,
                variant: Some("large".to_string()),
            },
        ]);
        assert_eq!(view.item_count, 5);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::empty();
        assert_eq!(view.item_count, 0);
        assert!(view.items.is_empty());
    }
}
