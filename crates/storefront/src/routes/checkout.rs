//! Checkout route handlers.
//!
//! The summary is a per-user cached read joining cart lines against current
//! catalog data. Submission snapshots those lines into a pending order: the
//! snapshot is denormalized at this moment and never re-derived, so later
//! catalog edits cannot rewrite an order.

use std::collections::HashMap;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use marigold_core::{OrderId, ProductId, UserId};

use crate::cache::{FreshnessPolicy, keys};
use crate::db::{CartRepository, CatalogRepository, NewOrder, OrderRepository};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::{OrderItem, Product};
use crate::state::AppState;

use super::cached_json;

/// Orders at or above this subtotal ship free.
fn free_shipping_threshold() -> Decimal {
    Decimal::new(49900, 2)
}

/// Flat shipping fee below the free-shipping threshold.
fn flat_shipping_fee() -> Decimal {
    Decimal::new(4900, 2)
}

/// GST rate applied to the subtotal.
fn tax_rate() -> Decimal {
    Decimal::new(18, 2)
}

/// A checkout line: an order-item snapshot plus its line total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image_url: Option<String>,
    pub variant: Option<String>,
    pub line_total: Decimal,
}

/// The checkout summary returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub lines: Vec<CheckoutLine>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Financial totals derived from item snapshots.
struct Totals {
    subtotal: Decimal,
    discount: Decimal,
    shipping: Decimal,
    tax: Decimal,
    total: Decimal,
}

fn compute_totals(items: &[OrderItem]) -> Totals {
    let subtotal: Decimal = items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum();

    let discount = Decimal::ZERO;

    let shipping = if subtotal.is_zero() || subtotal >= free_shipping_threshold() {
        Decimal::ZERO
    } else {
        flat_shipping_fee()
    };

    let tax = (subtotal * tax_rate()).round_dp(2);
    let total = subtotal - discount + shipping + tax;

    Totals {
        subtotal,
        discount,
        shipping,
        tax,
        total,
    }
}

/// Generate an externally-visible order number.
fn generate_order_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    let short: String = id.chars().take(8).collect();
    format!("ORD-{}", short.to_uppercase())
}

/// Snapshot the user's cart lines against current catalog data.
///
/// Lines whose product has disappeared from the catalog are dropped.
async fn snapshot_cart(state: &AppState, user_id: UserId) -> Result<Vec<OrderItem>, AppError> {
    let Some(cart) = CartRepository::new(state.pool()).get(user_id).await? else {
        return Ok(Vec::new());
    };

    let ids: Vec<ProductId> = cart.items.iter().map(|line| line.product_id).collect();
    let products = CatalogRepository::new(state.pool())
        .get_products_by_ids(&ids)
        .await?;
    let by_id: HashMap<ProductId, Product> =
        products.into_iter().map(|p| (p.id, p)).collect();

    Ok(cart
        .items
        .iter()
        .filter_map(|line| {
            by_id.get(&line.product_id).map(|product| OrderItem {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity: line.quantity,
                image_url: product.image_url.clone(),
                variant: line.variant.clone(),
            })
        })
        .collect())
}

fn summary_from_items(items: Vec<OrderItem>) -> CheckoutSummary {
    let totals = compute_totals(&items);

    let lines = items
        .into_iter()
        .map(|item| {
            let line_total = item.unit_price * Decimal::from(item.quantity);
            CheckoutLine {
                product_id: item.product_id,
                name: item.name,
                unit_price: item.unit_price,
                quantity: item.quantity,
                image_url: item.image_url,
                variant: item.variant,
                line_total,
            }
        })
        .collect();

    CheckoutSummary {
        lines,
        subtotal: totals.subtotal,
        discount: totals.discount,
        shipping: totals.shipping,
        tax: totals.tax,
        total: totals.total,
    }
}

/// Show the current user's checkout summary.
#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn summary(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Response, AppError> {
    let policy = FreshnessPolicy::PER_USER;
    let key = keys::checkout(user_id);

    let (summary, status): (CheckoutSummary, _) = state
        .cache()
        .read_through(&key, policy, || async {
            let items = snapshot_cart(&state, user_id).await?;
            Ok::<_, AppError>(summary_from_items(items))
        })
        .await?;

    Ok(cached_json(policy, status, summary).into_response())
}

/// Submit-checkout request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCheckoutRequest {
    /// The payment provider's order reference created for this checkout.
    pub provider_order_ref: String,
}

/// Submit-checkout response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCheckoutResponse {
    pub order_id: OrderId,
    pub order_number: String,
    pub total: Decimal,
}

/// Submit the checkout: snapshot the cart into a pending order.
///
/// The cart itself is left untouched; it is cleared only once the payment
/// confirmation wins its transition.
#[instrument(skip(state, request), fields(user_id = %user_id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(request): Json<SubmitCheckoutRequest>,
) -> Result<Json<SubmitCheckoutResponse>, AppError> {
    if request.provider_order_ref.trim().is_empty() {
        return Err(AppError::BadRequest(
            "providerOrderRef is required".to_string(),
        ));
    }

    let items = snapshot_cart(&state, user_id).await?;
    if items.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let totals = compute_totals(&items);
    let order = OrderRepository::new(state.pool())
        .create(
            user_id,
            NewOrder {
                order_number: generate_order_number(),
                provider_order_id: request.provider_order_ref,
                items,
                subtotal: totals.subtotal,
                discount: totals.discount,
                shipping: totals.shipping,
                tax: totals.tax,
                total: totals.total,
            },
        )
        .await?;

    info!(order_number = %order.order_number, "Checkout submitted");

    Ok(Json(SubmitCheckoutResponse {
        order_id: order.id,
        order_number: order.order_number,
        total: order.total,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(unit_price: Decimal, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: ProductId::new(1),
            name: "Ceramic Mug".to_string(),
            unit_price,
            quantity,
            image_url: None,
            variant: None,
        }
    }

    #[test]
    fn test_totals_empty_cart() {
        let totals = compute_totals(&[]);
        assert!(totals.subtotal.is_zero());
        assert!(totals.shipping.is_zero());
        assert!(totals.total.is_zero());
    }

    #[test]
    fn test_totals_below_free_shipping() {
        // 2 x 100.00 = 200.00 subtotal, below the 499.00 threshold
        let totals = compute_totals(&[item(Decimal::new(10000, 2), 2)]);
        assert_eq!(totals.subtotal, Decimal::new(20000, 2));
        assert_eq!(totals.shipping, Decimal::new(4900, 2));
        // 18% GST on 200.00 = 36.00; total = 200 + 49 + 36
        assert_eq!(totals.tax, Decimal::new(3600, 2));
        assert_eq!(totals.total, Decimal::new(28500, 2));
    }

    #[test]
    fn test_totals_free_shipping_at_threshold() {
        let totals = compute_totals(&[item(Decimal::new(49900, 2), 1)]);
        assert!(totals.shipping.is_zero());
    }

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        assert!(number.starts_with("ORD-"));
        assert_eq!(number.len(), 12);
        assert_ne!(number, generate_order_number());
    }

    #[test]
    fn test_summary_line_totals() {
        let summary = summary_from_items(vec![item(Decimal::new(1299, 2), 3)]);
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(
            summary.lines.first().unwrap().line_total,
            Decimal::new(3897, 2)
        );
    }
}
