//! Order domain model.
//!
//! Orders are created at checkout submission with `payment_status = pending`
//! and are mutated only by the payment confirmation transition (happy path)
//! or the explicit failure path. They are never deleted, only superseded by
//! status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marigold_core::{OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

/// A denormalized snapshot of a purchased line item.
///
/// Captured at purchase time; never re-derived from the live catalog, so a
/// later price or name change cannot rewrite an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image_url: Option<String>,
    pub variant: Option<String>,
}

/// An order: one row per purchase attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Externally-visible order number, e.g. `ORD-1A2B3C4D`.
    pub order_number: String,
    pub user_id: UserId,

    /// Payment provider's order reference (created before checkout submit).
    pub provider_order_id: String,
    pub provider_payment_id: Option<String>,
    /// Stored for audit; never exposed in API responses.
    #[serde(skip_serializing, default)]
    pub provider_signature: Option<String>,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,

    pub order_status: OrderStatus,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,

    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Check the payment/fulfillment consistency invariant:
    /// `payment_status == completed` implies `paid_at` is set and the order
    /// status is a post-payment status.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.payment_status != PaymentStatus::Completed
            || (self.paid_at.is_some() && self.order_status.is_post_payment())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(payment_status: PaymentStatus, order_status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(1),
            order_number: "ORD-TEST0001".to_string(),
            user_id: UserId::new(1),
            provider_order_id: "pay_order_1".to_string(),
            provider_payment_id: None,
            provider_signature: None,
            payment_status,
            paid_at: matches!(payment_status, PaymentStatus::Completed).then(Utc::now),
            order_status,
            tracking_number: None,
            carrier: None,
            items: vec![],
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pending_order_is_consistent() {
        assert!(order(PaymentStatus::Pending, OrderStatus::Pending).is_consistent());
    }

    #[test]
    fn test_completed_order_requires_post_payment_status() {
        assert!(order(PaymentStatus::Completed, OrderStatus::Confirmed).is_consistent());
        assert!(!order(PaymentStatus::Completed, OrderStatus::Pending).is_consistent());
    }

    #[test]
    fn test_order_item_snapshot_roundtrip() {
        let item = OrderItem {
            product_id: ProductId::new(3),
            name: "Ceramic Mug".to_string(),
            unit_price: Decimal::new(1299, 2),
            quantity: 2,
            image_url: None,
            variant: Some("blue".to_string()),
        };
        let json = serde_json::to_string(&item).unwrap();
        let back: OrderItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
