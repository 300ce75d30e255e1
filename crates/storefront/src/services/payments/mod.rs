//! Payment confirmation: the storefront's most important write.
//!
//! [`PaymentService::confirm`] moves an order from "payment pending" to
//! "paid/confirmed" exactly once, no matter how many times a client (or a
//! webhook redelivery) calls it:
//!
//! 1. Verify the provider signature - rejection changes no state.
//! 2. Issue one atomic conditional update against the store. Its find-and-
//!    modify semantics are the single source of truth for who won; there is
//!    no secondary arbitration and no application-level lock.
//! 3. The winner runs side effects (cart clear, cache invalidation,
//!    notification). Side effects are each their own failure domain: they
//!    are logged and swallowed, never allowed to roll a recorded payment
//!    back into an error response.
//! 4. A loser (or a retry) re-reads the order and maps "already completed"
//!    to an idempotent success with `already_processed = true`.

mod error;
mod verifier;

pub use error::PaymentError;
pub use verifier::{SignatureError, SignatureVerifier};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use marigold_core::{OrderId, PaymentStatus, UserId};

use crate::cache::{ResponseCache, keys};
use crate::db::{CartRepository, ConfirmedOrder, OrderRepository};
use crate::services::notifications::NotificationClient;

/// Client-supplied payment confirmation fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub provider_order_ref: String,
    pub provider_payment_ref: String,
    pub provided_signature: String,
}

/// Result of a confirmation call.
///
/// `already_processed = true` marks an idempotent replay: the transition had
/// already happened, and the caller still gets a success.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationOutcome {
    pub order_id: OrderId,
    pub order_number: String,
    pub already_processed: bool,
}

/// Orchestrates signature verification, the confirmation transition, and
/// post-transition side effects.
pub struct PaymentService<'a> {
    pool: &'a PgPool,
    verifier: &'a SignatureVerifier,
    cache: &'a ResponseCache,
    notifier: &'a NotificationClient,
}

impl<'a> PaymentService<'a> {
    /// Create a new payment service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        verifier: &'a SignatureVerifier,
        cache: &'a ResponseCache,
        notifier: &'a NotificationClient,
    ) -> Self {
        Self {
            pool,
            verifier,
            cache,
            notifier,
        }
    }

    /// Confirm a payment for the authenticated user.
    ///
    /// Duplicate calls and concurrent calls are both safe: the conditional
    /// update lets exactly one caller perform the transition, and everyone
    /// else observes `already_processed = true`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::MissingData` / `InvalidSignature` without any
    /// state change, `OrderNotFound` when no matching order exists, and
    /// `Repository` when the store fails mid-transition.
    #[instrument(
        skip(self, request),
        fields(user_id = %user_id, provider_order_ref = %request.provider_order_ref)
    )]
    pub async fn confirm(
        &self,
        user_id: UserId,
        request: &ConfirmPaymentRequest,
    ) -> Result<ConfirmationOutcome, PaymentError> {
        if let Err(e) = self.verifier.verify(
            &request.provider_order_ref,
            &request.provider_payment_ref,
            &request.provided_signature,
        ) {
            if e == SignatureError::Mismatch {
                warn!(
                    provider_payment_ref = %request.provider_payment_ref,
                    "Rejected payment confirmation with invalid signature"
                );
            }
            return Err(e.into());
        }

        let orders = OrderRepository::new(self.pool);

        if let Some(confirmed) = orders
            .confirm_pending(
                &request.provider_order_ref,
                user_id,
                &request.provider_payment_ref,
                &request.provided_signature,
            )
            .await?
        {
            info!(order_number = %confirmed.order_number, "Payment confirmed");
            self.run_side_effects(user_id, &confirmed).await;

            return Ok(ConfirmationOutcome {
                order_id: confirmed.id,
                order_number: confirmed.order_number,
                already_processed: false,
            });
        }

        // The conditional update matched nothing: either a duplicate
        // confirmation (common for client retries and webhook redelivery) or
        // an order that does not exist for this user.
        match orders
            .find_by_provider_order_id(&request.provider_order_ref, user_id)
            .await?
        {
            Some(order) if order.payment_status == PaymentStatus::Completed => {
                debug!(order_number = %order.order_number, "Duplicate confirmation, already processed");
                Ok(ConfirmationOutcome {
                    order_id: order.id,
                    order_number: order.order_number,
                    already_processed: true,
                })
            }
            _ => Err(PaymentError::OrderNotFound),
        }
    }

    /// Mark a pending order as failed/cancelled (explicit failure path).
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::OrderNotFound` when no pending order matches,
    /// and `Repository` when the store fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn mark_failed(
        &self,
        user_id: UserId,
        provider_order_ref: &str,
    ) -> Result<OrderId, PaymentError> {
        let (order_id, order_number) = OrderRepository::new(self.pool)
            .mark_failed(provider_order_ref, user_id)
            .await?
            .ok_or(PaymentError::OrderNotFound)?;

        // The cancelled order makes the user's cached order reads stale.
        self.cache
            .invalidate(&[keys::orders(user_id), keys::order(user_id, &order_number)])
            .await;

        info!(order_number = %order_number, "Payment marked failed");
        Ok(order_id)
    }

    /// Side effects of a winning transition, each its own failure domain.
    async fn run_side_effects(&self, user_id: UserId, order: &ConfirmedOrder) {
        // Cart clear is best-effort: the payment is already recorded and
        // must not be rolled back for a secondary side effect.
        if let Err(e) = CartRepository::new(self.pool).clear(user_id).await {
            warn!(error = %e, "Cart clear failed after payment confirmation");
        }

        // The confirmation just made these per-user reads stale. Unrelated
        // keys are untouched; distributed-tier failures self-heal at TTL.
        self.cache
            .invalidate(&[
                keys::checkout(user_id),
                keys::cart(user_id),
                keys::orders(user_id),
                keys::order(user_id, &order.order_number),
            ])
            .await;

        self.notify_confirmed(user_id, order);
    }

    /// Fire-and-forget confirmation notification.
    fn notify_confirmed(&self, user_id: UserId, order: &ConfirmedOrder) {
        let notifier = self.notifier.clone();
        let order_number = order.order_number.clone();
        let total: Decimal = order.total;

        tokio::spawn(async move {
            notifier.order_confirmed(user_id, &order_number, total).await;
        });
    }
}
