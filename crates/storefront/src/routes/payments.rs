//! Payment route handlers.
//!
//! `POST /payments/verify` is the idempotent confirmation endpoint: a valid
//! duplicate call succeeds with `alreadyProcessed: true` instead of erroring,
//! so client retries and double-clicks are safe by construction.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use marigold_core::OrderId;

use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::services::{ConfirmPaymentRequest, ConfirmationOutcome, PaymentService};
use crate::state::AppState;

/// Confirm a payment for the authenticated user.
///
/// Responses: `200` with the outcome, `400` for missing fields or a bad
/// signature, `404` when no matching order exists, `500` on store failure.
#[instrument(skip(state, request))]
pub async fn verify(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmationOutcome>, AppError> {
    let service = PaymentService::new(
        state.pool(),
        state.verifier(),
        state.cache(),
        state.notifier(),
    );

    let outcome = service.confirm(user_id, &request).await?;
    Ok(Json(outcome))
}

/// Mark-failed request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailPaymentRequest {
    pub provider_order_ref: String,
}

/// Mark-failed response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailPaymentResponse {
    pub order_id: OrderId,
}

/// Mark a pending payment as failed (explicit cancel path).
#[instrument(skip(state, request))]
pub async fn failed(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(request): Json<FailPaymentRequest>,
) -> Result<Json<FailPaymentResponse>, AppError> {
    let service = PaymentService::new(
        state.pool(),
        state.verifier(),
        state.cache(),
        state.notifier(),
    );

    let order_id = service
        .mark_failed(user_id, &request.provider_order_ref)
        .await?;

    Ok(Json(FailPaymentResponse { order_id }))
}
