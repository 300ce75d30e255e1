//! Order route handlers.
//!
//! Per-user cached reads; the payment confirmation transition invalidates
//! these keys when it changes an order's state.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::cache::{FreshnessPolicy, keys};
use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::Order;
use crate::state::AppState;

use super::cached_json;

/// List the current user's orders, newest first.
#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Response, AppError> {
    let policy = FreshnessPolicy::PER_USER;
    let key = keys::orders(user_id);

    let (orders, status): (Vec<Order>, _) = state
        .cache()
        .read_through(&key, policy, || async {
            OrderRepository::new(state.pool())
                .list_for_user(user_id)
                .await
                .map_err(AppError::from)
        })
        .await?;

    Ok(cached_json(policy, status, orders).into_response())
}

/// Show a single order by its order number.
#[instrument(skip(state), fields(user_id = %user_id, number = %number))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(number): Path<String>,
) -> Result<Response, AppError> {
    let policy = FreshnessPolicy::PER_USER;
    let key = keys::order(user_id, &number);

    let (order, status): (Order, _) = state
        .cache()
        .read_through(&key, policy, || async {
            OrderRepository::new(state.pool())
                .find_by_number(&number, user_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::NotFound(format!("order: {number}")))
        })
        .await?;

    Ok(cached_json(policy, status, order).into_response())
}
