//! Internal operational endpoints.
//!
//! Guarded by a shared token and disabled entirely when the token is not
//! configured.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use secrecy::ExposeSecret;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the internal token.
const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

/// Drop both cache tiers. Used after catalog imports.
#[instrument(skip(state, headers))]
pub async fn purge_cache(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let Some(expected) = state.config().internal_token.as_ref() else {
        return Err(AppError::NotFound("internal endpoints disabled".to_string()));
    };

    let provided = headers
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if provided != expected.expose_secret() {
        return Err(AppError::Unauthorized("invalid internal token".to_string()));
    }

    state.cache().purge_all().await;
    info!("Cache purged");

    Ok(StatusCode::NO_CONTENT)
}
