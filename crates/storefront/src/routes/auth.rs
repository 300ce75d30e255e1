//! Session establishment routes.
//!
//! Identity verification proper (token issuance, credential checks) is an
//! external collaborator. These handlers only bind an already-trusted
//! identity to a session so the `RequireUser` extractor can resolve it.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use marigold_core::UserId;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::middleware::{clear_current_user, set_current_user};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: UserId,
}

/// Establish a session for a verified identity.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("invalid email address".to_string()));
    }

    let user_id = UserRepository::new(state.pool())
        .upsert_by_email(email)
        .await?;

    set_current_user(&session, user_id)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(Json(LoginResponse { user_id }))
}

/// End the current session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode, AppError> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}
