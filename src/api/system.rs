//! Health and administrative endpoints.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ResetResponse};

/// GET /api/healthz
pub async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| ApiError::DatabaseError(format!("{e:#}")))?;
    Ok("OK")
}

/// POST /admin/reset
///
/// Deletes every user (and, by cascade, their refresh tokens and chirps).
/// Only allowed when `general.platform` is `"dev"`.
pub async fn reset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ResetResponse>>, ApiError> {
    if !state.config.general.is_dev() {
        tracing::warn!(platform = %state.config.general.platform, "Reset refused");
        return Err(ApiError::Forbidden(
            "Reset is only allowed on the dev platform".to_string(),
        ));
    }

    let users_deleted = state.store.delete_all_users().await?;
    tracing::info!(users_deleted, "Database reset");

    Ok(Json(ApiResponse::success(ResetResponse { users_deleted })))
}
