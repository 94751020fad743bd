use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::auth::AuthenticatedUser;
use super::extractors::extract_json;
use super::validation::{validate_email, validate_password};
use super::{ApiError, ApiResponse, AppState, CredentialsRequest, UserDto};
use crate::db::is_unique_violation;

fn map_write_error(err: anyhow::Error) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::conflict("Email is already registered")
    } else {
        ApiError::from(err)
    }
}

/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = extract_json(body)?;
    let email = validate_email(&payload.email)?;
    let password = validate_password(&payload.password)?;

    let hash = state.auth.hasher().hash_async(password).await?;
    let user = state
        .store
        .create_user(email, &hash)
        .await
        .map_err(map_write_error)?;

    tracing::info!(user_id = %user.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

/// PUT /api/users
/// Replaces the caller's email and password
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let payload = extract_json(body)?;
    let email = validate_email(&payload.email)?;
    let password = validate_password(&payload.password)?;

    let hash = state.auth.hasher().hash_async(password).await?;
    let user = state
        .store
        .update_user_email_and_password(user_id, email, &hash)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| ApiError::not_found("User", user_id))?;

    tracing::info!(user_id = %user.id, "User credentials updated");

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}
