use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use super::extractors::extract_json;
use super::validation::{validate_email, validate_password};
use super::{ApiError, ApiResponse, AppState, CredentialsRequest, LoginResponse, TokenResponse};
use crate::auth::{extract_api_key, extract_bearer};
use crate::services::AuthService;

/// Subject of a verified access token, placed in request extensions.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <access token>`.
pub async fn require_access_token(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())?;
    let user_id = state.auth.authenticate(&token).inspect_err(|e| {
        tracing::debug!("Access token rejected: {e}");
    })?;

    tracing::Span::current().record("user_id", tracing::field::display(user_id));
    request.extensions_mut().insert(AuthenticatedUser(user_id));

    Ok(next.run(request).await)
}

/// Requires `Authorization: ApiKey <service key>`.
pub async fn require_service_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = extract_api_key(request.headers())?;
    if let Err(e) = state.auth.authorize_service(&key) {
        tracing::warn!("Service caller rejected: {e}");
        return Err(e.into());
    }

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let payload = extract_json(body)?;
    let email = validate_email(&payload.email)?;
    let password = validate_password(&payload.password)?;

    let result = state.auth.login(email, password).await?;

    Ok(Json(ApiResponse::success(LoginResponse {
        user: result.user.into(),
        token: result.access_token,
        refresh_token: result.refresh_token,
    })))
}

/// POST /api/refresh
/// Exchanges the refresh token in the bearer header for a new access token
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let refresh_token = extract_bearer(&headers)?;
    let token = state.auth.refresh(&refresh_token).await?;

    Ok(Json(ApiResponse::success(TokenResponse { token })))
}

/// POST /api/revoke
pub async fn revoke(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = extract_bearer(&headers)?;
    state.auth.revoke_session(&refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
