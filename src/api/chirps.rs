//! Chirp endpoints.
//!
//! Creating and deleting require an access token; reading is public.

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use super::auth::AuthenticatedUser;
use super::extractors::{extract_json, extract_query};
use super::validation::validate_chirp;
use super::{
    ApiError, ApiResponse, AppState, ChirpDto, ChirpRequest, ListChirpsQuery,
    ValidateChirpResponse,
};

fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation(format!("Invalid {what}")))
}

/// `None` and `"asc"` sort oldest first, `"desc"` newest first.
fn is_descending(sort: Option<&str>) -> Result<bool, ApiError> {
    match sort {
        None | Some("asc") => Ok(false),
        Some("desc") => Ok(true),
        Some(other) => Err(ApiError::validation(format!(
            "Invalid sort '{other}', expected 'asc' or 'desc'"
        ))),
    }
}

/// POST /api/chirps
pub async fn create_chirp(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    body: Result<Json<ChirpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = extract_json(body)?;
    let cleaned = validate_chirp(&payload.body)?;

    let chirp = state.store.create_chirp(user_id, &cleaned).await?;

    tracing::info!(chirp_id = %chirp.id, %user_id, "Chirp created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ChirpDto::from(chirp))),
    ))
}

/// GET /api/chirps?author_id=&sort=asc|desc
pub async fn list_chirps(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListChirpsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<ChirpDto>>>, ApiError> {
    let query = extract_query(query)?;

    let author_id = query
        .author_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| parse_id(s, "author ID"))
        .transpose()?;
    let descending = is_descending(query.sort.as_deref().filter(|s| !s.is_empty()))?;

    let chirps = state.store.list_chirps(author_id, descending).await?;

    Ok(Json(ApiResponse::success(
        chirps.into_iter().map(ChirpDto::from).collect(),
    )))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    State(state): State<Arc<AppState>>,
    Path(chirp_id): Path<String>,
) -> Result<Json<ApiResponse<ChirpDto>>, ApiError> {
    let chirp_id = parse_id(&chirp_id, "chirp ID")?;

    let chirp = state
        .store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chirp", chirp_id))?;

    Ok(Json(ApiResponse::success(ChirpDto::from(chirp))))
}

/// DELETE /api/chirps/{chirp_id}
///
/// Only the author may delete a chirp.
pub async fn delete_chirp(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(chirp_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp_id = parse_id(&chirp_id, "chirp ID")?;

    let chirp = state
        .store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chirp", chirp_id))?;

    if chirp.user_id != user_id {
        tracing::warn!(%chirp_id, %user_id, "Delete of another user's chirp refused");
        return Err(ApiError::Forbidden(
            "You can only delete your own chirps".to_string(),
        ));
    }

    state.store.delete_chirp(chirp_id).await?;
    tracing::info!(%chirp_id, %user_id, "Chirp deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/validate_chirp
pub async fn validate(
    body: Result<Json<ChirpRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ValidateChirpResponse>>, ApiError> {
    let payload = extract_json(body)?;
    let cleaned_body = validate_chirp(&payload.body)?;

    Ok(Json(ApiResponse::success(ValidateChirpResponse {
        cleaned_body,
    })))
}
