use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::extractors::extract_json;
use super::{ApiError, AppState, WebhookRequest};

const USER_UPGRADED: &str = "user.upgraded";

/// POST /api/polka/webhooks
///
/// Only `user.upgraded` has an effect; every other event is acknowledged
/// with 204 and ignored.
pub async fn polka_webhook(
    State(state): State<Arc<AppState>>,
    body: Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = extract_json(body)?;
    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = payload.data.user_id;
    let updated = state.store.set_user_chirpy_red(user_id, true).await?;
    if !updated {
        return Err(ApiError::not_found("User", user_id));
    }

    tracing::info!(%user_id, "User upgraded to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
