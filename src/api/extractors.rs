//! Request body extraction helpers.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and pass it through
//! [`extract_json`] so malformed bodies end up in the [`ApiError`] envelope.
//! Query strings go through [`extract_query`] the same way.

use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};

use super::ApiError;

/// Extract a JSON body, mapping deserialization errors to a 400.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| ApiError::validation(err.body_text()))
}

/// Extract a query string, mapping parse errors to a 400.
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| ApiError::validation(err.body_text()))
}
