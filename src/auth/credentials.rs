//! Credential extraction from request headers.

use axum::http::{HeaderMap, header::AUTHORIZATION};

use super::AuthError;

const BEARER_SCHEME: &str = "Bearer";
const API_KEY_SCHEME: &str = "ApiKey";

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    authorization_credential(headers, BEARER_SCHEME).ok_or(AuthError::MissingToken)
}

/// Extracts the key from `Authorization: ApiKey <key>`.
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    authorization_credential(headers, API_KEY_SCHEME).ok_or(AuthError::MissingApiKey)
}

fn authorization_credential(headers: &HeaderMap, scheme: &str) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (found_scheme, credential) = value.trim_start().split_once(' ')?;

    if found_scheme != scheme {
        return None;
    }

    let credential = credential.trim();
    if credential.is_empty() {
        return None;
    }

    Some(credential.to_string())
}
