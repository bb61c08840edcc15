//! Normalizes request payloads into typed values at the HTTP boundary.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use uuid::Uuid;

use parley_types::api::Envelope;

use crate::error::ApiError;

/// Unwrap a `{ data: ... }` body. A missing body or missing `data` key is
/// `Ok(None)`; malformed JSON is a validation error.
pub fn envelope<T>(payload: Result<Json<Envelope<T>>, JsonRejection>) -> Result<Option<T>, ApiError> {
    match payload {
        Ok(Json(envelope)) => Ok(envelope.data),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(None),
        Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
    }
}

/// Trimmed, non-empty value or a validation error carrying `message`.
pub fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ApiError::Validation(message.into())),
    }
}

/// Like [`required`], but an absent value is fine.
pub fn optional(value: Option<String>, message: &str) -> Result<Option<String>, ApiError> {
    value.map(|v| required(Some(v), message)).transpose()
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn parse_id(raw: &str, message: &str) -> Result<Uuid, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::MalformedId(message.into()))
}
