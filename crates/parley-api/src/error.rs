use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use parley_core::CoreError;
use parley_types::api::ErrorResponse;

/// Every handler failure. The display text is what the client sees,
/// except for `Internal`, which is logged and replaced.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or empty required field.
    #[error("{0}")]
    Validation(String),

    /// Email already registered.
    #[error("{0}")]
    Duplicate(String),

    /// Id failed format validation.
    #[error("{0}")]
    MalformedId(String),

    /// A relation between two records does not hold (not friends, not author).
    #[error("{0}")]
    Relation(String),

    /// The resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Bad credentials.
    #[error("{0}")]
    Authentication(String),

    /// Missing or invalid token, or reading another user's resource.
    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Duplicate(_) | Self::MalformedId(_) | Self::Relation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Authentication(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound => Self::NotFound("No message found with id".into()),
            CoreError::Forbidden => {
                Self::Unauthorized("Not authorized, message not authored by user".into())
            }
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Store(e) => Self::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Internal(e) => {
                error!("internal error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(ApiError::Duplicate("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Relation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Authentication("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(CoreError::Forbidden).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn internal_details_stay_out_of_the_body() {
        let err = ApiError::Internal(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
