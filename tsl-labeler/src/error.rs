//! Error types for tsl-labeler

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// tsl-common error, mapped per variant
    #[error(transparent)]
    Common(#[from] tsl_common::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        use tsl_common::Error;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Common(err) => match err {
                Error::NoActiveItem => (StatusCode::CONFLICT, "NO_ACTIVE_ITEM"),
                Error::InvalidSentiment(_) => (StatusCode::BAD_REQUEST, "INVALID_SENTIMENT"),
                Error::InvalidConfidence(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIDENCE"),
                Error::StoreWriteFailed(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "STORE_WRITE_FAILED")
                }
                Error::StoreReadFailed(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_READ_FAILED"),
                Error::SourceFetchFailed(_) => (StatusCode::BAD_GATEWAY, "SOURCE_FETCH_FAILED"),
                Error::Config(_) | Error::Io(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();
        let message = match &self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Common(err) => err.to_string(),
        };

        if status.is_server_error() {
            warn!(code = error_code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tsl_common::{Error, StoreError};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::NoActiveItem, StatusCode::CONFLICT),
            (Error::InvalidSentiment("Joy".into()), StatusCode::BAD_REQUEST),
            (Error::InvalidConfidence(9), StatusCode::BAD_REQUEST),
            (
                Error::StoreWriteFailed(StoreError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (Error::SourceFetchFailed("404".into()), StatusCode::BAD_GATEWAY),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
