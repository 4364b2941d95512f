use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these,
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from `{"code": "NOT_FOUND", "message": "..."}`.
pub mod error_code {
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BACKEND_UNAVAILABLE: &str = "BACKEND_UNAVAILABLE";
    pub const BACKEND_ERROR: &str = "BACKEND_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Service error surfaced by every catalog operation.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always includes both:
///
/// ```json
/// {"code": "INVALID_ARGUMENT", "message": "limit must be positive, got 0"}
/// ```
///
/// Nothing is retried inside the service; every variant reaches the caller.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Bad limit, offset or id. Raised before any storage call. HTTP 400.
    #[error("{0}")]
    InvalidArgument(String),

    /// Resource does not exist. Only produced at the HTTP boundary; the
    /// service itself reports a missing product as `None`. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Storage could not be reached or did not answer in time. HTTP 503.
    #[error("{0}")]
    BackendUnavailable(String),

    /// Storage answered with a failure or malformed data. HTTP 502.
    #[error("{0}")]
    BackendError(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::InvalidArgument(_) => error_code::INVALID_ARGUMENT,
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::BackendUnavailable(_) => error_code::BACKEND_UNAVAILABLE,
            ServiceError::BackendError(_) => error_code::BACKEND_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::BackendError(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::InvalidArgument("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::BackendUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ServiceError::BackendError("x".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(ServiceError::InvalidArgument("x".into()).error_code(), "INVALID_ARGUMENT");
        assert_eq!(ServiceError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ServiceError::BackendUnavailable("x".into()).error_code(), "BACKEND_UNAVAILABLE");
        assert_eq!(ServiceError::BackendError("x".into()).error_code(), "BACKEND_ERROR");
        assert_eq!(ServiceError::Internal("x".into()).error_code(), "INTERNAL");
    }

    #[test]
    fn json_response_format() {
        let err = ServiceError::BackendUnavailable("storage request timed out".into());
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn error_display_is_just_message() {
        assert_eq!(
            ServiceError::InvalidArgument("offset must not be negative".into()).to_string(),
            "offset must not be negative"
        );
        assert_eq!(ServiceError::BackendError("bad row".into()).to_string(), "bad row");
    }
}
