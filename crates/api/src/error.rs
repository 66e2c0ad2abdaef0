//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{AccessError, DomainError, ErrorCategory};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// No usable credentials were presented.
    Unauthenticated(String),
    /// Credentials were presented but rejected.
    Forbidden(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Internal server error.
    Internal(String),
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Internal(msg) => internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn internal(detail: String) -> (StatusCode, String) {
    tracing::error!(error = %detail, "internal server error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match err.category() {
        ErrorCategory::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorCategory::Forbidden => StatusCode::FORBIDDEN,
        ErrorCategory::Validation => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::Conflict => StatusCode::CONFLICT,
        ErrorCategory::Internal => return internal(err.to_string()),
    };
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use document_store::DocumentStoreError;
    use domain::{DeliveryError, DeliveryStatus, TankError, ValidationError};

    use super::*;

    fn status(err: impl Into<ApiError>) -> StatusCode {
        err.into().status_and_message().0
    }

    #[test]
    fn test_domain_categories_map_to_statuses() {
        let capacity = DomainError::Tank(TankError::CapacityExceeded {
            attempted: 1500.0,
            current: 9000.0,
            limit: 10000.0,
        });
        assert_eq!(status(capacity), StatusCode::UNPROCESSABLE_ENTITY);

        let transition = DomainError::Delivery(DeliveryError::InvalidTransition {
            from: DeliveryStatus::Completed,
            to: DeliveryStatus::Cancelled,
        });
        assert_eq!(status(transition), StatusCode::CONFLICT);

        let missing = DomainError::Validation(ValidationError::required("tankId"));
        assert_eq!(status(missing), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(DomainError::not_found("Tank", "abc")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status(AccessError::NotManager), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ApiError::Domain(DomainError::Store(DocumentStoreError::InvalidCommit(
            "empty batch".into(),
        )));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn test_auth_errors() {
        assert_eq!(
            status(ApiError::Unauthenticated("no token".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(ApiError::Forbidden("bad token".into())),
            StatusCode::FORBIDDEN
        );
    }
}
