// Common DTOs for public API
//
// These types are shared across multiple API endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use stamprally_core::PortalError;
use utoipa::ToSchema;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Convert to axum response tuple
    pub fn into_response(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

/// Response wrapper for list endpoints.
/// All list endpoints return responses wrapped in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    /// Array of items returned by the list operation.
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Service error rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub PortalError);

impl From<PortalError> for ApiError {
    fn from(err: PortalError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::PermissionDenied => StatusCode::FORBIDDEN,
            PortalError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PortalError::PreconditionFailed(_) => StatusCode::CONFLICT,
            PortalError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            PortalError::Storage(e) => {
                tracing::error!("Storage error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        ErrorResponse::new(message)
            .into_response(status)
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stamprally_core::{Entity, Precondition};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PortalError::NotFound(Entity::Event), StatusCode::NOT_FOUND),
            (PortalError::PermissionDenied, StatusCode::FORBIDDEN),
            (PortalError::invalid_input("bad"), StatusCode::BAD_REQUEST),
            (Precondition::AlreadyJoined.into(), StatusCode::CONFLICT),
            (
                anyhow::anyhow!("connection refused").into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn test_storage_details_are_hidden() {
        let response = ApiError(anyhow::anyhow!("password=secret").into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
