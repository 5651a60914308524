//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{AddressError, CartError, DomainError, UserError};
use record_store::RecordStoreError;

use crate::auth::AuthError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid identity.
    Unauthorized(AuthError),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(err) => {
                tracing::debug!(error = %err, "rejected credential");
                (StatusCode::UNAUTHORIZED, err.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match &err {
        DomainError::Cart(cart_err) => match cart_err {
            CartError::CartNotFound { .. } | CartError::LineNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            CartError::InvalidQuantity { .. }
            | CartError::InvalidPrice { .. }
            | CartError::ProductIdRequired => StatusCode::BAD_REQUEST,
        },
        DomainError::Address(address_err) => match address_err {
            AddressError::AddressNotFound { .. } => StatusCode::NOT_FOUND,
            AddressError::MissingField { .. } => StatusCode::BAD_REQUEST,
        },
        DomainError::User(user_err) => match user_err {
            UserError::EmailTaken { .. } => StatusCode::CONFLICT,
            UserError::NameRequired | UserError::InvalidEmail { .. } => StatusCode::BAD_REQUEST,
        },
        DomainError::UserNotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Store(RecordStoreError::DuplicateKey { .. }) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "internal server error");
        return (status, "Internal server error".to_string());
    }

    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Issue(_) => ApiError::Internal(err.to_string()),
            other => ApiError::Unauthorized(other),
        }
    }
}
