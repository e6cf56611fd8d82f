//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; every error leaves as an [`ApiResponse`] envelope
//! with a stable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ApiResponse;
use crate::services::auth::AuthError;
use crate::services::customers::CustomerError;
use crate::validation::ValidationErrors;

/// Stable error codes returned in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationError,
    BadFormatJson,
    IdentifierAlreadyExists,
    EmailAlreadyExists,
    HandleAlreadyExists,
    CustomerNotFound,
    AuthenticationFailed,
    Unauthorized,
    UnexpectedError,
}

impl ErrorCode {
    /// Wire name of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadFormatJson => "BAD_FORMAT_JSON",
            Self::IdentifierAlreadyExists => "IDENTIFIER_ALREADY_EXISTS",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::HandleAlreadyExists => "HANDLE_ALREADY_EXISTS",
            Self::CustomerNotFound => "CUSTOMER_NOT_FOUND",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
        }
    }

    /// Fixed client-facing message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ValidationError => "Validation failed.",
            Self::BadFormatJson => "Malformed or invalid JSON.",
            Self::IdentifierAlreadyExists => "A customer with this identifier already exists.",
            Self::EmailAlreadyExists => "A customer with this email already exists.",
            Self::HandleAlreadyExists => "An identity with this handle already exists.",
            Self::CustomerNotFound => "Customer not found.",
            Self::AuthenticationFailed => "Invalid credentials.",
            Self::Unauthorized => "Authentication required.",
            Self::UnexpectedError => "Unexpected error.",
        }
    }

    /// HTTP status for the code.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::ValidationError | Self::BadFormatJson => StatusCode::BAD_REQUEST,
            Self::IdentifierAlreadyExists | Self::EmailAlreadyExists | Self::HandleAlreadyExists => {
                StatusCode::CONFLICT
            }
            Self::CustomerNotFound => StatusCode::NOT_FOUND,
            Self::AuthenticationFailed | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UnexpectedError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application-level error type for the registry.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more request fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Request body could not be parsed.
    #[error("Bad request body: {0}")]
    BadFormatJson(String),

    /// Customer operation failed.
    #[error("Customer error: {0}")]
    Customer(#[from] CustomerError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Missing or invalid bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Error code reported for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::BadFormatJson(_) => ErrorCode::BadFormatJson,
            Self::Customer(err) => match err {
                CustomerError::InvalidIdentifier(_) => ErrorCode::ValidationError,
                CustomerError::IdentifierConflict => ErrorCode::IdentifierAlreadyExists,
                CustomerError::EmailConflict => ErrorCode::EmailAlreadyExists,
                CustomerError::NotFound => ErrorCode::CustomerNotFound,
                CustomerError::Repository(_) => ErrorCode::UnexpectedError,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => ErrorCode::AuthenticationFailed,
                AuthError::HandleConflict => ErrorCode::HandleAlreadyExists,
                AuthError::InvalidToken => ErrorCode::Unauthorized,
                AuthError::PasswordHash | AuthError::TokenSigning(_) | AuthError::Repository(_) => {
                    ErrorCode::UnexpectedError
                }
            },
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::Internal(_) => ErrorCode::UnexpectedError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        // Capture server errors to Sentry
        if code == ErrorCode::UnexpectedError {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Field detail is only exposed for validation failures
        let data = match self {
            Self::Validation(errors) => Some(errors),
            Self::Customer(CustomerError::InvalidIdentifier(err)) => {
                let mut errors = ValidationErrors::new();
                errors.add("identifier", err.to_string());
                Some(errors)
            }
            _ => None,
        };

        ApiResponse::error(code.as_str(), code.message(), data).with_status(code.status())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an authenticated handle.
///
/// Call this after bearer authentication to associate errors with the caller.
pub fn set_sentry_user(handle: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(handle.to_owned()),
            ..Default::default()
        }));
    });
}
