//! Authentication error types.

use thiserror::Error;

use crate::db::{IDENTITY_HANDLE_KEY, RepositoryError};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown handle or wrong secret. The two are never distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The handle is already registered.
    #[error("handle already registered")]
    HandleConflict,

    /// Bearer token is malformed, expired or signed with another key.
    #[error("invalid token")]
    InvalidToken,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token signing error.
    #[error("token signing error: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err.conflict_constraint() {
            Some(IDENTITY_HANDLE_KEY) => Self::HandleConflict,
            _ => Self::Repository(err),
        }
    }
}
