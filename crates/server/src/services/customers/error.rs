//! Customer service error types.

use thiserror::Error;

use customer_registry_core::NationalIdError;

use crate::db::{CUSTOMER_EMAIL_KEY, CUSTOMER_IDENTIFIER_KEY, RepositoryError};

/// Errors that can occur during customer operations.
#[derive(Debug, Error)]
pub enum CustomerError {
    /// The national identifier fails the checksum.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] NationalIdError),

    /// Another customer already holds this identifier.
    #[error("identifier already registered")]
    IdentifierConflict,

    /// Another customer already holds this email.
    #[error("email already registered")]
    EmailConflict,

    /// No customer matches the lookup.
    #[error("customer not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CustomerError {
    fn from(err: RepositoryError) -> Self {
        match err.conflict_constraint() {
            Some(CUSTOMER_IDENTIFIER_KEY) => Self::IdentifierConflict,
            Some(CUSTOMER_EMAIL_KEY) => Self::EmailConflict,
            _ if matches!(err, RepositoryError::NotFound) => Self::NotFound,
            _ => Self::Repository(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violations_map_to_conflicts() {
        let err = CustomerError::from(RepositoryError::Conflict(CUSTOMER_IDENTIFIER_KEY.into()));
        assert!(matches!(err, CustomerError::IdentifierConflict));

        let err = CustomerError::from(RepositoryError::Conflict(CUSTOMER_EMAIL_KEY.into()));
        assert!(matches!(err, CustomerError::EmailConflict));

        let err = CustomerError::from(RepositoryError::NotFound);
        assert!(matches!(err, CustomerError::NotFound));

        let err = CustomerError::from(RepositoryError::Conflict("other_key".into()));
        assert!(matches!(err, CustomerError::Repository(_)));
    }
}
