//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
///
/// Every failure of a service operation is exactly one of these; the HTTP
/// layer maps each variant to a single status code.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    DuplicateIdentity(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Not authorized to perform this action")]
    Forbidden,

    #[error("{entity_type} not found: {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity_type: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            key: key.to_string(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Store failures that reach a service are internal unless a caller has
/// already given them a more specific meaning.
impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint(msg) => DomainError::DuplicateIdentity(msg),
            RepoError::NotFound => DomainError::Internal("Record not found in store".into()),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_errors_map_to_domain_errors() {
        assert!(matches!(
            DomainError::from(RepoError::Constraint("users_email_key".into())),
            DomainError::DuplicateIdentity(_)
        ));
        assert!(matches!(
            DomainError::from(RepoError::NotFound),
            DomainError::Internal(msg) if msg == "Record not found in store"
        ));
        assert!(matches!(
            DomainError::from(RepoError::Connection("refused".into())),
            DomainError::Internal(msg) if msg == "refused"
        ));
    }
}
