//! Error types for the services and the repository ports.

use thiserror::Error;

/// Failures a caller of the services can act on.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Also returned for rows owned by someone else.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Storage or hashing failure; the message is for logs only.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn task_not_found(id: i32) -> Self {
        Self::NotFound { entity: "Task", id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Errors raised by repository implementations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database unreachable: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    /// A write addressed a row that does not exist.
    #[error("Row not found")]
    NotFound,

    /// Unique constraint hit, e.g. a username taken by a concurrent insert.
    #[error("Unique constraint violated: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            // Callers that expect a missing row map NotFound themselves
            other => DomainError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(DomainError::task_not_found(7).to_string(), "Task 7 not found");
    }

    #[test]
    fn test_repo_errors_convert() {
        assert!(matches!(
            DomainError::from(RepoError::Constraint("users_username_key".into())),
            DomainError::Duplicate(_)
        ));
        assert!(matches!(
            DomainError::from(RepoError::Connection("refused".into())),
            DomainError::Internal(_)
        ));
    }
}
