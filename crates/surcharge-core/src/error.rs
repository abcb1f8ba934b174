//! Domain-level error types.

use thiserror::Error;

use crate::ports::UpstreamError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The upstream percentage service kept failing after every retry.
    #[error("Failed to fetch percentage after {attempts} attempts")]
    ExternalService {
        attempts: u32,
        #[source]
        source: UpstreamError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),
}
