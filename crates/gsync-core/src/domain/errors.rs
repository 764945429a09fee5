//! Domain error types
//!
//! Validation failures raised while constructing domain values. Storage
//! failures are a separate taxonomy, see `ports::StoreError`.

use thiserror::Error;

/// Errors that can occur while constructing or parsing domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid account identifier
    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    /// Invalid remote object identifier
    #[error("Invalid remote id: {0}")]
    InvalidRemoteId(String),

    /// Invalid change-feed page token
    #[error("Invalid page token: {0}")]
    InvalidPageToken(String),

    /// Invalid email address format
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    /// Unknown pending-operation state string
    #[error("Unknown operation state: {0}")]
    InvalidOpState(String),

    /// Unknown pending-operation kind string
    #[error("Unknown operation kind: {0}")]
    InvalidOpKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidEmail("notanemail".to_string());
        assert_eq!(err.to_string(), "Invalid email format: notanemail");

        let err = DomainError::InvalidOpState("pending".to_string());
        assert_eq!(err.to_string(), "Unknown operation state: pending");
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::InvalidAccountId(String::new());
        let err2 = DomainError::InvalidAccountId(String::new());
        assert_eq!(err1, err2);
    }
}
