//! Authentication error types.

use thiserror::Error;

use super::models::Role;
use crate::db::StoreError;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email already registered
    #[error("Email already registered")]
    DuplicateEmail,

    /// Email is not a valid address
    #[error("Invalid email address")]
    InvalidEmail,

    /// Password too weak
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// Email or password wrong. Deliberately does not say which.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Account temporarily locked after repeated failures
    #[error("Account locked, try again in {remaining_minutes} minute(s)")]
    AccountLocked { remaining_minutes: i64 },

    /// Bad signature, wrong kind tag or missing subject
    #[error("Invalid token")]
    InvalidToken,

    /// Token expired
    #[error("Token expired")]
    ExpiredToken,

    /// Token subject no longer exists
    #[error("Unknown account")]
    UnknownAccount,

    /// Caller lacks the required role
    #[error("{0} role required")]
    Forbidden(Role),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// JWT encoding failed
    #[error("Token encoding failed: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),

    /// Credential store failure
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            other => AuthError::Store(other),
        }
    }
}

impl AuthError {
    /// Whether the error comes from infrastructure rather than the caller
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuthError::Store(_) | AuthError::HashingFailed | AuthError::TokenEncoding(_)
        )
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Store and JWT errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    pub fn client_message(&self) -> String {
        if self.is_infrastructure() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_store_error_maps_to_duplicate_email() {
        let err: AuthError = StoreError::DuplicateEmail.into();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }

    #[test]
    fn test_client_message_hides_store_details() {
        let err = AuthError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert!(err.is_infrastructure());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_invalid_email_is_a_client_error() {
        let err = AuthError::InvalidEmail;
        assert!(!err.is_infrastructure());
        assert_eq!(err.client_message(), "Invalid email address");
    }

    #[test]
    fn test_locked_message_includes_minutes() {
        let err = AuthError::AccountLocked {
            remaining_minutes: 15,
        };
        assert!(err.client_message().contains("15"));
        assert!(!err.is_infrastructure());
    }
}
