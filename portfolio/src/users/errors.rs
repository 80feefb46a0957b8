//! User management error types.

use thiserror::Error;

use crate::auth::{AccountId, AuthError};
use crate::db::StoreError;

/// User management errors
#[derive(Debug, Error)]
pub enum UserError {
    /// Account not found
    #[error("User {0} not found")]
    NotFound(AccountId),

    /// Operation would leave no administrator
    #[error("Cannot remove the last administrator")]
    LastAdmin,

    /// Administrators cannot delete themselves
    #[error("Cannot delete the currently signed-in account")]
    SelfDeletion,

    /// Registration or hashing failure while provisioning an account
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Credential store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl UserError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            UserError::Store(_) => "Internal server error".to_string(),
            UserError::NotFound(_) => "User not found".to_string(),
            UserError::Auth(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for user management operations
pub type UserResult<T> = Result<T, UserError>;
