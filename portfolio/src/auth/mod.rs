//! Authentication module providing registration, login, token refresh and
//! caller identification.
//!
//! This module implements:
//! - Argon2id password hashing with a strength policy
//! - Kind-tagged JWT access tokens (24-hour default expiry, role claim)
//! - JWT refresh tokens (7-day default expiry, no role claim)
//! - Per-account lockout after repeated failed logins
//! - A single `requires(role)` capability check for downstream authorization
//!
//! ## Example
//!
//! ```no_run
//! use portfolio::auth::{AuthManager, LoginRequest, RegisterRequest};
//! use portfolio::clock::SystemClock;
//! use portfolio::config::AuthConfig;
//! use portfolio::db::MemoryCredentialStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(MemoryCredentialStore::new()),
//!         &AuthConfig::with_secret("jwt_secret"),
//!         Arc::new(SystemClock),
//!     );
//!
//!     let account = auth
//!         .register(RegisterRequest {
//!             email: "a@x.com".to_string(),
//!             password: "Abcdef1!".to_string(),
//!             name: Some("Ada".to_string()),
//!         })
//!         .await?;
//!     println!("Registered account: {}", account.email);
//!
//!     let tokens = auth
//!         .login(LoginRequest {
//!             email: "a@x.com".to_string(),
//!             password: "Abcdef1!".to_string(),
//!         })
//!         .await?;
//!     let me = auth.identify(&tokens.access_token).await?;
//!     assert_eq!(me.email, "a@x.com");
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod lockout;
pub mod manager;
pub mod models;
pub mod password;
pub mod token;

pub use errors::{AuthError, AuthResult};
pub use lockout::{DEFAULT_LOCKOUT_MINUTES, DEFAULT_MAX_ATTEMPTS, LockoutPolicy};
pub use manager::AuthManager;
pub use models::{
    Account, AccountId, AccountProfile, LockState, LoginRequest, NewAccount, RegisterRequest,
    Role, SessionTokens, TokenClaims, TokenKind, VerifiedToken,
};
pub use password::{PasswordHasher, validate_strength};
pub use token::TokenIssuer;
