//! # Portfolio
//!
//! Accounts, authentication and login lockout for the portfolio site backend.
//!
//! The crate is transport-agnostic: the HTTP layer lives in `pf_server` and
//! talks to the managers here through plain async calls.
//!
//! ## Core Modules
//!
//! - [`auth`]: Registration, login with lockout, token refresh and the `requires(role)` check
//! - [`users`]: Listing, profile edits, role changes, deletion and admin bootstrap
//! - [`db`]: The [`CredentialStore`](db::CredentialStore) seam with PostgreSQL and in-memory backends
//! - [`config`]: Authentication settings loaded from the environment
//! - [`clock`]: Injectable time source
//!
//! ## Example
//!
//! ```
//! use portfolio::auth::{LockoutPolicy, Role};
//!
//! let policy = LockoutPolicy::default();
//! assert_eq!(policy.max_attempts(), 5);
//! assert!(Role::Admin.grants(Role::User));
//! ```

/// Authentication core: hashing, tokens, lockout and the auth manager.
pub mod auth;
pub use auth::{AuthError, AuthManager, Role};

/// Time source abstraction.
pub mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

/// Authentication configuration.
pub mod config;
pub use config::{AuthConfig, ConfigError};

/// Credential storage.
pub mod db;

/// Account administration.
pub mod users;
pub use users::{UserError, UserManager};
