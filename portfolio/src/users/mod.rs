//! User management: listing, profile edits, role changes and deletion.
//!
//! This module enforces the account-level rules the auth core leaves to its
//! surroundings:
//! - At least one `ADMIN` account always exists (no demoting or deleting the last one)
//! - Administrators cannot delete their own account
//! - A bootstrap administrator can be provisioned at startup
//!
//! ## Example
//!
//! ```no_run
//! use portfolio::auth::Role;
//! use portfolio::db::MemoryCredentialStore;
//! use portfolio::users::UserManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let users = UserManager::new(Arc::new(MemoryCredentialStore::new()));
//!
//!     let stats = users.stats().await?;
//!     println!("{} accounts, {} admins", stats.total, stats.admins);
//!
//!     users.update_role(2, Role::Admin).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{UserError, UserResult};
pub use manager::UserManager;
pub use models::{ProfileUpdate, UserStats};
