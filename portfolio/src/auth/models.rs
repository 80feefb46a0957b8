//! Authentication data models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account ID type
pub type AccountId = i64;

/// Account role. Persisted and serialized as `USER` / `ADMIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Whether a holder of `self` satisfies a `required` role check
    pub fn grants(&self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Admin => *self == Role::Admin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Lockout state observed at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    LockedUntil(DateTime<Utc>),
}

/// Registered account, including credential and lockout bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub role: Role,
    pub failed_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Translate the two persisted lockout fields into a state value.
    /// A lockout that has lapsed reads as `Unlocked`.
    pub fn lock_state(&self, now: DateTime<Utc>) -> LockState {
        match self.locked_until {
            Some(until) if until > now => LockState::LockedUntil(until),
            _ => LockState::Unlocked,
        }
    }

    pub fn profile(&self) -> AccountProfile {
        AccountProfile::from(self)
    }
}

/// Public view of an account returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: AccountId,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            name: account.name.clone(),
            bio: account.bio.clone(),
            image: account.image.clone(),
            role: account.role,
            created_at: account.created_at,
        }
    }
}

/// Account about to be inserted into the store
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: Role,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair issued on login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // Account email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>, // Access tokens only
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Result of a successful token verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub role: Option<Role>,
}
