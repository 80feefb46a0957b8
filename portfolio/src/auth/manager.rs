//! Authentication manager implementation.

use std::sync::Arc;

use chrono::Duration;
use log::{info, warn};
use validator::Validate;

use super::{
    errors::{AuthError, AuthResult},
    lockout::LockoutPolicy,
    models::{Account, LockState, LoginRequest, NewAccount, RegisterRequest, Role, SessionTokens, TokenKind},
    password::{PasswordHasher, validate_strength},
    token::TokenIssuer,
};
use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::db::CredentialStore;

/// Authentication manager
///
/// Orchestrates the credential store, password hasher, lockout policy and
/// token issuer. Cheap to share behind an `Arc`.
#[derive(Clone)]
pub struct AuthManager {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    lockout: LockoutPolicy,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `store` - Credential store holding the accounts
    /// * `config` - Signing secret, token lifetimes and lockout limits
    /// * `clock` - Time source for lockout and token expiry
    pub fn new(store: Arc<dyn CredentialStore>, config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            hasher: PasswordHasher::new(),
            tokens: TokenIssuer::new(&config.secret_key),
            lockout: config.lockout_policy(),
            access_token_duration: config.access_ttl(),
            refresh_token_duration: config.refresh_ttl(),
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn lockout_policy(&self) -> &LockoutPolicy {
        &self.lockout
    }

    /// Register a new account with the `User` role
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidEmail` - Email is not a valid address
    /// * `AuthError::DuplicateEmail` - Email already registered
    /// * `AuthError::WeakPassword` - Password fails the strength policy
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<Account> {
        request.validate().map_err(|_| AuthError::InvalidEmail)?;

        if self.store.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        validate_strength(&request.password)?;

        let password_hash = self.hasher.hash(&request.password)?;

        // A concurrent registration can still win the race; the store's
        // unique constraint turns that into DuplicateEmail.
        let account = self
            .store
            .insert(NewAccount {
                email: request.email,
                password_hash,
                name: request.name,
                role: Role::User,
            })
            .await?;

        info!("Registered account {}", account.email);
        Ok(account)
    }

    /// Login with email and password
    ///
    /// # Errors
    ///
    /// * `AuthError::AccountLocked` - Account is locked, or this failure locked it
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password
    pub async fn login(&self, request: LoginRequest) -> AuthResult<SessionTokens> {
        let now = self.clock.now();

        let Some(account) = self.store.find_by_email(&request.email).await? else {
            warn!("Failed login attempt for unknown email {}", request.email);
            return Err(AuthError::InvalidCredentials);
        };

        // Locked accounts are rejected before any credential check and
        // nothing is written, so hammering cannot extend the lockout.
        if let LockState::LockedUntil(_) = account.lock_state(now) {
            warn!("Login attempt on locked account {}", account.email);
            return Err(AuthError::AccountLocked {
                remaining_minutes: self.lockout.remaining_minutes(&account, now),
            });
        }

        if !self.hasher.verify(&request.password, &account.password_hash) {
            let account = self.lockout.record_failure(account, now);
            self.store.save(&account).await?;

            if self.lockout.is_locked(&account, now) {
                warn!(
                    "Account {} locked after {} failed attempts",
                    account.email, account.failed_attempts
                );
                return Err(AuthError::AccountLocked {
                    remaining_minutes: self.lockout.lockout_minutes(),
                });
            }

            warn!(
                "Failed login attempt for {} ({} of {})",
                account.email,
                account.failed_attempts,
                self.lockout.max_attempts()
            );
            return Err(AuthError::InvalidCredentials);
        }

        let account = if account.failed_attempts != 0 || account.locked_until.is_some() {
            let account = self.lockout.record_success(account);
            self.store.save(&account).await?;
            account
        } else {
            account
        };

        let tokens = SessionTokens {
            access_token: self.tokens.issue_access(
                &account.email,
                account.role,
                self.access_token_duration,
                now,
            )?,
            refresh_token: self.tokens.issue_refresh(
                &account.email,
                self.refresh_token_duration,
                now,
            )?,
        };

        info!("Account {} logged in", account.email);
        Ok(tokens)
    }

    /// Mint a new access token from a refresh token
    ///
    /// The role embedded in the new token is read from the store, so a role
    /// change since login takes effect here.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` / `AuthError::ExpiredToken` - Refresh token rejected
    /// * `AuthError::UnknownAccount` - Subject no longer exists
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<String> {
        let now = self.clock.now();
        let verified = self.tokens.verify(refresh_token, TokenKind::Refresh, now)?;

        let Some(account) = self.store.find_by_email(&verified.subject).await? else {
            warn!("Token refresh for vanished account {}", verified.subject);
            return Err(AuthError::UnknownAccount);
        };

        let access_token =
            self.tokens
                .issue_access(&account.email, account.role, self.access_token_duration, now)?;

        info!("Token refreshed for {}", account.email);
        Ok(access_token)
    }

    /// Resolve the account behind an access token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` / `AuthError::ExpiredToken` - Access token rejected
    /// * `AuthError::UnknownAccount` - Subject no longer exists
    pub async fn identify(&self, access_token: &str) -> AuthResult<Account> {
        let verified = self
            .tokens
            .verify(access_token, TokenKind::Access, self.clock.now())?;

        self.store
            .find_by_email(&verified.subject)
            .await?
            .ok_or(AuthError::UnknownAccount)
    }

    /// Capability check: identify the caller and require a role.
    ///
    /// Uses the account's current role, so a demoted admin loses access
    /// immediately even while holding an older token.
    ///
    /// # Errors
    ///
    /// Everything `identify` returns, plus `AuthError::Forbidden` when the role is insufficient
    pub async fn requires(&self, access_token: &str, role: Role) -> AuthResult<Account> {
        let account = self.identify(access_token).await?;

        if !account.role.grants(role) {
            warn!("Account {} denied, {} role required", account.email, role);
            return Err(AuthError::Forbidden(role));
        }

        Ok(account)
    }
}
