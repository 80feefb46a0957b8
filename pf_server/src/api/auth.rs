//! Authentication API handlers.
//!
//! This module provides HTTP REST endpoints for:
//! - Account registration with email, password, and optional name
//! - Login with email/password, subject to per-account lockout
//! - Token refresh for obtaining a new access token
//! - Fetching the caller's own profile
//!
//! # Examples
//!
//! Register a new account:
//! ```bash
//! curl -X POST http://localhost:8000/api/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "a@x.com", "password": "Abcdef1!", "name": "Ada"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8000/api/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "a@x.com", "password": "Abcdef1!"}'
//! ```

use axum::{
    Json,
    extract::{Extension, State, rejection::JsonRejection},
};
use portfolio::auth::{Account, AccountProfile, AuthError, LoginRequest, RegisterRequest};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::errors::{ApiResult, from_auth_error, json_body};
use crate::logging::log_security_event;

/// Token type reported to clients
pub const TOKEN_TYPE: &str = "bearer";

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Register a new account.
///
/// # Request Body
///
/// ```json
/// {
///   "email": "a@x.com",
///   "password": "Abcdef1!",
///   "name": "Ada"  // Optional
/// }
/// ```
///
/// # Response
///
/// On success, returns `200 OK` with the new account's profile. The account
/// always starts with the `USER` role.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body, invalid email, email already registered or weak password
/// - `429 Too Many Requests`: Registration rate limit exceeded
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<AccountProfile> {
    let request = json_body(body)?;
    let account = state
        .auth_manager
        .register(request)
        .await
        .map_err(from_auth_error)?;

    Ok(Json(account.profile()))
}

/// Authenticate and issue an access/refresh token pair.
///
/// # Request Body
///
/// ```json
/// {
///   "email": "a@x.com",
///   "password": "Abcdef1!"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJhbGciOiJIUzI1NiIs...",
///   "refresh_token": "eyJhbGciOiJIUzI1NiIs...",
///   "token_type": "bearer"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `403 Forbidden`: Account locked; the message carries the minutes remaining
/// - `429 Too Many Requests`: Login rate limit exceeded
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let request = json_body(body)?;
    let email = request.email.clone();

    match state.auth_manager.login(request).await {
        Ok(tokens) => Ok(Json(TokenResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: TOKEN_TYPE.to_string(),
        })),
        Err(e) => {
            if let AuthError::AccountLocked { remaining_minutes } = &e {
                log_security_event(
                    "account_locked",
                    Some(&email),
                    None,
                    &format!("Login refused, {remaining_minutes} minute(s) of lockout remaining"),
                );
            }
            Err(from_auth_error(e))
        }
    }
}

/// Exchange a refresh token for a new access token.
///
/// The new token carries the account's current role.
///
/// # Request Body
///
/// ```json
/// { "refresh_token": "eyJhbGciOiJIUzI1NiIs..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired or wrong-kind token, or the account no longer exists
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshPayload>, JsonRejection>,
) -> ApiResult<AccessTokenResponse> {
    let payload = json_body(body)?;
    let access_token = state
        .auth_manager
        .refresh(&payload.refresh_token)
        .await
        .map_err(from_auth_error)?;

    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    }))
}

/// Profile of the authenticated caller
pub async fn me(Extension(account): Extension<Account>) -> ApiResult<AccountProfile> {
    Ok(Json(account.profile()))
}
