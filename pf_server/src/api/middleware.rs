//! Authentication middleware for protected endpoints.
//!
//! Extracts the bearer token from the `Authorization` header and runs it
//! through [`AuthManager::requires`](portfolio::AuthManager::requires). The
//! authenticated [`Account`] is injected into request extensions for
//! downstream handlers.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, middleware};
//! # use pf_server::api::middleware::require_admin;
//! # use pf_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let admin_routes: Router<AppState> = Router::new()
//!     .route("/api/users", get(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), require_admin));
//! # let _ = admin_routes;
//! ```
//!
//! In handlers, extract the caller from request extensions:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use portfolio::auth::Account;
//!
//! async fn protected_handler(Extension(account): Extension<Account>) -> String {
//!     format!("Authenticated as {}", account.email)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use portfolio::auth::Role;

use super::AppState;
use super::errors::{error_response, from_auth_error};

/// Bearer token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn authorize(state: AppState, role: Role, mut request: Request, next: Next) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return error_response(StatusCode::UNAUTHORIZED, "Missing bearer token").into_response();
    };

    match state.auth_manager.requires(token, role).await {
        Ok(account) => {
            request.extensions_mut().insert(account);
            next.run(request).await
        }
        Err(e) => from_auth_error(e).into_response(),
    }
}

/// Any authenticated account
pub async fn require_user(State(state): State<AppState>, request: Request, next: Next) -> Response {
    authorize(state, Role::User, request, next).await
}

/// Administrators only
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    authorize(state, Role::Admin, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
