//! HTTP API for the portfolio backend.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework
//! - **Tower**: Middleware for CORS, security headers, authentication and rate limiting
//! - **JWT**: Bearer access tokens checked by [`AuthManager::requires`]
//!
//! # Modules
//!
//! - [`auth`]: Registration, login, token refresh and the caller's profile
//! - [`users`]: Account administration (admin only)
//! - [`middleware`]: Bearer-token authentication
//! - [`rate_limiter`]: Per-client limits on login and registration
//! - [`request_id`]: `x-request-id` propagation and request logging
//! - [`errors`]: Domain error to status code mapping
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                      - Store health (public)
//! POST   /api/auth/register           - Register (public, rate limited)
//! POST   /api/auth/login              - Login (public, rate limited)
//! POST   /api/auth/refresh            - New access token from a refresh token (public)
//! GET    /api/auth/me                 - Caller's profile (user)
//! GET    /api/users?search=           - List accounts (admin)
//! GET    /api/users/stats/count       - Account counts (admin)
//! GET    /api/users/{id}              - Get account (admin)
//! PUT    /api/users/{id}              - Update profile (admin)
//! PUT    /api/users/{id}/role?role=   - Change role (admin)
//! DELETE /api/users/{id}              - Delete account (admin)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use pf_server::api::{AppState, create_router};
//! use pf_server::config::RateLimitConfig;
//! use portfolio::{AuthConfig, SystemClock};
//! use portfolio::db::MemoryCredentialStore;
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let state = AppState::new(
//!     Arc::new(MemoryCredentialStore::new()),
//!     &AuthConfig::with_secret("jwt_secret"),
//!     Arc::new(SystemClock),
//!     RateLimitConfig::default(),
//! );
//!
//! let app = create_router(state, "http://localhost:3000");
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod errors;
pub mod middleware;
pub mod rate_limiter;
pub mod request_id;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use portfolio::{AuthConfig, AuthManager, Clock, UserManager, db::CredentialStore};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};

use crate::config::RateLimitConfig;
use rate_limiter::{KeyedRateLimiter, rate_limit_middleware};

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub user_manager: Arc<UserManager>,
    pub store: Arc<dyn CredentialStore>,
    pub login_limiter: Arc<KeyedRateLimiter>,
    pub register_limiter: Arc<KeyedRateLimiter>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        auth: &AuthConfig,
        clock: Arc<dyn Clock>,
        rate_limits: RateLimitConfig,
    ) -> Self {
        Self {
            auth_manager: Arc::new(AuthManager::new(store.clone(), auth, clock)),
            user_manager: Arc::new(UserManager::new(store.clone())),
            store,
            login_limiter: Arc::new(KeyedRateLimiter::per_minute(rate_limits.login_per_minute)),
            register_limiter: Arc::new(KeyedRateLimiter::per_minute(
                rate_limits.register_per_minute,
            )),
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// `frontend_url` is the only origin CORS admits.
pub fn create_router(state: AppState, frontend_url: &str) -> Router {
    let public_routes = Router::new()
        .route(
            "/auth/register",
            post(auth::register).layer(from_fn_with_state(
                state.register_limiter.clone(),
                rate_limit_middleware,
            )),
        )
        .route(
            "/auth/login",
            post(auth::login).layer(from_fn_with_state(
                state.login_limiter.clone(),
                rate_limit_middleware,
            )),
        )
        .route("/auth/refresh", post(auth::refresh));

    let user_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .layer(from_fn_with_state(state.clone(), middleware::require_user));

    let admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/stats/count", get(users::user_stats))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/role", put(users::update_user_role))
        .layer(from_fn_with_state(state.clone(), middleware::require_admin));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(from_fn(request_id::request_id_middleware))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(cors_layer(frontend_url))
        .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => layer.allow_origin([origin]),
        Err(_) => {
            tracing::warn!("Invalid FRONTEND_URL {:?}, CORS admits no origin", frontend_url);
            layer
        }
    }
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the credential store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8000/health
/// # {"status":"healthy","version":"1.0.0","database":true,"timestamp":"2025-11-22T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            false
        }
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
