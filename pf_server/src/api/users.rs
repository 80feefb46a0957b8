//! User administration API handlers.
//!
//! Every route here sits behind [`require_admin`](super::middleware::require_admin).

use axum::{
    Json,
    extract::{
        Extension, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use portfolio::auth::{Account, AccountId, AccountProfile, Role};
use portfolio::users::{ProfileUpdate, UserStats};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::errors::{
    ApiResult, error_response, from_user_error, json_body, path_param, query_params,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// List accounts newest first, optionally filtered by `?search=`
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<AccountProfile>> {
    let query = query_params(query)?;
    let accounts = state
        .user_manager
        .list(query.search.as_deref())
        .await
        .map_err(from_user_error)?;

    Ok(Json(accounts.iter().map(Account::profile).collect()))
}

/// Account counts by role
pub async fn user_stats(State(state): State<AppState>) -> ApiResult<UserStats> {
    let stats = state.user_manager.stats().await.map_err(from_user_error)?;
    Ok(Json(stats))
}

pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<AccountId>, PathRejection>,
) -> ApiResult<AccountProfile> {
    let id = path_param(id)?;
    let account = state.user_manager.get(id).await.map_err(from_user_error)?;
    Ok(Json(account.profile()))
}

/// Update name, bio or image. Omitted fields are left unchanged.
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<AccountId>, PathRejection>,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<AccountProfile> {
    let id = path_param(id)?;
    let update = json_body(body)?;
    let account = state
        .user_manager
        .update_profile(id, update)
        .await
        .map_err(from_user_error)?;

    Ok(Json(account.profile()))
}

/// Change an account's role via `?role=USER|ADMIN`
///
/// # Errors
///
/// - `400 Bad Request`: Unknown role, or demoting the last administrator
/// - `404 Not Found`: No such account
pub async fn update_user_role(
    State(state): State<AppState>,
    id: Result<Path<AccountId>, PathRejection>,
    query: Result<Query<RoleQuery>, QueryRejection>,
) -> ApiResult<MessageResponse> {
    let id = path_param(id)?;
    let query = query_params(query)?;
    let role: Role = query
        .role
        .parse()
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid role"))?;

    state
        .user_manager
        .update_role(id, role)
        .await
        .map_err(from_user_error)?;

    Ok(Json(MessageResponse {
        message: format!("Role updated to {role}"),
    }))
}

/// Delete an account
///
/// # Errors
///
/// - `400 Bad Request`: Deleting yourself, or the last administrator
/// - `404 Not Found`: No such account
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(acting): Extension<Account>,
    id: Result<Path<AccountId>, PathRejection>,
) -> ApiResult<MessageResponse> {
    let id = path_param(id)?;
    state
        .user_manager
        .delete(id, acting.id)
        .await
        .map_err(from_user_error)?;

    Ok(Json(MessageResponse {
        message: "User deleted".to_string(),
    }))
}
