//! Mapping from domain errors to HTTP responses.

use axum::{
    Json,
    extract::{
        Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use portfolio::{AuthError, UserError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Rejection returned by every handler
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Result type for JSON handlers
pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::DuplicateEmail | AuthError::InvalidEmail | AuthError::WeakPassword(_) => {
            StatusCode::BAD_REQUEST
        }
        AuthError::InvalidCredentials
        | AuthError::InvalidToken
        | AuthError::ExpiredToken
        | AuthError::UnknownAccount => StatusCode::UNAUTHORIZED,
        AuthError::AccountLocked { .. } | AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::HashingFailed | AuthError::TokenEncoding(_) | AuthError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn user_status(err: &UserError) -> StatusCode {
    match err {
        UserError::NotFound(_) => StatusCode::NOT_FOUND,
        UserError::LastAdmin | UserError::SelfDeletion => StatusCode::BAD_REQUEST,
        UserError::Auth(e) => auth_status(e),
        UserError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        Self {
            error: err.client_message(),
        }
    }
}

/// Convert an auth error, logging infrastructure failures before they are sanitised
pub fn from_auth_error(err: AuthError) -> ApiError {
    let status = auth_status(&err);
    if status.is_server_error() {
        tracing::error!("Auth operation failed: {}", err);
    }
    (status, Json(err.into()))
}

pub fn from_user_error(err: UserError) -> ApiError {
    let status = user_status(&err);
    if status.is_server_error() {
        tracing::error!("User operation failed: {}", err);
    }
    error_response(status, err.client_message())
}

/// Unwrap a JSON body, turning axum's plain-text rejection into an [`ErrorResponse`]
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(error_response(rejection.status(), rejection.body_text()))
        }
    }
}

pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    match query {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => Err(error_response(rejection.status(), rejection.body_text())),
    }
}

pub fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    match path {
        Ok(Path(value)) => Ok(value),
        Err(rejection) => Err(error_response(rejection.status(), rejection.body_text())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio::Role;
    use portfolio::db::StoreError;

    #[test]
    fn test_auth_status_mapping() {
        assert_eq!(auth_status(&AuthError::DuplicateEmail), StatusCode::BAD_REQUEST);
        assert_eq!(auth_status(&AuthError::InvalidEmail), StatusCode::BAD_REQUEST);
        assert_eq!(
            auth_status(&AuthError::WeakPassword("length".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(auth_status(&AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(auth_status(&AuthError::ExpiredToken), StatusCode::UNAUTHORIZED);
        assert_eq!(auth_status(&AuthError::UnknownAccount), StatusCode::UNAUTHORIZED);
        assert_eq!(
            auth_status(&AuthError::AccountLocked {
                remaining_minutes: 3
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(auth_status(&AuthError::Forbidden(Role::Admin)), StatusCode::FORBIDDEN);
        assert_eq!(auth_status(&AuthError::HashingFailed), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_user_status_mapping() {
        assert_eq!(user_status(&UserError::NotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(user_status(&UserError::LastAdmin), StatusCode::BAD_REQUEST);
        assert_eq!(user_status(&UserError::SelfDeletion), StatusCode::BAD_REQUEST);
        assert_eq!(
            user_status(&UserError::Auth(AuthError::WeakPassword("digit".to_string()))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_errors_are_sanitised() {
        let (status, Json(body)) = from_user_error(UserError::Store(StoreError::Database(
            sqlx::Error::PoolTimedOut,
        )));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }

    #[derive(Debug, Deserialize)]
    struct RoleArgs {
        #[allow(dead_code)]
        role: String,
    }

    #[test]
    fn test_query_rejection_becomes_error_body() {
        let uri: axum::http::Uri = "http://localhost/api/users/1/role".parse().unwrap();
        let rejection = Query::<RoleArgs>::try_from_uri(&uri).unwrap_err();

        let (status, Json(body)) = query_params::<RoleArgs>(Err(rejection)).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("role"));
    }
}
