//! Request ID middleware for log correlation.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::logging::log_api_request;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied ID that is echoed back
const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse the caller's request ID when it is sane, otherwise generate one
fn get_or_generate_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Middleware to add a request ID to every response and log each request
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use pf_server::api::request_id::request_id_middleware;
///
/// # async fn example() {
/// let app: Router = Router::new()
///     .route("/", get(|| async { "Hello" }))
///     .layer(middleware::from_fn(request_id_middleware));
/// # }
/// ```
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let request_id = get_or_generate_request_id(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    log_api_request(
        &request_id,
        method.as_str(),
        &path,
        response.status().as_u16(),
        started.elapsed().as_millis() as u64,
    );

    response
}
