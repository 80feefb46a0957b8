//! Structured logging configuration.
//!
//! The `portfolio` library logs through the `log` facade; the subscriber
//! installed here picks those records up alongside native `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use pf_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `email` - Account the event concerns, if known
/// * `client` - Client address or key
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use pf_server::logging::log_security_event;
///
/// log_security_event(
///     "account_locked",
///     Some("a@x.com"),
///     Some("192.168.1.1"),
///     "Account locked after repeated failures"
/// );
/// ```
pub fn log_security_event(
    event_type: &str,
    email: Option<&str>,
    client: Option<&str>,
    message: &str,
) {
    tracing::warn!(
        event_type = event_type,
        email = email,
        client = client,
        "SECURITY: {}",
        message
    );
}

/// Log API request/response
///
/// # Arguments
///
/// * `request_id` - Correlation ID from `x-request-id`
/// * `method` - HTTP method
/// * `path` - Request path
/// * `status_code` - Response status code
/// * `duration_ms` - Request duration in milliseconds
pub fn log_api_request(
    request_id: &str,
    method: &str,
    path: &str,
    status_code: u16,
    duration_ms: u64,
) {
    if status_code >= 500 {
        tracing::error!(
            request_id = request_id,
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request failed"
        );
    } else {
        tracing::info!(
            request_id = request_id,
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_log_security_event() {
        // Just ensure it doesn't panic
        log_security_event("test_event", Some("a@x.com"), Some("127.0.0.1"), "Test message");
        log_security_event("test_event", None, None, "Test message");
    }

    #[test]
    fn test_log_api_request() {
        log_api_request("req-1", "GET", "/api/users", 200, 45);
        log_api_request("req-2", "POST", "/api/auth/login", 500, 120);
    }
}
