//! Per-client rate limiting for the public authentication endpoints.
//!
//! Limits how many login or registration requests a single client can make
//! within a sliding window, independently of the per-account lockout.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::errors::error_response;
use crate::logging::log_security_event;

/// Client key used when no address can be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Tracked clients above which idle entries are pruned
const PRUNE_THRESHOLD: usize = 10_000;

/// Rate limiter using a sliding window algorithm
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of recent requests
    timestamps: VecDeque<Instant>,
    /// Maximum number of requests allowed in the window
    max_requests: usize,
    /// Time window for rate limiting
    window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    ///
    /// * `max_requests` - Maximum number of requests allowed in the time window
    /// * `window` - Time window duration
    ///
    /// # Example
    ///
    /// ```
    /// use pf_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// // Allow 10 requests per minute
    /// let limiter = RateLimiter::new(10, Duration::from_secs(60));
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// Check if a request should be allowed
    ///
    /// Returns `true` if the request is allowed, `false` if rate limit exceeded.
    ///
    /// # Example
    ///
    /// ```
    /// # use pf_server::api::rate_limiter::RateLimiter;
    /// # use std::time::Duration;
    /// let mut limiter = RateLimiter::new(5, Duration::from_secs(1));
    ///
    /// // First 5 requests allowed
    /// for _ in 0..5 {
    ///     assert!(limiter.check());
    /// }
    ///
    /// // 6th request blocked
    /// assert!(!limiter.check());
    /// ```
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    /// [`check`](Self::check) against an explicit instant
    pub fn check_at(&mut self, now: Instant) -> bool {
        self.evict(now);

        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }

    /// Time until the oldest request leaves the window
    ///
    /// Returns `None` if there are no requests in the current window.
    pub fn reset_in(&self, now: Instant) -> Option<Duration> {
        self.timestamps.front().map(|oldest| {
            let elapsed = now.saturating_duration_since(*oldest);
            self.window.saturating_sub(elapsed)
        })
    }

    fn evict(&mut self, now: Instant) {
        while let Some(ts) = self.timestamps.front() {
            if now.saturating_duration_since(*ts) >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn is_idle(&mut self, now: Instant) -> bool {
        self.evict(now);
        self.timestamps.is_empty()
    }
}

/// Sliding-window limiter keyed by client
#[derive(Debug)]
pub struct KeyedRateLimiter {
    clients: Mutex<HashMap<String, RateLimiter>>,
    max_requests: usize,
    window: Duration,
}

impl KeyedRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// `max_requests` per minute per client
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Record a request from `client`. On rejection, returns how long until
    /// the client may retry.
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: &str, now: Instant) -> Result<(), Duration> {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        if clients.len() > PRUNE_THRESHOLD {
            clients.retain(|_, limiter| !limiter.is_idle(now));
        }

        let limiter = clients
            .entry(client.to_string())
            .or_insert_with(|| RateLimiter::new(self.max_requests, self.window));

        if limiter.check_at(now) {
            Ok(())
        } else {
            Err(limiter.reset_in(now).unwrap_or(self.window))
        }
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Identify the client: socket address, then `X-Forwarded-For`, then `unknown`
pub fn client_key(connect_info: Option<SocketAddr>, headers: &HeaderMap) -> String {
    if let Some(addr) = connect_info {
        return addr.ip().to_string();
    }

    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware rejecting clients over their limit with `429 Too Many Requests`
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<KeyedRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let connect_info = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(connect_info, request.headers());

    match limiter.check(&client) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            log_security_event(
                "rate_limited",
                None,
                Some(&client),
                &format!("Too many requests to {}", request.uri().path()),
            );

            let mut response = error_response(
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please try again later",
            )
            .into_response();
            let secs = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
            response
        }
    }
}
