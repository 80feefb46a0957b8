//! Portfolio HTTP server library.
//!
//! Exposes the router, configuration and logging setup so integration tests
//! can drive the API without binding a socket.

pub mod api;
pub mod config;
pub mod logging;
