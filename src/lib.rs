//! Voice demo bridge library.
//!
//! Turns one HTTP call into one WebSocket exchange with a voice service and
//! reports that service's health.

pub mod bridge;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use bridge::{Bridge, BridgeError, BridgeReply, FailureKind};
pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
