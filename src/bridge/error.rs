//! Bridge failure taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::bridge::request::InputError;

/// Stable, caller-facing classification of a failed bridge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Validation,
    ConnectTimeout,
    ResponseTimeout,
    Protocol,
    InvalidResponse,
    Transport,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation_error",
            FailureKind::ConnectTimeout => "connect_timeout",
            FailureKind::ResponseTimeout => "response_timeout",
            FailureKind::Protocol => "protocol_error",
            FailureKind::InvalidResponse => "invalid_response",
            FailureKind::Transport => "transport_error",
            FailureKind::Internal => "internal_error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can terminate a bridge call.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Input rejected before any session was opened.
    #[error(transparent)]
    Validation(#[from] InputError),

    /// Voice service did not accept the WebSocket session in time.
    #[error("Timed out connecting to voice service after {}ms", .0.as_millis())]
    ConnectTimeout(Duration),

    /// Session opened but no usable reply arrived in time.
    #[error("Voice service did not respond within {}ms", .0.as_millis())]
    ResponseTimeout(Duration),

    /// Voice service could not be reached at all.
    #[error("Voice service unavailable: {0}")]
    Unavailable(String),

    /// Remote signalled an error or sent an unparseable message.
    #[error("Voice service error: {0}")]
    Protocol(String),

    /// Remote signalled success without the required reply fields.
    #[error("Invalid response from voice service: missing {0}")]
    InvalidResponse(&'static str),

    /// Connection failed or closed after it was established.
    #[error("Connection to voice service lost: {0}")]
    Transport(String),

    /// Local fault unrelated to the remote service.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            BridgeError::Validation(_) => FailureKind::Validation,
            BridgeError::ConnectTimeout(_) => FailureKind::ConnectTimeout,
            BridgeError::ResponseTimeout(_) => FailureKind::ResponseTimeout,
            BridgeError::Unavailable(_) | BridgeError::Transport(_) => FailureKind::Transport,
            BridgeError::Protocol(_) => FailureKind::Protocol,
            BridgeError::InvalidResponse(_) => FailureKind::InvalidResponse,
            BridgeError::Internal(_) => FailureKind::Internal,
        }
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
