//! Response mapping.
//!
//! # Responsibilities
//! - Map bridge failures to HTTP status codes
//! - Render every failure as `{"error": ..., "kind": ...}`
//!
//! # Status Codes
//! ```text
//! validation_error                                 400
//! connect_timeout, response_timeout                504
//! voice service unreachable                        503
//! protocol_error, invalid_response, lost session   502
//! internal_error                                   500
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::bridge::BridgeError;

/// Body of every failed bridge call.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

pub fn status_for(error: &BridgeError) -> StatusCode {
    match error {
        BridgeError::Validation(_) => StatusCode::BAD_REQUEST,
        BridgeError::ConnectTimeout(_) | BridgeError::ResponseTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        BridgeError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        BridgeError::Protocol(_) | BridgeError::InvalidResponse(_) | BridgeError::Transport(_) => {
            StatusCode::BAD_GATEWAY
        }
        BridgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind().as_str(),
        };
        (status_for(&self), Json(body)).into_response()
    }
}
