use hyper::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::core::responder::NormalizedResponse;

/// Failures resolved inside the gateway without any upstream traffic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GatewayError {
    /// No route for this method + path
    #[error("Route not found: {method} {path}")]
    RoutingMiss { method: String, path: String },

    /// The inbound body failed route-specific validation
    #[error("{0}")]
    Validation(String),

    /// The inbound body could not be read
    #[error("Invalid request body: {0}")]
    UnreadableBody(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RoutingMiss { .. } => StatusCode::NOT_FOUND,
            GatewayError::Validation(_) | GatewayError::UnreadableBody(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// Render as the caller-facing JSON error.
    pub fn to_response(&self) -> NormalizedResponse {
        let body = match self {
            GatewayError::RoutingMiss { method, path } => json!({
                "error": "Route not found",
                "method": method,
                "path": path,
            }),
            other => json!({ "error": other.to_string() }),
        };
        NormalizedResponse::new(self.status(), body)
    }
}
