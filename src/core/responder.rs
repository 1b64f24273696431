//! Outcome classification and caller-facing response shaping.
//!
//! Every [`UpstreamOutcome`] maps to exactly one [`NormalizedResponse`]; this
//! module has no failure path of its own.
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use hyper::StatusCode;
use serde_json::{Map, Value, json};

use crate::core::{outcome::UpstreamOutcome, upstream::Upstream};

/// Field under which non-JSON upstream bodies are wrapped.
pub const RAW_BODY_FIELD: &str = "upstream_raw";

/// The only thing returned to callers: a status and a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    status: StatusCode,
    body: Value,
}

impl NormalizedResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// Local liveness answer; never depends on an upstream.
    pub fn health() -> Self {
        Self::new(StatusCode::OK, json!({ "status": "ok" }))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl IntoResponse for NormalizedResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Decode an upstream body as JSON, or wrap its text under [`RAW_BODY_FIELD`].
pub fn decode_or_wrap(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| {
        let mut wrapped = Map::new();
        wrapped.insert(
            RAW_BODY_FIELD.to_string(),
            Value::String(String::from_utf8_lossy(body).into_owned()),
        );
        Value::Object(wrapped)
    })
}

/// Shape the final outcome of a dispatch into the caller-facing response.
pub fn respond(upstream: Upstream, outcome: UpstreamOutcome) -> NormalizedResponse {
    match outcome {
        UpstreamOutcome::Success { status, body }
        | UpstreamOutcome::UpstreamError { status, body } => {
            if !(200..=599).contains(&status.as_u16()) {
                tracing::warn!(
                    upstream = upstream.label(),
                    "Upstream returned a status that cannot be forwarded: {}",
                    status
                );
                return NormalizedResponse::new(
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "error": format!("{upstream} service returned an invalid status"),
                        "details": status.as_u16().to_string(),
                    }),
                );
            }
            NormalizedResponse::new(status, decode_or_wrap(&body))
        }
        UpstreamOutcome::Timeout => NormalizedResponse::new(
            StatusCode::GATEWAY_TIMEOUT,
            json!({ "error": format!("{upstream} service timeout") }),
        ),
        UpstreamOutcome::TransportFailure { cause } => NormalizedResponse::new(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({
                "error": format!("{upstream} service unavailable"),
                "details": cause,
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn test_success_json_is_forwarded_unchanged() {
        let response = respond(
            Upstream::Graph,
            UpstreamOutcome::Success {
                status: StatusCode::CREATED,
                body: Bytes::from_static(br#"{"nodes":[],"edges":[]}"#),
            },
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body(), &json!({"nodes": [], "edges": []}));
    }

    #[test]
    fn test_plain_text_is_wrapped() {
        let response = respond(
            Upstream::Stack,
            UpstreamOutcome::Success {
                status: StatusCode::OK,
                body: Bytes::from_static(b"Stack is empty"),
            },
        );
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), &json!({"upstream_raw": "Stack is empty"}));
    }

    #[test]
    fn test_empty_body_is_wrapped() {
        assert_eq!(decode_or_wrap(b""), json!({"upstream_raw": ""}));
    }

    #[test]
    fn test_upstream_error_passes_through() {
        let response = respond(
            Upstream::Graph,
            UpstreamOutcome::UpstreamError {
                status: StatusCode::BAD_REQUEST,
                body: Bytes::from_static(br#"{"error":"Label is required"}"#),
            },
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body(), &json!({"error": "Label is required"}));
    }

    #[test]
    fn test_upstream_server_error_text_passes_through() {
        let response = respond(
            Upstream::LinkedList,
            UpstreamOutcome::UpstreamError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: Bytes::from_static(b"java.lang.NullPointerException"),
            },
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.body(),
            &json!({"upstream_raw": "java.lang.NullPointerException"})
        );
    }

    #[test]
    fn test_timeout_names_upstream() {
        let response = respond(Upstream::Stack, UpstreamOutcome::Timeout);
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(response.body(), &json!({"error": "Stack service timeout"}));
    }

    #[test]
    fn test_transport_failure_names_upstream_and_cause() {
        let response = respond(
            Upstream::LinkedList,
            UpstreamOutcome::TransportFailure {
                cause: "connection refused".into(),
            },
        );
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.body(),
            &json!({
                "error": "LinkedList service unavailable",
                "details": "connection refused"
            })
        );
    }

    #[test]
    fn test_unforwardable_status_becomes_bad_gateway() {
        let response = respond(
            Upstream::Graph,
            UpstreamOutcome::Success {
                status: StatusCode::from_u16(102).unwrap(),
                body: Bytes::new(),
            },
        );
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.body()["error"],
            "Graph service returned an invalid status"
        );
    }

    #[test]
    fn test_redirect_status_is_forwarded_not_followed() {
        let response = respond(
            Upstream::Stack,
            UpstreamOutcome::Success {
                status: StatusCode::MOVED_PERMANENTLY,
                body: Bytes::from_static(b"Moved"),
            },
        );
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.body(), &json!({"upstream_raw": "Moved"}));
    }

    #[test]
    fn test_health_response() {
        let response = NormalizedResponse::health();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), &json!({"status": "ok"}));
    }
}
