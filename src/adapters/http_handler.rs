use std::sync::Arc;

use axum::{
    Router,
    body::{Body as AxumBody, Bytes, to_bytes},
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;

use crate::{
    core::{GatewayError, GatewayService, body::BodyRule, router::RouteMatch},
    tracing_setup,
};

/// Largest inbound body the gateway will buffer.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// HTTP handler for the gateway: the axum-facing side of [`GatewayService`].
#[derive(Clone)]
pub struct HttpHandler {
    gateway_service: Arc<GatewayService>,
}

impl HttpHandler {
    pub fn new(gateway_service: Arc<GatewayService>) -> Self {
        Self { gateway_service }
    }

    /// Build the axum router. Every path goes through [`HttpHandler::handle_request`]
    /// so that routing misses are answered with the gateway's own JSON 404.
    pub fn router(self, cors_enabled: bool) -> Router {
        let router = Router::new()
            .fallback(handle)
            .with_state(self)
            .layer(TraceLayer::new_for_http());

        if cors_enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Main request handler: read the body when the matched route uses one,
    /// hand it to the gateway service and render the normalized response.
    pub async fn handle_request(&self, req: Request<AxumBody>) -> Response {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing_setup::create_request_span(method.as_str(), &path, &request_id);

        async move {
            tracing::info!("Handling {} request to {}", method, path);

            // Misses, health checks and body-less routes never read the body.
            let reads_body = match self.gateway_service.routes().resolve(&method, &path) {
                RouteMatch::Forward(route) => route.body_rule() != BodyRule::Empty,
                RouteMatch::Health | RouteMatch::Miss => false,
            };

            let body = if reads_body {
                match to_bytes(req.into_body(), MAX_BODY_BYTES).await {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::warn!("Failed to read request body: {}", e);
                        let response = GatewayError::UnreadableBody(e.to_string()).to_response();
                        tracing::Span::current()
                            .record("http.status_code", response.status().as_u16());
                        return response.into_response();
                    }
                }
            } else {
                Bytes::new()
            };

            let response = self.gateway_service.handle(&method, &path, &body).await;
            tracing::Span::current().record("http.status_code", response.status().as_u16());
            tracing::info!("Completed {} {} with {}", method, path, response.status());
            response.into_response()
        }
        .instrument(span)
        .await
    }
}

async fn handle(State(handler): State<HttpHandler>, req: Request) -> Response {
    handler.handle_request(req).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use hyper::{Method, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::GatewayConfig,
        ports::http_client::{HttpClient, HttpClientError, HttpClientResult},
    };

    /// Refuses every connection.
    struct UnreachableClient;

    #[async_trait]
    impl HttpClient for UnreachableClient {
        async fn send_request(
            &self,
            _req: hyper::Request<AxumBody>,
        ) -> HttpClientResult<hyper::Response<AxumBody>> {
            Err(HttpClientError::ConnectionError("connection refused".into()))
        }
    }

    fn router() -> Router {
        let config = GatewayConfig::builder()
            .all_upstreams("http://127.0.0.1:9")
            .retry_attempts(1)
            .build()
            .unwrap();
        let service = GatewayService::new(&config, Arc::new(UnreachableClient));
        HttpHandler::new(Arc::new(service)).router(config.cors_enabled)
    }

    async fn send(router: Router, method: Method, path: &str, body: &str) -> (StatusCode, Value) {
        let request = hyper::Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(AxumBody::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_without_upstreams() {
        let (status, body) = send(router(), Method::GET, "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = send(router(), Method::GET, "/unknown-path", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");
    }

    #[tokio::test]
    async fn test_validation_failure_is_400() {
        let (status, body) = send(router(), Method::POST, "/stack/push", r#"{"value":"abc"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request: 'value' must be an integer");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_503() {
        let (status, body) = send(router(), Method::GET, "/graph/data", "").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Graph service unavailable");
        assert_eq!(body["details"], "connection refused");
    }

    #[tokio::test]
    async fn test_oversized_body_is_400() {
        let huge = "x".repeat(MAX_BODY_BYTES + 1);
        let (status, body) = tokio::time::timeout(
            Duration::from_secs(5),
            send(router(), Method::POST, "/list/add", &huge),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_oversized_body_does_not_mask_routing() {
        let huge = "x".repeat(MAX_BODY_BYTES + 1);

        let (status, body) = send(router(), Method::POST, "/unknown-path", &huge).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");

        let (status, _) = send(router(), Method::GET, "/health", &huge).await;
        assert_eq!(status, StatusCode::OK);

        // Body-less routes ignore the payload and go straight to the upstream.
        let (status, body) = send(router(), Method::POST, "/stack/pop", &huge).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Stack service unavailable");
    }

    #[tokio::test]
    async fn test_cors_preflight_is_answered() {
        let request = hyper::Request::builder()
            .method(Method::OPTIONS)
            .uri("/stack/push")
            .header(header::ORIGIN, "http://ui.local")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(AxumBody::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }
}
