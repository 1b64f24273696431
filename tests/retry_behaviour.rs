// Retry and backoff behaviour, driven through the gateway service with a scripted client on a paused clock.
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::body::Body;
use hyper::{Method, Request, Response, StatusCode};
use serde_json::json;
use tokio::time::Instant;
use triad_gateway::{
    GatewayService,
    config::GatewayConfig,
    ports::http_client::{HttpClient, HttpClientError, HttpClientResult},
};

#[derive(Clone)]
enum Step {
    Respond(u16, &'static str),
    Refuse,
    Hang,
}

struct ScriptedClient {
    script: Mutex<VecDeque<Step>>,
    attempts: Mutex<Vec<(Instant, String)>>,
}

impl ScriptedClient {
    fn new(script: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            attempts: Mutex::new(Vec::new()),
        })
    }

    fn attempts(&self) -> Vec<(Instant, String)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn send_request(&self, req: Request<Body>) -> HttpClientResult<Response<Body>> {
        self.attempts
            .lock()
            .unwrap()
            .push((Instant::now(), req.uri().to_string()));
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Refuse);
        match step {
            Step::Respond(status, body) => Ok(Response::builder()
                .status(status)
                .body(Body::from(body))
                .unwrap()),
            Step::Refuse => Err(HttpClientError::ConnectionError(
                "connection refused".to_string(),
            )),
            Step::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

fn config(attempts: u32) -> GatewayConfig {
    GatewayConfig::builder()
        .stack_url("http://stack:80")
        .linkedlist_url("http://linkedlist:8080")
        .graph_url("http://graph:5000")
        .timeout_seconds(10.0)
        .retry_attempts(attempts)
        .retry_base_sleep(0.2)
        .build()
        .unwrap()
}

fn gaps(attempts: &[(Instant, String)]) -> Vec<Duration> {
    attempts.windows(2).map(|w| w[1].0 - w[0].0).collect()
}

/// The paused clock fires timers on millisecond ticks; allow one tick per sleep.
fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual <= expected + Duration::from_millis(5),
        "expected about {expected:?}, got {actual:?}"
    );
}

fn assert_gaps(attempts: &[(Instant, String)], expected_ms: &[u64]) {
    let gaps = gaps(attempts);
    assert_eq!(gaps.len(), expected_ms.len());
    for (gap, ms) in gaps.into_iter().zip(expected_ms) {
        assert_close(gap, Duration::from_millis(*ms));
    }
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_transient_failures() {
    let client = ScriptedClient::new([
        Step::Refuse,
        Step::Refuse,
        Step::Respond(200, r#"{"stack":[1,2,3]}"#),
    ]);
    let service = GatewayService::new(&config(3), client.clone());

    let response = service.handle(&Method::GET, "/stack/data", b"").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), &json!({"stack": [1, 2, 3]}));
    let attempts = client.attempts();
    assert_eq!(attempts.len(), 3);
    assert!(attempts.iter().all(|(_, url)| url == "http://stack:80/stack"));
    assert_gaps(&attempts, &[200, 400]);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_refusals_are_503() {
    let client = ScriptedClient::new([Step::Refuse, Step::Refuse, Step::Refuse, Step::Refuse]);
    let service = GatewayService::new(&config(4), client.clone());
    let started = Instant::now();

    let response = service.handle(&Method::POST, "/stack/pop", b"").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body()["error"], "Stack service unavailable");
    assert_eq!(response.body()["details"], "connection refused");
    let attempts = client.attempts();
    assert_eq!(attempts.len(), 4);
    assert_gaps(&attempts, &[200, 400, 800]);
    // No sleep after the last attempt.
    assert_close(started.elapsed(), Duration::from_millis(1400));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_timeouts_are_504() {
    let client = ScriptedClient::new([Step::Hang, Step::Hang]);
    let service = GatewayService::new(&config(2), client.clone());
    let started = Instant::now();

    let response = service.handle(&Method::GET, "/graph/data", b"").await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.body(), &json!({"error": "Graph service timeout"}));
    assert_eq!(client.attempts().len(), 2);
    assert_close(started.elapsed(), Duration::from_millis(20_200));
}

#[tokio::test(start_paused = true)]
async fn test_last_failure_decides_status() {
    let client = ScriptedClient::new([Step::Hang, Step::Refuse]);
    let service = GatewayService::new(&config(2), client.clone());

    let response = service.handle(&Method::GET, "/list/data", b"").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body()["error"], "LinkedList service unavailable");
}

#[tokio::test(start_paused = true)]
async fn test_upstream_status_is_never_retried() {
    let client = ScriptedClient::new([
        Step::Respond(500, "boom"),
        Step::Respond(200, "{}"),
    ]);
    let service = GatewayService::new(&config(3), client.clone());

    let response = service
        .handle(&Method::POST, "/graph/add-node", br#"{"label":"A"}"#)
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body(), &json!({"upstream_raw": "boom"}));
    assert_eq!(client.attempts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_validation_failure_makes_no_attempt() {
    let client = ScriptedClient::new([]);
    let service = GatewayService::new(&config(3), client.clone());

    let response = service
        .handle(&Method::POST, "/stack/push", br#"{"value":"abc"}"#)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(client.attempts().is_empty());
}
