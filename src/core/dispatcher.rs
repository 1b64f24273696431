//! Upstream dispatch with bounded, transport-only retries.
//!
//! Each request gets at most `max_attempts` calls. Every call runs under the
//! per-attempt deadline, which covers both the response head and the complete
//! body. Any received response ends the loop immediately; only transport
//! failures and elapsed deadlines are retried, after sleeping
//! `base_delay * 2^(attempt - 1)`.
use std::{sync::Arc, time::Instant};

use axum::body::Body as AxumBody;
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode, header};
use tokio::time::{sleep, timeout};
use tracing::Instrument;

use crate::{
    core::{
        outcome::UpstreamOutcome,
        retry::{self, AttemptFailure, AttemptResult, RetryDecision, RetryPolicy},
        upstream::UpstreamTarget,
    },
    ports::http_client::{HttpClient, HttpClientError},
    tracing_setup,
};

/// Issues upstream calls through the shared client. Holds no per-request state.
pub struct Dispatcher {
    client: Arc<dyn HttpClient>,
    policy: RetryPolicy,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn HttpClient>, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run the attempt loop for one request and return its single outcome.
    pub async fn dispatch(&self, target: &UpstreamTarget, body: Option<Bytes>) -> UpstreamOutcome {
        let url = target.url();
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            let result = self.attempt(target, &url, body.clone(), attempt).await;
            let failure = match &result {
                AttemptResult::Failed(failure) => Some(failure.to_string()),
                AttemptResult::Response { .. } => None,
            };

            match retry::decide(&self.policy, attempt, result) {
                RetryDecision::Finish(outcome) => {
                    if let Some(failure) = failure {
                        tracing::error!(
                            upstream = target.upstream().label(),
                            url = %url,
                            attempts = attempt,
                            outcome = outcome.kind(),
                            "Upstream unreachable after {}/{} attempts: {}",
                            attempt,
                            max_attempts,
                            failure
                        );
                    }
                    return outcome;
                }
                RetryDecision::RetryAfter(delay) => {
                    tracing::warn!(
                        upstream = target.upstream().label(),
                        url = %url,
                        "Upstream attempt {}/{} failed: {}. sleep={:?}",
                        attempt,
                        max_attempts,
                        failure.as_deref().unwrap_or("unknown"),
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        target: &UpstreamTarget,
        url: &str,
        body: Option<Bytes>,
        attempt: u32,
    ) -> AttemptResult {
        let span = tracing_setup::create_upstream_span(
            target.upstream().label(),
            url,
            &target.method().to_string(),
            attempt,
        );

        async move {
            let request = match build_request(target, url, body) {
                Ok(request) => request,
                Err(e) => return AttemptResult::Failed(AttemptFailure::Rejected(e.to_string())),
            };

            let started = Instant::now();
            let exchange = async {
                let response = self.client.send_request(request).await?;
                let (parts, body) = response.into_parts();
                let bytes = body
                    .collect()
                    .await
                    .map_err(|e| {
                        HttpClientError::ConnectionError(format!(
                            "failed to read upstream response body: {e}"
                        ))
                    })?
                    .to_bytes();
                Ok::<(StatusCode, Bytes), HttpClientError>((parts.status, bytes))
            };

            match timeout(self.policy.timeout_per_attempt(), exchange).await {
                Ok(Ok((status, body))) => {
                    tracing::Span::current().record("http.status_code", status.as_u16());
                    tracing::debug!(
                        "Upstream answered {} with {} bytes in {:?}",
                        status,
                        body.len(),
                        started.elapsed()
                    );
                    AttemptResult::Response { status, body }
                }
                Ok(Err(HttpClientError::Timeout(_))) => {
                    AttemptResult::Failed(AttemptFailure::TimedOut)
                }
                Ok(Err(HttpClientError::InvalidRequest(message))) => {
                    AttemptResult::Failed(AttemptFailure::Rejected(message))
                }
                Ok(Err(HttpClientError::ConnectionError(cause))) => {
                    AttemptResult::Failed(AttemptFailure::Transport(cause))
                }
                Err(_) => {
                    tracing::debug!(
                        "Upstream attempt exceeded {:?}",
                        self.policy.timeout_per_attempt()
                    );
                    AttemptResult::Failed(AttemptFailure::TimedOut)
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn build_request(
    target: &UpstreamTarget,
    url: &str,
    body: Option<Bytes>,
) -> Result<Request<AxumBody>, hyper::http::Error> {
    let builder = Request::builder()
        .method(target.method().as_method())
        .uri(url);

    match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(AxumBody::from(payload)),
        None => builder.body(AxumBody::empty()),
    }
}
