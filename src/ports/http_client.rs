use async_trait::async_trait;
use axum::body::Body as AxumBody;
use hyper::{Request, Response};
use thiserror::Error;

/// Custom error type for HTTP client operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HttpClientError {
    /// The exchange failed at the transport level (refused, DNS, reset...)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The client gave up waiting for the upstream
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// The request could not be built or sent at all
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type alias for HTTP client operations
pub type HttpClientResult<T> = Result<T, HttpClientError>;

/// HttpClient defines the port (interface) for making HTTP requests to upstreams.
///
/// Implementations must be safe to share across concurrently running requests;
/// the gateway holds a single instance for the lifetime of the process.
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// Send an HTTP request to an upstream service
    ///
    /// # Arguments
    /// * `req` - The fully addressed request (absolute URI)
    ///
    /// # Returns
    /// The upstream's response head with a streaming body, or a transport error.
    /// Any HTTP status counts as a successful exchange.
    async fn send_request(&self, req: Request<AxumBody>) -> HttpClientResult<Response<AxumBody>>;
}
