use bytes::Bytes;
use hyper::StatusCode;

/// Final result of dispatching one request upstream, after all retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// The upstream answered with a status below 400.
    Success { status: StatusCode, body: Bytes },
    /// The upstream answered with a status of 400 or above.
    UpstreamError { status: StatusCode, body: Bytes },
    /// No response could be obtained; carries the last cause.
    TransportFailure { cause: String },
    /// The last attempt exceeded its deadline.
    Timeout,
}

impl UpstreamOutcome {
    /// Classify a received response by status.
    pub fn from_response(status: StatusCode, body: Bytes) -> Self {
        if status.as_u16() >= 400 {
            UpstreamOutcome::UpstreamError { status, body }
        } else {
            UpstreamOutcome::Success { status, body }
        }
    }

    /// Short tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamOutcome::Success { .. } => "success",
            UpstreamOutcome::UpstreamError { .. } => "upstream_error",
            UpstreamOutcome::TransportFailure { .. } => "transport_failure",
            UpstreamOutcome::Timeout => "timeout",
        }
    }
}
