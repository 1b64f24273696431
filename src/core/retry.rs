//! Retry policy and the pure retry decision.
//!
//! The dispatcher feeds every attempt result through [`decide`], which either
//! settles the request with a final [`UpstreamOutcome`] or asks for another
//! attempt after a backoff delay. Keeping this free of I/O lets the retry
//! rules be tested without sockets or timers.
use std::time::Duration;

use bytes::Bytes;
use hyper::StatusCode;

use crate::core::outcome::UpstreamOutcome;

/// Attempt budget, backoff base and per-attempt deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    timeout_per_attempt: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one attempt.
    pub fn new(max_attempts: u32, base_delay: Duration, timeout_per_attempt: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            timeout_per_attempt,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn timeout_per_attempt(&self) -> Duration {
        self.timeout_per_attempt
    }

    /// Backoff after the given (1-based) attempt: `base_delay * 2^(attempt - 1)`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Upper bound on the time a single dispatch can take.
    pub fn worst_case_latency(&self) -> Duration {
        let max_backoff = self.delay(self.max_attempts.saturating_sub(1).max(1));
        self.timeout_per_attempt
            .saturating_add(max_backoff)
            .saturating_mul(self.max_attempts)
    }
}

/// Why a single attempt produced no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The per-attempt deadline elapsed.
    TimedOut,
    /// Connection refused, DNS failure, reset, broken body stream...
    Transport(String),
    /// The request could not be built or sent at all; retrying cannot help.
    Rejected(String),
}

impl AttemptFailure {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AttemptFailure::Rejected(_))
    }

    fn into_outcome(self) -> UpstreamOutcome {
        match self {
            AttemptFailure::TimedOut => UpstreamOutcome::Timeout,
            AttemptFailure::Transport(cause) | AttemptFailure::Rejected(cause) => {
                UpstreamOutcome::TransportFailure { cause }
            }
        }
    }
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::TimedOut => f.write_str("attempt timed out"),
            AttemptFailure::Transport(cause) => write!(f, "transport failure: {cause}"),
            AttemptFailure::Rejected(cause) => write!(f, "request rejected: {cause}"),
        }
    }
}

/// Result of one upstream attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// A complete response was received, whatever its status.
    Response { status: StatusCode, body: Bytes },
    Failed(AttemptFailure),
}

/// What the dispatcher does next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    Finish(UpstreamOutcome),
    RetryAfter(Duration),
}

/// Decide what follows attempt number `attempt` (1-based).
///
/// Responses always finish the request. Retryable failures retry while the
/// budget lasts; once it is spent the last failure decides between
/// `Timeout` and `TransportFailure`.
pub fn decide(policy: &RetryPolicy, attempt: u32, result: AttemptResult) -> RetryDecision {
    match result {
        AttemptResult::Response { status, body } => {
            RetryDecision::Finish(UpstreamOutcome::from_response(status, body))
        }
        AttemptResult::Failed(failure) => {
            if failure.is_retryable() && attempt < policy.max_attempts() {
                RetryDecision::RetryAfter(policy.delay(attempt))
            } else {
                RetryDecision::Finish(failure.into_outcome())
            }
        }
    }
}
