//! Configuration data structures for the gateway.
//!
//! These types are deserialized from process environment variables (optionally
//! layered over a TOML / YAML / JSON file). Only the three upstream URLs are
//! required; every tuning knob carries a default so a minimal deployment only
//! has to export `STACK_URL`, `LINKEDLIST_URL` and `GRAPH_URL`.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::retry::RetryPolicy;

fn default_listen_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_timeout_seconds() -> f64 {
    10.0
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_base_sleep() -> f64 {
    0.2
}

fn default_cors_enabled() -> bool {
    true
}

/// Immutable gateway configuration, built once at startup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GatewayConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Base URL of the stack service, e.g. `http://stack-service:80`
    pub stack_url: String,
    /// Base URL of the linked-list service, e.g. `http://linkedlist-service:8080`
    pub linkedlist_url: String,
    /// Base URL of the graph service, e.g. `http://graph-service:5000`
    pub graph_url: String,
    /// Deadline for a single upstream attempt, in seconds
    #[serde(default = "default_timeout_seconds")]
    pub upstream_timeout_seconds: f64,
    /// Total attempts per request, including the first one
    #[serde(default = "default_retry_attempts")]
    pub upstream_retry_attempts: u32,
    /// Backoff base in seconds; attempt n sleeps `base * 2^(n-1)`
    #[serde(default = "default_retry_base_sleep")]
    pub upstream_retry_base_sleep: f64,
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
}

impl GatewayConfig {
    /// Create a new gateway configuration builder
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Strip trailing slashes from the upstream base URLs so that route paths
    /// can be appended verbatim.
    pub fn normalize(mut self) -> Self {
        for url in [
            &mut self.stack_url,
            &mut self.linkedlist_url,
            &mut self.graph_url,
        ] {
            let trimmed_len = url.trim_end_matches('/').len();
            url.truncate(trimmed_len);
        }
        self
    }

    /// Derive the retry policy handed to the dispatcher.
    ///
    /// Durations that cannot be represented (negative, NaN, infinite or too
    /// large) collapse to zero. `GatewayConfigValidator` rejects all of them,
    /// and the binary validates before building anything.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.upstream_retry_attempts,
            Duration::try_from_secs_f64(self.upstream_retry_base_sleep).unwrap_or_default(),
            Duration::try_from_secs_f64(self.upstream_timeout_seconds).unwrap_or_default(),
        )
    }
}

/// Builder for GatewayConfig, mostly used by embedders and tests
pub struct GatewayConfigBuilder {
    listen_addr: String,
    stack_url: Option<String>,
    linkedlist_url: Option<String>,
    graph_url: Option<String>,
    upstream_timeout_seconds: f64,
    upstream_retry_attempts: u32,
    upstream_retry_base_sleep: f64,
    cors_enabled: bool,
}

impl Default for GatewayConfigBuilder {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            stack_url: None,
            linkedlist_url: None,
            graph_url: None,
            upstream_timeout_seconds: default_timeout_seconds(),
            upstream_retry_attempts: default_retry_attempts(),
            upstream_retry_base_sleep: default_retry_base_sleep(),
            cors_enabled: default_cors_enabled(),
        }
    }
}

impl GatewayConfigBuilder {
    /// Set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    pub fn stack_url(mut self, url: impl Into<String>) -> Self {
        self.stack_url = Some(url.into());
        self
    }

    pub fn linkedlist_url(mut self, url: impl Into<String>) -> Self {
        self.linkedlist_url = Some(url.into());
        self
    }

    pub fn graph_url(mut self, url: impl Into<String>) -> Self {
        self.graph_url = Some(url.into());
        self
    }

    /// Point all three upstreams at the same base URL (handy for a single mock server)
    pub fn all_upstreams(self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.stack_url(url.clone())
            .linkedlist_url(url.clone())
            .graph_url(url)
    }

    pub fn timeout_seconds(mut self, secs: f64) -> Self {
        self.upstream_timeout_seconds = secs;
        self
    }

    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.upstream_retry_attempts = attempts;
        self
    }

    pub fn retry_base_sleep(mut self, secs: f64) -> Self {
        self.upstream_retry_base_sleep = secs;
        self
    }

    pub fn cors_enabled(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    /// Build the final GatewayConfig
    pub fn build(self) -> Result<GatewayConfig, String> {
        let stack_url = self
            .stack_url
            .ok_or_else(|| "stack_url is required".to_string())?;
        let linkedlist_url = self
            .linkedlist_url
            .ok_or_else(|| "linkedlist_url is required".to_string())?;
        let graph_url = self
            .graph_url
            .ok_or_else(|| "graph_url is required".to_string())?;

        Ok(GatewayConfig {
            listen_addr: self.listen_addr,
            stack_url,
            linkedlist_url,
            graph_url,
            upstream_timeout_seconds: self.upstream_timeout_seconds,
            upstream_retry_attempts: self.upstream_retry_attempts,
            upstream_retry_base_sleep: self.upstream_retry_base_sleep,
            cors_enabled: self.cors_enabled,
        }
        .normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_upstream_urls() {
        let err = GatewayConfig::builder()
            .stack_url("http://stack")
            .graph_url("http://graph")
            .build()
            .unwrap_err();
        assert_eq!(err, "linkedlist_url is required");
    }

    #[test]
    fn test_builder_defaults() {
        let config = GatewayConfig::builder()
            .all_upstreams("http://upstream:8080")
            .build()
            .unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:5000");
        assert_eq!(config.upstream_timeout_seconds, 10.0);
        assert_eq!(config.upstream_retry_attempts, 3);
        assert_eq!(config.upstream_retry_base_sleep, 0.2);
        assert!(config.cors_enabled);
    }

    #[test]
    fn test_normalize_strips_trailing_slashes() {
        let config = GatewayConfig::builder()
            .stack_url("http://stack:80/")
            .linkedlist_url("http://list:8080//")
            .graph_url("http://graph:5000")
            .build()
            .unwrap();
        assert_eq!(config.stack_url, "http://stack:80");
        assert_eq!(config.linkedlist_url, "http://list:8080");
        assert_eq!(config.graph_url, "http://graph:5000");
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = GatewayConfig::builder()
            .all_upstreams("http://upstream")
            .timeout_seconds(1.5)
            .retry_attempts(4)
            .retry_base_sleep(0.25)
            .build()
            .unwrap();
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.base_delay(), Duration::from_millis(250));
        assert_eq!(policy.timeout_per_attempt(), Duration::from_millis(1500));
    }
}
