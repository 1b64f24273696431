use std::{net::SocketAddr, time::Duration};

use crate::config::models::GatewayConfig;

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Gateway configuration validator
pub struct GatewayConfigValidator;

impl GatewayConfigValidator {
    /// Validate the entire gateway configuration, reporting every problem at once
    pub fn validate(config: &GatewayConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_listen_address(&config.listen_addr) {
            errors.push(e);
        }

        for (field, url) in [
            ("stack_url", &config.stack_url),
            ("linkedlist_url", &config.linkedlist_url),
            ("graph_url", &config.graph_url),
        ] {
            if let Err(e) = Self::validate_url(url, field) {
                errors.push(e);
            }
        }

        if config.upstream_retry_attempts == 0 {
            errors.push(ValidationError::InvalidField {
                field: "upstream_retry_attempts".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        match Duration::try_from_secs_f64(config.upstream_timeout_seconds) {
            Ok(timeout) if !timeout.is_zero() => {}
            _ => errors.push(ValidationError::InvalidField {
                field: "upstream_timeout_seconds".to_string(),
                message: format!(
                    "Must be a positive number of seconds that fits a duration, got {}",
                    config.upstream_timeout_seconds
                ),
            }),
        }

        if Duration::try_from_secs_f64(config.upstream_retry_base_sleep).is_err() {
            errors.push(ValidationError::InvalidField {
                field: "upstream_retry_base_sleep".to_string(),
                message: format!(
                    "Must be zero or a positive number of seconds that fits a duration, got {}",
                    config.upstream_retry_base_sleep
                ),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    fn validate_listen_address(address: &str) -> ValidationResult<()> {
        if address.parse::<SocketAddr>().is_err() {
            return Err(ValidationError::InvalidListenAddress {
                address: address.to_string(),
                reason: "Must be in format 'IP:PORT' (e.g., '127.0.0.1:5000' or '0.0.0.0:5000')"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn validate_url(url: &str, field: &str) -> ValidationResult<()> {
        let rest = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"));

        let Some(rest) = rest else {
            return Err(ValidationError::InvalidField {
                field: field.to_string(),
                message: format!("URL must start with http:// or https://, got: '{url}'"),
            });
        };

        if rest.is_empty() || rest.starts_with('/') {
            return Err(ValidationError::InvalidField {
                field: field.to_string(),
                message: format!("URL has no host: '{url}'"),
            });
        }

        if url.parse::<http::Uri>().is_err() {
            return Err(ValidationError::InvalidField {
                field: field.to_string(),
                message: format!("URL is not a valid URI: '{url}'"),
            });
        }

        Ok(())
    }

    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        if errors.len() == 1 {
            return errors[0].to_string();
        }

        let mut message = format!("{} configuration errors found:\n", errors.len());
        for (i, error) in errors.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        message
    }
}
