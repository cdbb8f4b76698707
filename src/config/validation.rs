//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs the remote sinks will dial
//! - Validate value ranges (batch size, intervals, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LoggingConfig → Result<(), Vec<ValidationError>>
//! - Remote settings are only checked when remote delivery is enabled

use std::net::ToSocketAddrs;

use thiserror::Error;
use url::Url;

use crate::config::schema::{LoggingConfig, RemoteConfig};

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &LoggingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if config.remote.enabled {
        validate_remote(&config.remote, &mut errors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_remote(remote: &RemoteConfig, errors: &mut Vec<ValidationError>) {
    if remote.log_name.is_empty() {
        errors.push(ValidationError::new("remote.log_name", "must not be empty"));
    } else if !remote
        .log_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-'))
    {
        errors.push(ValidationError::new(
            "remote.log_name",
            format!("'{}' may only contain [A-Za-z0-9_./-]", remote.log_name),
        ));
    }

    if remote.use_logging_agent && !is_socket_address(&remote.agent_address) {
        errors.push(ValidationError::new(
            "remote.agent_address",
            format!("'{}' is not a host:port address", remote.agent_address),
        ));
    }

    if let Err(message) = check_http_url(&remote.metadata_url) {
        errors.push(ValidationError::new("remote.metadata_url", message));
    }
    if let Err(message) = check_http_url(&remote.api_endpoint) {
        errors.push(ValidationError::new("remote.api_endpoint", message));
    }

    if remote.batch_size == 0 {
        errors.push(ValidationError::new("remote.batch_size", "must be greater than 0"));
    }
    if remote.flush_interval_ms == 0 {
        errors.push(ValidationError::new("remote.flush_interval_ms", "must be greater than 0"));
    }
    if remote.exit_timeout_ms == 0 {
        errors.push(ValidationError::new("remote.exit_timeout_ms", "must be greater than 0"));
    }
}

fn is_socket_address(address: &str) -> bool {
    match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok() && address.to_socket_addrs().is_ok(),
        None => false,
    }
}

fn check_http_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("'{raw}' is not a valid URL: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_config() -> LoggingConfig {
        let mut config = LoggingConfig::default();
        config.remote.enabled = true;
        config
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&LoggingConfig::default()).is_ok());
        assert!(validate_config(&remote_config()).is_ok());
    }

    #[test]
    fn test_disabled_remote_is_not_checked() {
        let mut config = LoggingConfig::default();
        config.remote.batch_size = 0;
        config.remote.api_endpoint = "nonsense".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = remote_config();
        config.remote.log_name = "bad name!".to_string();
        config.remote.api_endpoint = "ftp://logging.example.com".to_string();
        config.remote.batch_size = 0;
        config.remote.exit_timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "remote.log_name",
                "remote.api_endpoint",
                "remote.batch_size",
                "remote.exit_timeout_ms",
            ]
        );
    }

    #[test]
    fn test_agent_address_checked_only_for_agent_mode() {
        let mut config = remote_config();
        config.remote.agent_address = "localhost".to_string();
        assert!(validate_config(&config).is_ok());

        config.remote.use_logging_agent = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "remote.agent_address");

        config.remote.agent_address = "127.0.0.1:24224".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
