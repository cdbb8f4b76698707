//! Configuration schema definitions.
//!
//! Every section defaults, so an empty file (or no file) is a valid
//! configuration: info level, auto-detected console, no remote delivery.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logger::Level;

/// Root logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level emitted by the root logger.
    pub level: Level,

    /// Local console output.
    pub console: ConsoleConfig,

    /// Remote telemetry delivery.
    pub remote: RemoteConfig,
}

/// Console output overrides.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Discard console output entirely.
    pub disable: bool,

    /// Always render JSON lines, even on a terminal.
    pub force_json: bool,

    /// Render for a terminal even when stdout is not one.
    pub force_tty: bool,
}

/// Remote sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,

    /// Ship records to a local logging agent.
    pub use_logging_agent: bool,

    /// Discover the project from the instance metadata server.
    pub use_metadata_server: bool,

    /// Authenticate with a service-account key file.
    pub use_credentials_file: bool,

    /// Path to the service-account key file.
    pub credentials_path: PathBuf,

    /// Log name (and agent tag) records are written under.
    pub log_name: String,

    /// Local agent forward address (host:port).
    pub agent_address: String,

    pub metadata_url: String,

    /// Base URL of the hosted logging API.
    pub api_endpoint: String,

    /// Records per delivery batch.
    pub batch_size: usize,

    /// Maximum time a record waits in the buffer.
    pub flush_interval_ms: u64,

    /// Retries per batch before it is dropped.
    pub max_retries: u32,

    /// Upper bound on the exit-time drain.
    pub exit_timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            use_logging_agent: false,
            use_metadata_server: false,
            use_credentials_file: false,
            credentials_path: PathBuf::new(),
            log_name: "ctxlog".to_string(),
            agent_address: "127.0.0.1:24224".to_string(),
            metadata_url: "http://metadata.google.internal".to_string(),
            api_endpoint: "https://logging.googleapis.com".to_string(),
            batch_size: 100,
            flush_interval_ms: 1000,
            max_retries: 3,
            exit_timeout_ms: 10_000,
        }
    }
}

impl RemoteConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn exit_timeout(&self) -> Duration {
        Duration::from_millis(self.exit_timeout_ms)
    }
}
