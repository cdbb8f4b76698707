//! Remote sink fan-out.
//!
//! # Responsibilities
//! - Attach the remote sinks selected by configuration to the root dispatch
//! - Register an exit-time drain for every attached sink
//! - Report construction failures (fatal) and delivery failures (logged)
//!
//! # Data Flow
//! ```text
//! Dispatch::dispatch(record)
//!     → RemoteSink::accept (non-blocking channel send)
//!     → BufferedSink worker thread (batch: size / interval / warn+ / drain)
//!     → Transport::send (agent TCP | hosted logging API)
//!     → on repeated failure: error record on <app>/ctxlog/<sink> (console only)
//! ```
//!
//! # Design Decisions
//! - Sink selection order is fixed: agent, metadata server, credentials file
//! - The credentials-file sink is the fallback whenever remote delivery is
//!   enabled and nothing else attached
//! - Construction errors and delivery errors are separate types: the first
//!   aborts startup, the second never leaves the worker

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::RemoteConfig;
use crate::context::LogIdentity;
use crate::lifecycle::exit;
use crate::logger::{Dispatch, Level, Record};

mod agent;
mod cloud;
mod credentials;
mod metadata;
mod payload;
mod retry;
mod worker;

pub use worker::BufferedSink;

/// A destination for rendered records beyond the console.
pub trait RemoteSink: Send + Sync {
    fn name(&self) -> &str;

    /// Queue `record` for delivery. Never blocks on I/O.
    fn accept(&self, record: &Record);

    /// Block until everything accepted so far has been delivered or dropped,
    /// or until `timeout` elapses.
    fn drain(&self, timeout: Duration) -> Result<(), DrainError>;
}

/// A requested remote sink could not be constructed. Fatal at startup.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("logging agent at {address} unreachable: {source}")]
    AgentUnreachable {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine project id from metadata server: {0}")]
    ProjectUnresolved(String),

    #[error("could not read credentials file {path}: {source}")]
    CredentialsUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed credentials file {path}: {message}")]
    CredentialsMalformed { path: String, message: String },

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("sink worker could not start: {0}")]
    Runtime(std::io::Error),

    #[error("sink worker exited during startup")]
    WorkerExited,
}

/// A batch could not be delivered. Logged, never fatal.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("access token unavailable: {0}")]
    Token(String),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A drain did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrainError {
    #[error("drain timed out after {0:?}")]
    Timeout(Duration),

    #[error("sink worker is gone")]
    Closed,
}

/// Batching and retry knobs shared by every sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub max_retries: u32,
}

impl BatchOptions {
    pub fn from_config(remote: &RemoteConfig) -> Self {
        Self {
            batch_size: remote.batch_size.max(1),
            flush_interval: remote.flush_interval(),
            max_retries: remote.max_retries,
        }
    }
}

/// Attach every configured remote sink to `dispatch`.
///
/// Diagnostics go to the console path under `<app_name>/ctxlog`. On a
/// construction failure the error is logged there before it is returned;
/// sinks attached before the failure stay attached and registered.
pub fn attach_remote_sinks(dispatch: &mut Dispatch, remote: &RemoteConfig, app_name: &str) -> Result<(), SinkError> {
    let diag = LogIdentity::root(Arc::new(dispatch.console_only()), &format!("{app_name}/ctxlog"));
    let options = BatchOptions::from_config(remote);
    let mut attached = false;

    if remote.use_logging_agent {
        let sink = agent::start(remote, options, diag.with_prefix(agent::NAME)).map_err(|e| fatal(&diag, e))?;
        install(dispatch, Arc::new(sink), remote.exit_timeout(), &diag);
        attached = true;
    }

    if remote.use_metadata_server {
        let sink = metadata::start(remote, options, diag.with_prefix(metadata::NAME)).map_err(|e| fatal(&diag, e))?;
        install(dispatch, Arc::new(sink), remote.exit_timeout(), &diag);
        attached = true;
    }

    if remote.use_credentials_file || !attached {
        let sink =
            credentials::start(remote, options, diag.with_prefix(credentials::NAME)).map_err(|e| fatal(&diag, e))?;
        install(dispatch, Arc::new(sink), remote.exit_timeout(), &diag);
    }

    Ok(())
}

fn fatal(diag: &LogIdentity, error: SinkError) -> SinkError {
    diag.emit(Level::Error, format_args!("Error creating remote logger"), Some(&error));
    error
}

fn install(dispatch: &mut Dispatch, sink: Arc<dyn RemoteSink>, timeout: Duration, diag: &LogIdentity) {
    dispatch.attach_sink(sink.clone());
    let diag = diag.clone();
    exit::register(move || {
        if let Err(e) = sink.drain(timeout) {
            diag.emit(
                Level::Warn,
                format_args!("sink '{}' did not drain before exit", sink.name()),
                Some(&e),
            );
        }
    });
}
