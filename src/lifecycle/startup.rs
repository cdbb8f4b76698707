//! Startup orchestration.
//!
//! # Responsibilities
//! - Select the console backend from terminal state and configuration
//! - Attach remote sinks when remote delivery is enabled
//! - Build the root identity and attach it to a fresh context
//!
//! # Design Decisions
//! - Fail fast: a requested remote sink that cannot be built is fatal
//! - Sinks are attached before the dispatch is shared, so emission never
//!   observes a partially configured root
//! - Terminal state and the console writer are injectable for tests

use std::io::{self, Write};
use std::sync::Arc;

use crate::backend::{ConsoleBackend, TerminalState};
use crate::config::LoggingConfig;
use crate::context::{self, Context, LogIdentity};
use crate::lifecycle::exit;
use crate::logger::{Dispatch, Logger};
use crate::sinks::{attach_remote_sinks, SinkError};

/// Root logger construction with overridable environment probes.
pub struct Builder {
    app_name: String,
    config: LoggingConfig,
    is_terminal: Option<bool>,
    writer: Option<Box<dyn Write + Send>>,
}

impl Builder {
    pub fn new(app_name: impl Into<String>, config: LoggingConfig) -> Self {
        Self {
            app_name: app_name.into(),
            config,
            is_terminal: None,
            writer: None,
        }
    }

    /// Use `is_terminal` instead of probing stdout.
    pub fn terminal(mut self, is_terminal: bool) -> Self {
        self.is_terminal = Some(is_terminal);
        self
    }

    /// Write console output to `writer` instead of stdout.
    pub fn writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Build the root context and logger.
    ///
    /// Fatal sink errors have already been logged on the console path when
    /// this returns them.
    pub fn build(self) -> Result<(Context, Logger), SinkError> {
        let state = match self.is_terminal {
            Some(is_terminal) => TerminalState::from_config(is_terminal, &self.config.console),
            None => TerminalState::detect(&self.config.console),
        };
        let writer = self.writer.unwrap_or_else(|| Box::new(io::stdout()));
        let console = ConsoleBackend::select(state, writer, self.config.console.disable);

        let mut dispatch = Dispatch::new(self.config.level, console);
        if self.config.remote.enabled {
            attach_remote_sinks(&mut dispatch, &self.config.remote, &self.app_name)?;
        }

        let root = LogIdentity::root(Arc::new(dispatch), &self.app_name);
        let ctx = context::attach(&Context::background(), root.clone());
        Ok((ctx, Logger::new(&self.app_name, root)))
    }
}

/// Initialize the root logger for `app_name`.
pub fn try_init(app_name: &str, config: &LoggingConfig) -> Result<(Context, Logger), SinkError> {
    Builder::new(app_name, config.clone()).build()
}

/// Initialize the root logger, exiting with status 1 on a fatal sink error.
///
/// The error has been written to the configured console and the exit
/// handlers of any sinks attached before the failure have run by the time it
/// exits.
pub fn init(app_name: &str, config: &LoggingConfig) -> (Context, Logger) {
    match try_init(app_name, config) {
        Ok(root) => root,
        Err(_) => exit::exit(1),
    }
}
