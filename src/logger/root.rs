//! The root logging handle returned by initialization.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing_subscriber::util::TryInitError;

use crate::backend::ConsoleMode;
use crate::context::{self, Context, LogIdentity};
use crate::lifecycle::exit;
use crate::logger::bridge;
use crate::logger::Level;
use crate::sinks::DrainError;

/// Context-free emission for top-level code, plus sink control.
#[derive(Debug, Clone)]
pub struct Logger {
    app_name: Arc<str>,
    root: LogIdentity,
}

impl Logger {
    pub(crate) fn new(app_name: &str, root: LogIdentity) -> Self {
        Self {
            app_name: Arc::from(app_name),
            root,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn identity(&self) -> &LogIdentity {
        &self.root
    }

    /// A fresh context carrying the root identity.
    pub fn context(&self) -> Context {
        context::attach(&Context::background(), self.root.clone())
    }

    pub fn level(&self) -> Level {
        self.root.dispatch().level()
    }

    pub fn console_mode(&self) -> ConsoleMode {
        self.root.dispatch().console().mode()
    }

    pub fn is_console_suppressed(&self) -> bool {
        self.root.dispatch().console().is_suppressed()
    }

    /// Names of the attached remote sinks, in attachment order.
    pub fn sink_names(&self) -> Vec<String> {
        self.root
            .dispatch()
            .sinks()
            .iter()
            .map(|sink| sink.name().to_string())
            .collect()
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>, error: Option<&dyn Error>) {
        self.root.emit(level, args, error);
    }

    pub fn info(&self, msg: &str) {
        self.log(Level::Info, format_args!("{msg}"), None);
    }

    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args, None);
    }

    pub fn warn(&self, msg: &str) {
        self.log(Level::Warn, format_args!("{msg}"), None);
    }

    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args, None);
    }

    pub fn error(&self, msg: &str) {
        self.log(Level::Error, format_args!("{msg}"), None);
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args, None);
    }

    pub fn debug(&self, msg: &str) {
        self.log(Level::Debug, format_args!("{msg}"), None);
    }

    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args, None);
    }

    pub fn trace(&self, msg: &str) {
        self.log(Level::Trace, format_args!("{msg}"), None);
    }

    pub fn tracef(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, args, None);
    }

    pub fn err(&self, error: &dyn Error, msg: &str) {
        self.log(Level::Error, format_args!("{msg}"), Some(error));
    }

    pub fn errf(&self, error: &dyn Error, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args, Some(error));
    }

    /// Drain every attached sink, sharing one `timeout` between them.
    ///
    /// Every sink is asked to drain even if an earlier one failed; the first
    /// failure is returned.
    pub fn flush(&self, timeout: Duration) -> Result<(), DrainError> {
        let deadline = Instant::now() + timeout;
        let mut result = Ok(());
        for sink in self.root.dispatch().sinks() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Err(e) = sink.drain(remaining) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    /// Run the exit handlers (draining every sink) and exit with `code`.
    pub fn exit(&self, code: i32) -> ! {
        exit::exit(code)
    }

    /// Route `tracing` events from other crates into this logger.
    ///
    /// Installs a global subscriber, so it succeeds at most once per process.
    pub fn install_tracing_bridge(&self) -> Result<(), TryInitError> {
        bridge::install(self.root.clone())
    }
}
