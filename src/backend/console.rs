//! The console output path.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use super::selector::{select_mode, ConsoleMode, TerminalState};
use crate::format::{Formatter, JsonFormatter, TextFormatter};
use crate::logger::Record;

/// Formatter plus destination for locally rendered records.
pub struct ConsoleBackend {
    mode: ConsoleMode,
    suppressed: bool,
    formatter: Box<dyn Formatter>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleBackend {
    /// Build a backend for `mode` writing to `out`.
    ///
    /// When `suppressed` is set the destination is replaced with a sink that
    /// accepts and drops every write; the mode is unaffected.
    pub fn new(mode: ConsoleMode, out: Box<dyn Write + Send>, suppressed: bool) -> Self {
        let formatter: Box<dyn Formatter> = match mode {
            ConsoleMode::Interactive => Box::new(TextFormatter::new(true)),
            ConsoleMode::MachineReadable => Box::new(JsonFormatter::new()),
        };
        let out: Box<dyn Write + Send> = if suppressed { Box::new(io::sink()) } else { out };
        Self {
            mode,
            suppressed,
            formatter,
            out: Mutex::new(out),
        }
    }

    /// Select the mode from `state` and build the backend.
    pub fn select(state: TerminalState, out: Box<dyn Write + Send>, suppressed: bool) -> Self {
        Self::new(select_mode(state), out, suppressed)
    }

    /// Machine-readable records on stderr.
    pub fn stderr() -> Self {
        Self::new(ConsoleMode::MachineReadable, Box::new(io::stderr()), false)
    }

    pub fn mode(&self) -> ConsoleMode {
        self.mode
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Render and write one record. Failures are dropped.
    pub fn write(&self, record: &Record) {
        let mut buf = Vec::with_capacity(256);
        if self.formatter.format(record, &mut buf).is_err() {
            return;
        }
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = out.write_all(&buf);
        let _ = out.flush();
    }
}

impl std::fmt::Debug for ConsoleBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleBackend")
            .field("mode", &self.mode)
            .field("suppressed", &self.suppressed)
            .finish_non_exhaustive()
    }
}
