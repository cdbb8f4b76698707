//! Console mode selection.

use std::io::{self, IsTerminal};

use crate::config::ConsoleConfig;

/// How console records are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMode {
    /// Colourised, prefixed text lines.
    Interactive,
    /// One JSON object per line.
    MachineReadable,
}

/// Inputs to mode selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalState {
    /// Whether stdout is attached to a terminal.
    pub is_terminal: bool,
    /// Behave as if attached to a terminal.
    pub force_interactive: bool,
    /// Always render machine-readable records.
    pub force_machine_readable: bool,
}

impl TerminalState {
    pub fn from_config(is_terminal: bool, console: &ConsoleConfig) -> Self {
        Self {
            is_terminal,
            force_interactive: console.force_tty,
            force_machine_readable: console.force_json,
        }
    }

    /// Probe stdout and combine with the configured overrides.
    pub fn detect(console: &ConsoleConfig) -> Self {
        Self::from_config(io::stdout().is_terminal(), console)
    }
}

/// Pick the console mode.
///
/// Forcing machine-readable output wins over everything, including a forced
/// terminal; otherwise a real or forced terminal gets interactive output and
/// anything else falls back to machine-readable.
pub fn select_mode(state: TerminalState) -> ConsoleMode {
    if state.force_machine_readable {
        ConsoleMode::MachineReadable
    } else if state.is_terminal || state.force_interactive {
        ConsoleMode::Interactive
    } else {
        ConsoleMode::MachineReadable
    }
}
