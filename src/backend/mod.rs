//! Console backend selection.
//!
//! # Data Flow
//! ```text
//! stdout TTY probe + console config
//!     → TerminalState
//!     → select_mode (force_json > tty/force_tty > machine-readable)
//!     → ConsoleBackend (formatter + destination, or discarding sink)
//! ```
//!
//! # Design Decisions
//! - Machine-readable output is the fallback for anything that is not a terminal
//! - Suppression swaps the destination, never the mode
//! - One mutex-guarded `write_all` per record

pub mod console;
pub mod selector;

pub use console::ConsoleBackend;
pub use selector::{select_mode, ConsoleMode, TerminalState};
