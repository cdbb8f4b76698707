//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Select console backend → Attach remote sinks → Root context
//!
//! Exit (exit.rs):
//!     exit(code) / signal → Run registered handlers (sink drains) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Run exit handlers → Exit 0
//! ```
//!
//! # Design Decisions
//! - Startup is synchronous and completes before any record is emitted
//! - Exit handlers are bounded by each sink's drain timeout

pub mod exit;
pub mod signals;
pub mod startup;

pub use startup::{init, try_init, Builder};
