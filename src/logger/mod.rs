//! Emission: levels, records, the shared dispatch and the logging facades.
//!
//! # Data Flow
//! ```text
//! ctxlog::info(&ctx, ..) / SubLogger::info(&ctx, ..) / Logger::info(..)
//!     → LogIdentity::emit (level check, message formatting)
//!     → Record { time, level, msg, prefix, fields, error }
//!     → Dispatch: ConsoleBackend::write, then RemoteSink::accept per sink
//! ```
//!
//! # Design Decisions
//! - Emission never returns an error
//! - Records below the root level are dropped before formatting

mod bridge;
mod dispatch;
mod emit;
mod facade;
mod level;
mod record;
mod root;
mod sub;

pub use bridge::TracingBridge;
pub use dispatch::Dispatch;
pub use emit::{debug, debugf, err, errf, error, errorf, info, infof, log, trace, tracef, warn, warnf};
pub use facade::{Ambient, ContextLog};
pub use level::{Level, ParseLevelError};
pub use record::Record;
pub use root::Logger;
pub use sub::SubLogger;
