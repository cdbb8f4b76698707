//! Request-scoped structured logging.
//!
//! A root logger is initialized once per application. Its identity (a
//! `/`-separated prefix plus key/value fields) rides on a [`Context`] that is
//! derived, never mutated, as it is threaded through a call tree. Every log
//! call made with a context carries that context's identity.
//!
//! ```no_run
//! use ctxlog::{fields, LoggingConfig};
//!
//! let (ctx, _logger) = ctxlog::init("TestApp", &LoggingConfig::default());
//! ctxlog::info(&ctx, "Starting the application!");
//!
//! let module = ctxlog::with_prefix(&ctx, "Module1");
//! ctxlog::warn!(&module, "Initialized Module1 with '{}'", "Happyness");
//!
//! let request = ctxlog::with_fields(&module, fields! { "requestID" => "Ted" });
//! ctxlog::error(&request, "Got some weird request");
//! ```

pub mod backend;
pub mod config;
pub mod context;
pub mod format;
pub mod lifecycle;
pub mod logger;
pub mod sinks;
pub mod testing;

pub use config::{ConsoleConfig, LoggingConfig, RemoteConfig};
pub use context::{attach, identity, with_fields, with_prefix, Context, Fields, LogIdentity, ORPHAN_PREFIX};
pub use lifecycle::{init, try_init, Builder};
pub use logger::{
    debug, debugf, err, errf, error, errorf, info, infof, log, trace, tracef, warn, warnf, Ambient, ContextLog, Level,
    Logger, Record, SubLogger,
};
pub use sinks::{RemoteSink, SinkError};
