//! Record rendering for the console path.
//!
//! # Responsibilities
//! - Turn a [`Record`] into the bytes of exactly one output line
//! - Machine-readable rendering (`json.rs`) for pipelines and aggregators
//! - Human-readable, colourised rendering (`text.rs`) for terminals
//!
//! # Design Decisions
//! - Formatters write into a caller-owned buffer; the console backend issues
//!   one `write_all` per record so concurrent records never interleave
//! - Formatters are stateless and shared behind `Send + Sync`

use std::io;

use crate::logger::Record;

pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// Renders a record into a line of output.
pub trait Formatter: Send + Sync {
    /// Append the rendering of `record`, including the trailing newline, to `buf`.
    fn format(&self, record: &Record, buf: &mut Vec<u8>) -> io::Result<()>;
}
