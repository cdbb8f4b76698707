//! A single log record, as handed to formatters and remote sinks.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::context::Fields;
use crate::logger::Level;

/// One emitted log record.
///
/// The prefix and fields are shared with the identity that produced the
/// record, so cloning a record for fan-out only copies the message.
#[derive(Debug, Clone)]
pub struct Record {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub prefix: Arc<str>,
    pub fields: Arc<Fields>,
    /// Display text of the causal error, for `err`/`errf` records.
    pub error: Option<String>,
}

impl Record {
    pub fn new(level: Level, message: impl Into<String>, prefix: Arc<str>, fields: Arc<Fields>) -> Self {
        Self {
            time: Utc::now(),
            level,
            message: message.into(),
            prefix,
            fields,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
