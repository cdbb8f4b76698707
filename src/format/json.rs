//! Single-line JSON rendering.

use std::io;

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use super::Formatter;
use crate::logger::Record;

pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const MESSAGE_KEY: &str = "msg";
pub const PREFIX_KEY: &str = "prefix";
pub const ERROR_KEY: &str = "error";

/// Renders one JSON object per line.
///
/// Fields are emitted as top-level keys. A field named like one of the record
/// keys (`time`, `level`, `msg`, `prefix`, `error`) is renamed to `fields.<key>` so it
/// cannot shadow the record itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    /// The JSON object for `record`, without the trailing newline.
    pub fn to_value(&self, record: &Record) -> Map<String, Value> {
        let mut object = Map::new();
        for (key, value) in record.fields.iter() {
            let key = if is_reserved(key) {
                format!("fields.{key}")
            } else {
                key.clone()
            };
            object.insert(key, value.clone());
        }
        if let Some(error) = &record.error {
            object.insert(ERROR_KEY.to_string(), Value::String(error.clone()));
        }
        object.insert(
            TIME_KEY.to_string(),
            Value::String(record.time.to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );
        object.insert(LEVEL_KEY.to_string(), Value::String(record.level.as_str().to_string()));
        object.insert(MESSAGE_KEY.to_string(), Value::String(record.message.clone()));
        object.insert(PREFIX_KEY.to_string(), Value::String(record.prefix.to_string()));
        object
    }
}

fn is_reserved(key: &str) -> bool {
    matches!(key, TIME_KEY | LEVEL_KEY | MESSAGE_KEY | PREFIX_KEY | ERROR_KEY)
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record, buf: &mut Vec<u8>) -> io::Result<()> {
        serde_json::to_writer(&mut *buf, &self.to_value(record))?;
        buf.push(b'\n');
        Ok(())
    }
}
