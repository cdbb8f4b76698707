//! Record payloads shared by the remote transports.

use serde_json::{json, Map, Value};

use crate::logger::{Level, Record};

/// Hosted logging severity for a level.
pub fn severity(level: Level) -> &'static str {
    match level {
        Level::Trace | Level::Debug => "DEBUG",
        Level::Info => "INFO",
        Level::Warn => "WARNING",
        Level::Error => "ERROR",
    }
}

/// Structured payload: message, prefix, optional error and the fields.
pub fn payload(record: &Record) -> Value {
    let mut map = Map::new();
    map.insert("message".to_string(), Value::String(record.message.clone()));
    map.insert("prefix".to_string(), Value::String(record.prefix.to_string()));
    if let Some(error) = &record.error {
        map.insert("error".to_string(), Value::String(error.clone()));
    }
    if !record.fields.is_empty() {
        map.insert("fields".to_string(), json!(&*record.fields));
    }
    Value::Object(map)
}
