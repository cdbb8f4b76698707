//! Human-readable rendering for interactive terminals.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde_json::Value;

use super::Formatter;
use crate::logger::{Level, Record};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const RESET: &str = "\x1b[0m";
const GRAY: &str = "\x1b[37m";
const BLUE: &str = "\x1b[34m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Renders `[time] LEVEL prefix: message key=value ...`.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatter {
    colors: bool,
}

impl TextFormatter {
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> bool {
        self.colors
    }

    fn paint(&self, out: &mut Vec<u8>, color: &str, text: &str) -> io::Result<()> {
        if self.colors {
            write!(out, "{color}{text}{RESET}")
        } else {
            out.write_all(text.as_bytes())
        }
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Trace | Level::Debug => GRAY,
        Level::Info => BLUE,
        Level::Warn => YELLOW,
        Level::Error => RED,
    }
}

fn needs_quoting(text: &str) -> bool {
    text.is_empty()
        || !text
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+'))
}

fn render_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if needs_quoting(&text) {
        format!("{text:?}")
    } else {
        text
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &Record, buf: &mut Vec<u8>) -> io::Result<()> {
        let color = level_color(record.level);

        let timestamp = format!("[{}]", record.time.format(TIME_FORMAT));
        self.paint(buf, GRAY, &timestamp)?;
        buf.push(b' ');

        let label = format!("{:>5}", record.level.as_str().to_ascii_uppercase());
        self.paint(buf, color, &label)?;
        buf.push(b' ');

        if !record.prefix.is_empty() {
            self.paint(buf, CYAN, &format!("{}:", record.prefix))?;
            buf.push(b' ');
        }
        buf.extend_from_slice(record.message.as_bytes());

        let mut pairs: BTreeMap<&str, String> = record
            .fields
            .iter()
            .map(|(key, value)| (key.as_str(), render_value(value)))
            .collect();
        if let Some(error) = &record.error {
            pairs.insert("error", render_value(&Value::String(error.clone())));
        }
        for (key, value) in pairs {
            buf.push(b' ');
            self.paint(buf, color, key)?;
            write!(buf, "={value}")?;
        }

        buf.push(b'\n');
        Ok(())
    }
}
