//! One immutable node of attached log identity.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::context::Fields;
use crate::logger::{Dispatch, Level, Record};

/// Rendered prefix of the identity used when a context carries none.
pub const ORPHAN_PREFIX: &str = "ORPHAN CONTEXT";

/// Accumulated prefix and fields for one logging scope.
///
/// Never mutated after construction: `with_fields` and `with_prefix` build a
/// new identity sharing the same dispatch.
#[derive(Clone)]
pub struct LogIdentity {
    /// Ancestry path, segments joined by `/`. Empty for the orphan.
    prefix: Arc<str>,
    /// Prefix as rendered on records.
    label: Arc<str>,
    fields: Arc<Fields>,
    dispatch: Arc<Dispatch>,
}

impl LogIdentity {
    /// Root identity: prefix and label are both `prefix`, no fields.
    pub fn root(dispatch: Arc<Dispatch>, prefix: &str) -> Self {
        let prefix: Arc<str> = Arc::from(prefix);
        Self {
            label: prefix.clone(),
            prefix,
            fields: Arc::new(Fields::new()),
            dispatch,
        }
    }

    /// The fallback identity on the process-wide fallback dispatch.
    pub fn orphan() -> Self {
        Self::orphan_on(Dispatch::fallback())
    }

    /// A fallback identity rendering through `dispatch`.
    pub fn orphan_on(dispatch: Arc<Dispatch>) -> Self {
        Self {
            prefix: Arc::from(""),
            label: Arc::from(ORPHAN_PREFIX),
            fields: Arc::new(Fields::new()),
            dispatch,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The prefix as it appears on emitted records.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn dispatch(&self) -> &Arc<Dispatch> {
        &self.dispatch
    }

    pub fn is_orphan(&self) -> bool {
        self.prefix.is_empty() && &*self.label == ORPHAN_PREFIX
    }

    /// Merge `fields` over the current set; the prefix is kept.
    pub fn with_fields(&self, fields: &Fields) -> Self {
        Self {
            prefix: self.prefix.clone(),
            label: self.label.clone(),
            fields: Arc::new(self.fields.merge(fields)),
            dispatch: self.dispatch.clone(),
        }
    }

    /// Append an ancestry segment. An empty prefix is replaced outright.
    pub fn with_prefix(&self, segment: &str) -> Self {
        let prefix: Arc<str> = if self.prefix.is_empty() {
            Arc::from(segment)
        } else {
            Arc::from(format!("{}/{}", self.prefix, segment))
        };
        Self {
            label: prefix.clone(),
            prefix,
            fields: self.fields.clone(),
            dispatch: self.dispatch.clone(),
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.dispatch.enabled(level)
    }

    /// Build the record this identity would emit.
    pub fn record(&self, level: Level, message: impl Into<String>, error: Option<&dyn Error>) -> Record {
        let record = Record::new(level, message, self.label.clone(), self.fields.clone());
        match error {
            Some(error) => record.with_error(error.to_string()),
            None => record,
        }
    }

    /// Emit a record. Formatting is skipped when `level` is filtered out.
    pub fn emit(&self, level: Level, args: fmt::Arguments<'_>, error: Option<&dyn Error>) {
        if !self.enabled(level) {
            return;
        }
        let message = match args.as_str() {
            Some(s) => s.to_string(),
            None => args.to_string(),
        };
        self.dispatch.dispatch(&self.record(level, message, error));
    }
}

impl fmt::Debug for LogIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogIdentity")
            .field("prefix", &self.prefix)
            .field("label", &self.label)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ConsoleBackend, ConsoleMode};
    use crate::testing::SharedBuffer;
    use serde_json::json;

    fn buffered(level: Level) -> (Arc<Dispatch>, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let console = ConsoleBackend::new(ConsoleMode::MachineReadable, Box::new(buffer.clone()), false);
        (Arc::new(Dispatch::new(level, console)), buffer)
    }

    #[test]
    fn test_prefix_chain() {
        let (dispatch, _) = buffered(Level::Info);
        let root = LogIdentity::root(dispatch, "TestApp");
        let chained = root.with_prefix("Module1").with_prefix("Handler");

        assert_eq!(chained.prefix(), "TestApp/Module1/Handler");
        assert_eq!(chained.label(), "TestApp/Module1/Handler");
        assert_eq!(root.prefix(), "TestApp");
    }

    #[test]
    fn test_orphan_prefix_is_replaced_by_segment() {
        let orphan = LogIdentity::orphan();
        assert!(orphan.is_orphan());
        assert_eq!(orphan.prefix(), "");
        assert_eq!(orphan.label(), ORPHAN_PREFIX);

        let derived = orphan.with_prefix("Worker");
        assert_eq!(derived.prefix(), "Worker");
        assert_eq!(derived.label(), "Worker");
        assert!(!derived.is_orphan());
    }

    #[test]
    fn test_orphan_keeps_sentinel_through_field_derivation() {
        let orphan = LogIdentity::orphan().with_fields(&crate::fields! { "job" => 7 });
        let record = orphan.record(Level::Info, "x", None);
        assert_eq!(&*record.prefix, ORPHAN_PREFIX);
        assert_eq!(record.fields.get("job"), Some(&json!(7)));
    }

    #[test]
    fn test_with_fields_leaves_parent_untouched() {
        let (dispatch, _) = buffered(Level::Info);
        let root = LogIdentity::root(dispatch, "App");
        let child = root.with_fields(&crate::fields! { "requestID" => "Ted" });

        assert!(root.fields().is_empty());
        assert_eq!(child.fields().get("requestID"), Some(&json!("Ted")));
        assert_eq!(child.prefix(), "App");
    }

    #[test]
    fn test_emit_renders_identity() {
        let (dispatch, buffer) = buffered(Level::Info);
        let identity = LogIdentity::root(dispatch, "App")
            .with_prefix("Db")
            .with_fields(&crate::fields! { "table" => "users" });
        let error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");

        identity.emit(Level::Error, format_args!("write failed after {} tries", 3), Some(&error));

        let lines = buffer.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["prefix"], "App/Db");
        assert_eq!(lines[0]["table"], "users");
        assert_eq!(lines[0]["msg"], "write failed after 3 tries");
        assert_eq!(lines[0]["error"], "disk full");
        assert_eq!(lines[0]["level"], "error");
    }

    #[test]
    fn test_emit_below_level_writes_nothing() {
        let (dispatch, buffer) = buffered(Level::Warn);
        let identity = LogIdentity::root(dispatch, "App");
        identity.emit(Level::Debug, format_args!("quiet"), None);
        assert!(buffer.is_empty());
    }
}
