//! Detached, reusable logging views.

use std::sync::Arc;

use crate::context::{self, Context, Fields, LogIdentity};
use crate::logger::ContextLog;

/// A bundle of field and prefix deltas applied to a context at call time.
///
/// Not bound to any context. Every emission resolves the caller's context,
/// merges the field delta, appends the prefix delta, and emits through the
/// result. Cheap to clone and safe to share between threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubLogger {
    fields: Option<Arc<Fields>>,
    prefix: Option<Arc<str>>,
}

impl SubLogger {
    pub fn new_with_fields(fields: Fields) -> Self {
        Self {
            fields: Some(Arc::new(fields)),
            prefix: None,
        }
    }

    pub fn new_with_prefix(segment: &str) -> Self {
        Self {
            fields: None,
            prefix: Some(Arc::from(segment)),
        }
    }

    /// A new view whose field delta is this one's merged with `fields`.
    pub fn with_fields(&self, fields: Fields) -> Self {
        let merged = match &self.fields {
            Some(current) => current.merge(&fields),
            None => fields,
        };
        Self {
            fields: Some(Arc::new(merged)),
            prefix: self.prefix.clone(),
        }
    }

    /// A new view whose prefix delta gains `segment`.
    pub fn with_prefix(&self, segment: &str) -> Self {
        let prefix: Arc<str> = match &self.prefix {
            Some(current) => Arc::from(format!("{current}/{segment}")),
            None => Arc::from(segment),
        };
        Self {
            fields: self.fields.clone(),
            prefix: Some(prefix),
        }
    }

    pub fn field_delta(&self) -> Option<&Fields> {
        self.fields.as_deref()
    }

    pub fn prefix_delta(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Commit this view into `ctx`, so nested calls inherit it.
    pub fn apply(&self, ctx: &Context) -> Context {
        context::attach(ctx, self.identity(ctx))
    }
}

impl ContextLog for SubLogger {
    fn identity(&self, ctx: &Context) -> LogIdentity {
        let mut identity = context::identity(ctx);
        if let Some(fields) = &self.fields {
            identity = identity.with_fields(fields);
        }
        if let Some(prefix) = &self.prefix {
            identity = identity.with_prefix(prefix);
        }
        identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ConsoleBackend, ConsoleMode};
    use crate::logger::{Dispatch, Level};
    use crate::testing::SharedBuffer;
    use serde_json::json;

    fn root() -> (Context, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let console = ConsoleBackend::new(ConsoleMode::MachineReadable, Box::new(buffer.clone()), false);
        let dispatch = Arc::new(Dispatch::new(Level::Info, console));
        let ctx = context::attach(&Context::background(), LogIdentity::root(dispatch, "TestApp"));
        (ctx, buffer)
    }

    #[test]
    fn test_constructors() {
        let fields = SubLogger::new_with_fields(crate::fields! { "module" => "Auth" });
        assert_eq!(fields.field_delta().unwrap().get("module"), Some(&json!("Auth")));
        assert_eq!(fields.prefix_delta(), None);

        let prefix = SubLogger::new_with_prefix("Auth");
        assert_eq!(prefix.prefix_delta(), Some("Auth"));
        assert!(prefix.field_delta().is_none());
    }

    #[test]
    fn test_field_composition_is_associative() {
        let a = crate::fields! { "module" => "Auth", "tenant" => 41 };
        let b = crate::fields! { "tenant" => 42 };

        let stepwise = SubLogger::new_with_fields(a.clone()).with_fields(b.clone());
        let direct = SubLogger::new_with_fields(a.merge(&b));
        assert_eq!(stepwise, direct);
        assert_eq!(stepwise.field_delta().unwrap().get("tenant"), Some(&json!(42)));
    }

    #[test]
    fn test_prefix_composition_is_associative() {
        let stepwise = SubLogger::new_with_prefix("x").with_prefix("y");
        assert_eq!(stepwise, SubLogger::new_with_prefix("x/y"));

        let from_fields = SubLogger::new_with_fields(Fields::new()).with_prefix("y");
        assert_eq!(from_fields.prefix_delta(), Some("y"));
    }

    #[test]
    fn test_derivation_leaves_parent_untouched() {
        let parent = SubLogger::new_with_prefix("Auth");
        let _child = parent.with_prefix("Token").with_fields(crate::fields! { "a" => 1 });
        assert_eq!(parent, SubLogger::new_with_prefix("Auth"));
    }

    #[test]
    fn test_emission_applies_both_deltas() {
        let (ctx, buffer) = root();
        let auth = SubLogger::new_with_fields(crate::fields! { "module" => "Auth", "tenant" => 42 })
            .with_prefix("Auth");

        auth.warn(&ctx, "token expired");

        let lines = buffer.json_lines();
        assert_eq!(lines[0]["prefix"], "TestApp/Auth");
        assert_eq!(lines[0]["module"], "Auth");
        assert_eq!(lines[0]["tenant"], 42);
        assert_eq!(lines[0]["level"], "warn");
    }

    #[test]
    fn test_reuse_across_contexts() {
        let (ctx, buffer) = root();
        let sub = SubLogger::new_with_prefix("Worker");
        let request_a = context::with_fields(&ctx, crate::fields! { "requestID" => "a" });
        let request_b = context::with_prefix(&ctx, "Batch");

        sub.info(&request_a, "one");
        sub.info(&request_b, "two");

        let lines = buffer.json_lines();
        assert_eq!(lines[0]["prefix"], "TestApp/Worker");
        assert_eq!(lines[0]["requestID"], "a");
        assert_eq!(lines[1]["prefix"], "TestApp/Batch/Worker");
        assert!(lines[1].get("requestID").is_none());
    }

    #[test]
    fn test_apply_commits_identity_for_nested_calls() {
        let (ctx, buffer) = root();
        let committed = SubLogger::new_with_prefix("Auth")
            .with_fields(crate::fields! { "tenant" => 42 })
            .apply(&ctx);

        crate::info(&committed, "nested call");
        crate::info(&ctx, "outer call");

        let lines = buffer.json_lines();
        assert_eq!(lines[0]["prefix"], "TestApp/Auth");
        assert_eq!(lines[0]["tenant"], 42);
        assert_eq!(lines[1]["prefix"], "TestApp");
        assert!(lines[1].get("tenant").is_none());
    }

    #[test]
    fn test_scope_helpers_derive_from_view() {
        let (ctx, _) = root();
        let sub = SubLogger::new_with_prefix("Auth");

        let scoped = sub.scope_prefix(&ctx, "Login");
        assert_eq!(context::identity(&scoped).prefix(), "TestApp/Auth/Login");

        let scoped = sub.scope_fields(&ctx, crate::fields! { "user" => "ted" });
        let identity = context::identity(&scoped);
        assert_eq!(identity.prefix(), "TestApp/Auth");
        assert_eq!(identity.fields().get("user"), Some(&json!("ted")));
    }

    #[test]
    fn test_raw_context_emits_under_delta_prefix() {
        let sub = SubLogger::new_with_prefix("Orphaned");
        let identity = sub.identity(&Context::background());
        assert_eq!(identity.label(), "Orphaned");
        sub.debug(&Context::background(), "filtered by the fallback level");
    }
}
