//! The injectable logging facade.

use std::error::Error;
use std::fmt;

use crate::context::{self, Context, Fields, LogIdentity};
use crate::logger::Level;

/// A logging view that resolves its identity from the caller's context.
///
/// Components that are handed a `&dyn ContextLog` at construction time can
/// log against whatever context each call arrives with. Implementors only
/// decide how an identity is derived; emission is shared.
pub trait ContextLog: Send + Sync {
    /// The identity records emitted through `ctx` carry.
    fn identity(&self, ctx: &Context) -> LogIdentity;

    fn log(&self, ctx: &Context, level: Level, args: fmt::Arguments<'_>, error: Option<&dyn Error>) {
        self.identity(ctx).emit(level, args, error);
    }

    /// A child of `ctx` with this view applied and `fields` merged on top.
    fn scope_fields(&self, ctx: &Context, fields: Fields) -> Context {
        context::attach(ctx, self.identity(ctx).with_fields(&fields))
    }

    /// A child of `ctx` with this view applied and `segment` appended.
    fn scope_prefix(&self, ctx: &Context, segment: &str) -> Context {
        context::attach(ctx, self.identity(ctx).with_prefix(segment))
    }

    fn info(&self, ctx: &Context, msg: &str) {
        self.log(ctx, Level::Info, format_args!("{msg}"), None);
    }

    fn infof(&self, ctx: &Context, args: fmt::Arguments<'_>) {
        self.log(ctx, Level::Info, args, None);
    }

    fn warn(&self, ctx: &Context, msg: &str) {
        self.log(ctx, Level::Warn, format_args!("{msg}"), None);
    }

    fn warnf(&self, ctx: &Context, args: fmt::Arguments<'_>) {
        self.log(ctx, Level::Warn, args, None);
    }

    fn error(&self, ctx: &Context, msg: &str) {
        self.log(ctx, Level::Error, format_args!("{msg}"), None);
    }

    fn errorf(&self, ctx: &Context, args: fmt::Arguments<'_>) {
        self.log(ctx, Level::Error, args, None);
    }

    fn debug(&self, ctx: &Context, msg: &str) {
        self.log(ctx, Level::Debug, format_args!("{msg}"), None);
    }

    fn debugf(&self, ctx: &Context, args: fmt::Arguments<'_>) {
        self.log(ctx, Level::Debug, args, None);
    }

    fn trace(&self, ctx: &Context, msg: &str) {
        self.log(ctx, Level::Trace, format_args!("{msg}"), None);
    }

    fn tracef(&self, ctx: &Context, args: fmt::Arguments<'_>) {
        self.log(ctx, Level::Trace, args, None);
    }

    fn err(&self, ctx: &Context, error: &dyn Error, msg: &str) {
        self.log(ctx, Level::Error, format_args!("{msg}"), Some(error));
    }

    fn errf(&self, ctx: &Context, error: &dyn Error, args: fmt::Arguments<'_>) {
        self.log(ctx, Level::Error, args, Some(error));
    }
}

/// The zero-delta view: logs with exactly the identity on the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ambient;

impl ContextLog for Ambient {
    fn identity(&self, ctx: &Context) -> LogIdentity {
        context::identity(ctx)
    }
}
