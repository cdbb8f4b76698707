//! Emission through whatever identity a context carries.
//!
//! The plain variants take a finished message; the `f` variants take
//! `format_args!` output and skip formatting entirely when the level is
//! filtered out. The exported macros wrap the `f` variants.

use std::error::Error;
use std::fmt;

use crate::context::{self, Context, LogIdentity};
use crate::logger::Level;

/// Emit through the identity on `ctx`, or the orphan identity.
pub fn log(ctx: &Context, level: Level, args: fmt::Arguments<'_>, error: Option<&dyn Error>) {
    match context::lookup(ctx) {
        Some(identity) => identity.emit(level, args, error),
        None => LogIdentity::orphan().emit(level, args, error),
    }
}

pub fn info(ctx: &Context, msg: &str) {
    log(ctx, Level::Info, format_args!("{msg}"), None);
}

pub fn infof(ctx: &Context, args: fmt::Arguments<'_>) {
    log(ctx, Level::Info, args, None);
}

pub fn warn(ctx: &Context, msg: &str) {
    log(ctx, Level::Warn, format_args!("{msg}"), None);
}

pub fn warnf(ctx: &Context, args: fmt::Arguments<'_>) {
    log(ctx, Level::Warn, args, None);
}

pub fn error(ctx: &Context, msg: &str) {
    log(ctx, Level::Error, format_args!("{msg}"), None);
}

pub fn errorf(ctx: &Context, args: fmt::Arguments<'_>) {
    log(ctx, Level::Error, args, None);
}

pub fn debug(ctx: &Context, msg: &str) {
    log(ctx, Level::Debug, format_args!("{msg}"), None);
}

pub fn debugf(ctx: &Context, args: fmt::Arguments<'_>) {
    log(ctx, Level::Debug, args, None);
}

pub fn trace(ctx: &Context, msg: &str) {
    log(ctx, Level::Trace, format_args!("{msg}"), None);
}

pub fn tracef(ctx: &Context, args: fmt::Arguments<'_>) {
    log(ctx, Level::Trace, args, None);
}

/// Error-level record carrying `error` as its cause.
pub fn err(ctx: &Context, error: &dyn Error, msg: &str) {
    log(ctx, Level::Error, format_args!("{msg}"), Some(error));
}

pub fn errf(ctx: &Context, error: &dyn Error, args: fmt::Arguments<'_>) {
    log(ctx, Level::Error, args, Some(error));
}

/// `info!(&ctx, "fmt", args..)`
#[macro_export]
macro_rules! info {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::infof($ctx, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warn {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::warnf($ctx, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::errorf($ctx, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::debugf($ctx, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! trace {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::tracef($ctx, ::std::format_args!($($arg)+))
    };
}

/// `err!(&ctx, &error, "fmt", args..)`
#[macro_export]
macro_rules! err {
    ($ctx:expr, $error:expr, $($arg:tt)+) => {
        $crate::errf($ctx, $error, ::std::format_args!($($arg)+))
    };
}
