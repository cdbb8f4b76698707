//! Request-scoped log identity carried on an execution context.
//!
//! # Responsibilities
//! - Attach a [`LogIdentity`] to a [`Context`] under a crate-private key
//! - Extract it again, falling back to the orphan identity
//! - Derive child contexts with merged fields or an extra prefix segment
//!
//! # Data Flow
//! ```text
//! init("App")          → ctx0 { App }
//! with_prefix(ctx0, M) → ctx1 { App/M }
//! with_fields(ctx1, f) → ctx2 { App/M, f }
//!                        ctx0 and ctx1 stay valid and unchanged
//! ```
//!
//! # Design Decisions
//! - Contexts and identities are immutable, so derivation needs no locking
//! - Field collisions are last-write-wins without a warning
//! - A missing identity is not an error: emission goes through the orphan
//!   identity, rendered with the `ORPHAN CONTEXT` prefix

mod carrier;
mod fields;
mod identity;

pub use carrier::Context;
pub use fields::Fields;
pub use identity::{LogIdentity, ORPHAN_PREFIX};

/// Key type for the attached identity. Private, so only this module can set it.
struct IdentityKey(LogIdentity);

/// A child of `ctx` carrying `identity`.
pub fn attach(ctx: &Context, identity: LogIdentity) -> Context {
    ctx.with_value(IdentityKey(identity))
}

/// The identity attached to `ctx`, or the orphan identity.
pub fn identity(ctx: &Context) -> LogIdentity {
    lookup(ctx).cloned().unwrap_or_else(LogIdentity::orphan)
}

/// The identity attached to `ctx`, if there is one.
pub fn lookup(ctx: &Context) -> Option<&LogIdentity> {
    ctx.value::<IdentityKey>().map(|key| &key.0)
}

/// A child of `ctx` whose identity has `fields` merged over the current set.
pub fn with_fields(ctx: &Context, fields: Fields) -> Context {
    let derived = match lookup(ctx) {
        Some(current) => current.with_fields(&fields),
        None => LogIdentity::orphan().with_fields(&fields),
    };
    attach(ctx, derived)
}

/// A child of `ctx` whose identity prefix gains `segment`.
pub fn with_prefix(ctx: &Context, segment: &str) -> Context {
    let derived = match lookup(ctx) {
        Some(current) => current.with_prefix(segment),
        None => LogIdentity::orphan().with_prefix(segment),
    };
    attach(ctx, derived)
}
