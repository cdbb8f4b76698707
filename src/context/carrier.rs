//! Immutable execution context.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// An immutable, append-only chain of typed values threaded through a call tree.
///
/// Deriving a context never touches the parent: `with_value` returns a new
/// context whose head points at the parent's chain, so any number of children
/// can branch from one parent and be moved to other threads independently.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

struct Node {
    key: TypeId,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Node>>,
}

impl Context {
    /// The empty root context.
    pub fn background() -> Self {
        Self::default()
    }

    /// A child context carrying `value`, shadowing any earlier value of type `T`.
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        Self {
            head: Some(Arc::new(Node {
                key: TypeId::of::<T>(),
                value: Box::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// The nearest value of type `T`, if any.
    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        let key = TypeId::of::<T>();
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            if current.key == key {
                return current.value.downcast_ref::<T>();
            }
            node = current.parent.as_deref();
        }
        None
    }

    /// Number of values in the chain.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            depth += 1;
            node = current.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("depth", &self.depth()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct RequestId(&'static str);

    #[derive(Debug, PartialEq)]
    struct Tenant(u32);

    #[test]
    fn test_background_is_empty() {
        let ctx = Context::background();
        assert_eq!(ctx.depth(), 0);
        assert!(ctx.value::<RequestId>().is_none());
    }

    #[test]
    fn test_with_value_does_not_touch_parent() {
        let parent = Context::background().with_value(RequestId("a"));
        let child = parent.with_value(RequestId("b"));

        assert_eq!(parent.value::<RequestId>(), Some(&RequestId("a")));
        assert_eq!(child.value::<RequestId>(), Some(&RequestId("b")));
        assert_eq!(child.depth(), 2);
    }

    #[test]
    fn test_lookup_walks_chain() {
        let ctx = Context::background()
            .with_value(Tenant(42))
            .with_value(RequestId("r1"));

        assert_eq!(ctx.value::<Tenant>(), Some(&Tenant(42)));
        assert_eq!(ctx.value::<RequestId>(), Some(&RequestId("r1")));
        assert!(ctx.value::<String>().is_none());
    }

    #[test]
    fn test_branches_move_across_threads() {
        let root = Context::background().with_value(Tenant(7));
        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                let ctx = root.with_value(i);
                std::thread::spawn(move || (*ctx.value::<u32>().unwrap(), ctx.value::<Tenant>().unwrap().0))
            })
            .collect();

        let mut seen: Vec<(u32, u32)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        seen.sort();
        assert_eq!(seen, vec![(0, 7), (1, 7), (2, 7), (3, 7)]);
        assert!(root.value::<u32>().is_none());
    }
}
