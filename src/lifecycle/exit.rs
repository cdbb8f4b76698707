//! Process-wide exit handlers.
//!
//! Remote sinks register a bounded drain here when they are attached.
//! Anything that ends the process on purpose should go through [`exit`] (or
//! call [`run_handlers`] first) so buffered records are not lost.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

type Handler = Box<dyn FnOnce() + Send>;

static HANDLERS: Mutex<Vec<Handler>> = Mutex::new(Vec::new());

/// Register `handler` to run once before the process exits.
pub fn register(handler: impl FnOnce() + Send + 'static) {
    HANDLERS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(Box::new(handler));
}

/// Run and clear every registered handler, in registration order.
///
/// A panicking handler does not stop the rest. Returns how many ran.
pub fn run_handlers() -> usize {
    let handlers = std::mem::take(&mut *HANDLERS.lock().unwrap_or_else(PoisonError::into_inner));
    let count = handlers.len();
    for handler in handlers {
        let _ = panic::catch_unwind(AssertUnwindSafe(handler));
    }
    count
}

/// Run the handlers, then exit with `code`.
pub fn exit(code: i32) -> ! {
    run_handlers();
    std::process::exit(code)
}
