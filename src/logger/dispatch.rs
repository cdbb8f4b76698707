//! The rendering handle shared by every identity derived from one root.

use std::sync::{Arc, OnceLock};

use crate::backend::ConsoleBackend;
use crate::logger::{Level, Record};
use crate::sinks::RemoteSink;

/// Level filter, console backend and attached remote sinks.
///
/// Built once at startup; sinks can only be attached while the dispatch is
/// still uniquely owned, before it is shared behind an `Arc`.
pub struct Dispatch {
    level: Level,
    console: Arc<ConsoleBackend>,
    sinks: Vec<Arc<dyn RemoteSink>>,
}

impl Dispatch {
    pub fn new(level: Level, console: ConsoleBackend) -> Self {
        Self {
            level,
            console: Arc::new(console),
            sinks: Vec::new(),
        }
    }

    /// Process-wide dispatch used by identities with no root: JSON on stderr
    /// at the default level.
    pub fn fallback() -> Arc<Dispatch> {
        static FALLBACK: OnceLock<Arc<Dispatch>> = OnceLock::new();
        FALLBACK
            .get_or_init(|| Arc::new(Dispatch::new(Level::default(), ConsoleBackend::stderr())))
            .clone()
    }

    /// Same level and console, no remote sinks.
    ///
    /// Sinks report their own delivery failures through this, so a failing
    /// sink never feeds its errors back into itself.
    pub fn console_only(&self) -> Dispatch {
        Dispatch {
            level: self.level,
            console: self.console.clone(),
            sinks: Vec::new(),
        }
    }

    pub fn attach_sink(&mut self, sink: Arc<dyn RemoteSink>) {
        self.sinks.push(sink);
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn console(&self) -> &ConsoleBackend {
        &self.console
    }

    pub fn sinks(&self) -> &[Arc<dyn RemoteSink>] {
        &self.sinks
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// Write `record` to the console, then hand it to every remote sink.
    pub fn dispatch(&self, record: &Record) {
        if !self.enabled(record.level) {
            return;
        }
        self.console.write(record);
        for sink in &self.sinks {
            sink.accept(record);
        }
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("level", &self.level)
            .field("console", &self.console)
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}
