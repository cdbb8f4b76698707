//! Forwarding of `tracing` events into the root logger.

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::Layer;

use crate::context::{Fields, LogIdentity};
use crate::logger::Level;

/// Crates whose events are never forwarded. The remote sinks use them, so
/// forwarding could feed a sink's own traffic back into it.
const SILENCED_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls", "tokio_util"];

/// A layer that re-emits events through a log identity.
pub struct TracingBridge {
    identity: LogIdentity,
}

impl TracingBridge {
    pub fn new(identity: LogIdentity) -> Self {
        Self { identity }
    }

    /// Target filter: the identity's level, silenced crates off.
    pub fn filter(&self) -> Targets {
        SILENCED_TARGETS.iter().fold(
            Targets::new().with_default(LevelFilter::from(self.identity.dispatch().level())),
            |targets, target| targets.with_target(*target, LevelFilter::OFF),
        )
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Fields,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name(), value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name(), value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.fields.insert(field.name(), n);
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields.insert(field.name(), format!("{value:?}"));
        }
    }
}

impl<S> Layer<S> for TracingBridge
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from(*metadata.level());
        if !self.identity.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        visitor.fields.insert("target", metadata.target());

        let message = visitor.message.unwrap_or_default();
        self.identity
            .with_fields(&visitor.fields)
            .emit(level, format_args!("{message}"), None);
    }
}

/// Install the bridge as the global `tracing` subscriber.
pub(crate) fn install(identity: LogIdentity) -> Result<(), TryInitError> {
    let bridge = TracingBridge::new(identity);
    let filter = bridge.filter();
    tracing_subscriber::registry().with(bridge.with_filter(filter)).try_init()
}
