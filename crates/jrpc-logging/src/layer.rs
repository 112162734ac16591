//! Tracing layer that forwards events to the log sink

use crate::reload::{ReloadHandle, level_filter};
use crate::sink::LogSinkManager;
use jrpc_core::{DebugLevel, LogLevel};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Tracing layer that forwards log events to a [`LogSinkManager`]
pub struct SinkLayer {
    manager: &'static LogSinkManager,
}

impl SinkLayer {
    /// Create a layer using the global sink manager
    pub fn new() -> Self {
        Self {
            manager: LogSinkManager::global(),
        }
    }

    /// Create a layer with a specific sink manager
    pub fn with_manager(manager: &'static LogSinkManager) -> Self {
        Self { manager }
    }

    fn convert_level(level: &Level) -> LogLevel {
        match *level {
            Level::TRACE => LogLevel::Trace,
            Level::DEBUG => LogLevel::Debug,
            Level::INFO => LogLevel::Info,
            Level::WARN => LogLevel::Warn,
            Level::ERROR => LogLevel::Error,
        }
    }
}

impl Default for SinkLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for SinkLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Self::convert_level(metadata.level());
        if !self.manager.is_enabled(level) || !self.manager.has_sink() {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let message = visitor.finish();
        self.manager.log(level, metadata.target(), &message);
    }
}

/// Collects the `message` field, followed by any other fields as `k=v`
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        let mut out = self.message.unwrap_or_default();
        for field in self.fields {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&field);
        }
        out
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

/// Install the global subscriber for `level`
///
/// Level 0 lets warnings and errors through, level 1 adds debug output,
/// level 2 and above adds trace output with raw request text. Events go to
/// stderr and to the sink, if one is set. Returns `false` if a global
/// subscriber was already installed.
pub fn init_logging(level: DebugLevel) -> bool {
    use tracing_subscriber::prelude::*;

    let log_level = LogLevel::from(level);
    LogSinkManager::global().set_level(log_level);

    let (filter, handle) = tracing_subscriber::reload::Layer::new(level_filter(log_level));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(SinkLayer::new())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }
    ReloadHandle::global().set_handle(handle);
    true
}
