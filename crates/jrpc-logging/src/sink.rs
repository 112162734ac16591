//! Log sink management

use jrpc_core::LogLevel;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Destination for log records: `(level, target, message)`
///
/// `target` is the module path of the event.
pub type LogSink = Arc<dyn Fn(LogLevel, &str, &str) + Send + Sync>;

/// Global sink manager
static SINK_MANAGER: OnceCell<LogSinkManager> = OnceCell::new();

/// Holder for the active sink and the minimum level it receives
pub struct LogSinkManager {
    sink: RwLock<Option<LogSink>>,
    level: AtomicU8,
}

impl LogSinkManager {
    /// Create a new sink manager
    pub fn new() -> Self {
        Self {
            sink: RwLock::new(None),
            level: AtomicU8::new(LogLevel::Warn as u8),
        }
    }

    /// Get the global sink manager instance
    pub fn global() -> &'static LogSinkManager {
        SINK_MANAGER.get_or_init(LogSinkManager::new)
    }

    /// Install or remove the sink
    pub fn set_sink(&self, sink: Option<LogSink>) {
        *self.sink.write() = sink;
    }

    pub fn has_sink(&self) -> bool {
        self.sink.read().is_some()
    }

    /// Set the log level
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Get the current log level
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::SeqCst))
    }

    /// Check if a log level is enabled
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    /// Hand a record to the sink if one is set and the level is enabled
    pub fn log(&self, level: LogLevel, target: &str, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        // clone out so the sink may replace itself without deadlocking
        let sink = match self.sink.read().as_ref() {
            Some(sink) => Arc::clone(sink),
            None => return,
        };
        sink(level, target, message);
    }
}

impl Default for LogSinkManager {
    fn default() -> Self {
        Self::new()
    }
}
