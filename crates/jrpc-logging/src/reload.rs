//! Runtime log level changes

use crate::sink::LogSinkManager;
use jrpc_core::{DebugLevel, LogLevel};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::reload;

/// Handle for swapping the level filter installed by [`init_logging`](crate::init_logging)
pub struct ReloadHandle {
    handle: Mutex<Option<reload::Handle<LevelFilter, tracing_subscriber::Registry>>>,
}

impl ReloadHandle {
    /// Create a new reload handle
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Get the global reload handle
    pub fn global() -> &'static ReloadHandle {
        static INSTANCE: OnceCell<ReloadHandle> = OnceCell::new();
        INSTANCE.get_or_init(ReloadHandle::new)
    }

    /// Set the reload handle (called during initialization)
    pub fn set_handle(&self, handle: reload::Handle<LevelFilter, tracing_subscriber::Registry>) {
        *self.handle.lock() = Some(handle);
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Reload the filter and the sink level to `level`
    pub fn reload_level(&self, level: LogLevel) -> Result<(), String> {
        let guard = self.handle.lock();
        let Some(handle) = guard.as_ref() else {
            return Err("Reload handle not initialized".to_string());
        };
        handle
            .reload(level_filter(level))
            .map_err(|e| format!("Failed to reload filter: {}", e))?;
        LogSinkManager::global().set_level(level);
        Ok(())
    }

    /// Reload using the debug-level mapping
    pub fn reload_debug_level(&self, level: DebugLevel) -> Result<(), String> {
        self.reload_level(LogLevel::from(level))
    }
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert LogLevel to tracing LevelFilter
pub(crate) fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Off => LevelFilter::OFF,
    }
}
