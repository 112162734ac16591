//! jrpc-logging - Logging sink for jrpc servers and clients
//!
//! This crate provides:
//! - [`SinkLayer`] tracing layer that forwards events to a pluggable sink
//! - [`LogSink`] type for the sink closure
//! - [`init_logging`] wiring the layer up from a [`DebugLevel`]
//! - [`ReloadHandle`] for changing the level at runtime

mod layer;
mod reload;
mod sink;

pub use jrpc_core::{DebugLevel, LogLevel};
pub use layer::{SinkLayer, init_logging};
pub use reload::ReloadHandle;
pub use sink::{LogSink, LogSinkManager};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{DebugLevel, LogLevel, LogSink, LogSinkManager, SinkLayer, init_logging};
}
