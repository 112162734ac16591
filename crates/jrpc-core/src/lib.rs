//! jrpc-core - Shared types for the jrpc server and client
//!
//! This crate provides the pieces both ends of a connection agree on:
//! - [`RpcError`] for the transport / framing / application / resource
//!   error taxonomy
//! - [`ErrorCode`] for the numeric codes carried in error envelopes
//! - [`ServerConfig`], [`ClientConfig`] and [`DebugLevel`] for configuration
//! - [`ConnectionState`] for the per-connection state machine

mod code;
mod config;
mod error;
mod lifecycle;

pub use code::ErrorCode;
pub use config::{ClientConfig, DEBUG_ENV_VAR, DebugLevel, ServerConfig};
pub use error::{RpcError, RpcResult};
pub use lifecycle::ConnectionState;

/// Log levels for the logging sink
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl LogLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Off,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

impl From<DebugLevel> for LogLevel {
    /// Level 0 keeps warnings and errors, 1 adds debug output, 2 and up trace
    fn from(level: DebugLevel) -> Self {
        match level.get() {
            0 => LogLevel::Warn,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ClientConfig, ConnectionState, DebugLevel, ErrorCode, LogLevel, RpcError, RpcResult,
        ServerConfig,
    };
}
