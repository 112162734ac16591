//! Server and client configuration

use jrpc_json::parse_i64;
use serde::{Deserialize, Serialize};

/// Environment variable holding the debug verbosity
pub const DEBUG_ENV_VAR: &str = "JRPC_DEBUG";

/// Debug verbosity
///
/// Level 0 is silent, level 1 logs method invocations and connection
/// events, level 2 and above also logs raw request and response text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebugLevel(u8);

impl DebugLevel {
    pub const SILENT: DebugLevel = DebugLevel(0);

    pub fn new(level: u8) -> Self {
        Self(level)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Parse the way `strtol` would: leading whitespace and a sign are
    /// accepted and trailing garbage is ignored. Unparsable or negative
    /// values give level 0; large values clamp to 255.
    pub fn parse(text: &str) -> Self {
        let value = parse_i64(text).unwrap_or(0);
        Self(value.clamp(0, i64::from(u8::MAX)) as u8)
    }

    /// Read [`DEBUG_ENV_VAR`]; absent means level 0
    pub fn from_env() -> Self {
        std::env::var(DEBUG_ENV_VAR)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    /// Log method names as they are invoked
    pub fn logs_methods(&self) -> bool {
        self.0 > 0
    }

    /// Log raw request and response text
    pub fn logs_payloads(&self) -> bool {
        self.0 > 1
    }
}

impl std::fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Debug verbosity; defaults to the value of [`DEBUG_ENV_VAR`]
    #[serde(default = "DebugLevel::from_env")]
    pub debug_level: DebugLevel,

    /// Initial capacity of each connection buffer in bytes
    #[serde(default = "default_buffer_size")]
    pub initial_buffer_size: usize,

    /// Maximum readiness events handled per poll
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// Poll timeout in milliseconds used by `run`
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_ms: u64,
}

fn default_buffer_size() -> usize {
    1500
}

fn default_max_events() -> usize {
    128
}

fn default_poll_timeout() -> u64 {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            debug_level: DebugLevel::from_env(),
            initial_buffer_size: default_buffer_size(),
            max_events: default_max_events(),
            poll_timeout_ms: default_poll_timeout(),
        }
    }
}

impl ServerConfig {
    /// Create a configuration with default values
    ///
    /// The debug level is read from [`DEBUG_ENV_VAR`] at this point.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the debug level taken from the environment
    ///
    /// Same as [`Default::default`], spelled out for call sites.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Set the debug level
    pub fn with_debug_level(mut self, level: DebugLevel) -> Self {
        self.debug_level = level;
        self
    }

    /// Set the initial buffer size
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.initial_buffer_size = size;
        self
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Debug verbosity; defaults to the value of [`DEBUG_ENV_VAR`]
    #[serde(default = "DebugLevel::from_env")]
    pub debug_level: DebugLevel,

    /// Initial capacity of the inbound buffer in bytes
    #[serde(default = "default_buffer_size")]
    pub initial_buffer_size: usize,

    /// Read timeout in milliseconds; `None` blocks until the peer answers
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            debug_level: DebugLevel::from_env(),
            initial_buffer_size: default_buffer_size(),
            read_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with default values
    ///
    /// The debug level is read from [`DEBUG_ENV_VAR`] at this point.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the debug level taken from the environment
    ///
    /// Same as [`Default::default`], spelled out for call sites.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Set the debug level
    pub fn with_debug_level(mut self, level: DebugLevel) -> Self {
        self.debug_level = level;
        self
    }

    /// Set the read timeout
    pub fn with_read_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.read_timeout_ms = Some(timeout_ms);
        self
    }
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
