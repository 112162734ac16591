//! Per-connection state machine

use serde::{Deserialize, Serialize};

/// Connection states
///
/// State transitions:
/// ```text
/// Open → Reading ⇄ Dispatching ⇄ Writing
///          ↑                        │
///          └────────────────────────┘
///    Any state → Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Accepted or connected, no I/O yet
    #[default]
    Open,
    /// Pulling bytes into the inbound buffer
    Reading,
    /// Evaluating a framed request
    Dispatching,
    /// Draining the outbound buffer
    Writing,
    /// Socket released; no further transitions
    Closed,
}

impl ConnectionState {
    /// Check if this state can transition to the target state
    pub fn can_transition_to(&self, target: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Open, Reading)
                | (Open, Writing)
                | (Reading, Dispatching)
                | (Reading, Writing)
                | (Dispatching, Writing)
                | (Dispatching, Reading)
                | (Writing, Reading)
                | (Writing, Dispatching)
                | (Open, Closed)
                | (Reading, Closed)
                | (Dispatching, Closed)
                | (Writing, Closed)
        )
    }

    /// Check if the connection may still carry traffic
    pub fn is_active(&self) -> bool {
        !matches!(self, ConnectionState::Closed)
    }

    /// Check if the connection is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }

    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            ConnectionState::Open => "Connection is open",
            ConnectionState::Reading => "Connection is reading",
            ConnectionState::Dispatching => "Connection is dispatching a request",
            ConnectionState::Writing => "Connection is writing",
            ConnectionState::Closed => "Connection is closed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Reading => write!(f, "Reading"),
            ConnectionState::Dispatching => write!(f, "Dispatching"),
            ConnectionState::Writing => write!(f, "Writing"),
            ConnectionState::Closed => write!(f, "Closed"),
        }
    }
}
