//! Error types for jrpc servers and clients

use crate::code::ErrorCode;
use jrpc_json::JsonError;
use thiserror::Error;

/// Result type alias for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

/// Error type for RPC operations
///
/// Variants fall into four groups: transport faults and framing faults are
/// fatal to the connection they occur on, resource exhaustion is treated
/// like a transport fault, and application faults are reported to the peer
/// as error envelopes while the connection stays open.
#[derive(Error, Debug)]
pub enum RpcError {
    /// Socket read or write failed
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Peer closed the connection
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// Well-formed JSON that violates the request/response protocol
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Malformed JSON in the byte stream
    #[error("parse error at offset {offset}")]
    Parse { offset: usize },

    /// The peer answered with an error envelope
    #[error("remote error {code}: {message}")]
    Remote { code: i32, message: String },

    /// A buffer or document could not grow
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Document operation failed
    #[error("document error: {0}")]
    Json(JsonError),

    /// A procedure with this name is already registered
    #[error("procedure already registered: {0}")]
    DuplicateProcedure(String),

    /// No procedure with this name is registered
    #[error("procedure not found: {0}")]
    ProcedureNotFound(String),
}

impl RpcError {
    /// Check if the error must close the connection it occurred on
    pub fn is_fatal(&self) -> bool {
        match self {
            RpcError::Transport(_)
            | RpcError::ConnectionClosed
            | RpcError::Parse { .. }
            | RpcError::ResourceExhausted(_) => true,
            RpcError::Protocol(_)
            | RpcError::Remote { .. }
            | RpcError::Config(_)
            | RpcError::Json(_)
            | RpcError::DuplicateProcedure(_)
            | RpcError::ProcedureNotFound(_) => false,
        }
    }

    /// Error code to report to the peer for this error
    pub fn error_code(&self) -> ErrorCode {
        match self {
            RpcError::Parse { .. } => ErrorCode::ParseError,
            RpcError::Protocol(_) => ErrorCode::InvalidRequest,
            RpcError::ProcedureNotFound(_) => ErrorCode::MethodNotFound,
            RpcError::Remote { code, .. } => ErrorCode::from_code(*code),
            _ => ErrorCode::InternalError,
        }
    }

    /// Build a remote error from a code and message
    pub fn remote(code: ErrorCode, message: impl Into<String>) -> Self {
        RpcError::Remote {
            code: code.code(),
            message: message.into(),
        }
    }
}

impl From<JsonError> for RpcError {
    fn from(err: JsonError) -> Self {
        match err {
            JsonError::Parse { offset, .. } => RpcError::Parse { offset },
            JsonError::OutOfMemory { requested } => {
                RpcError::ResourceExhausted(format!("allocation of {requested} bytes refused"))
            }
            JsonError::Io(io) => RpcError::Transport(io),
            other => RpcError::Json(other),
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Config(err.to_string())
    }
}
