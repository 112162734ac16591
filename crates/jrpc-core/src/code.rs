//! Numeric error codes carried in error envelopes

/// Error code placed in the `error.code` member of a response
///
/// The reserved codes follow the JSON-RPC numbering. `InvalidParams` and
/// `InternalError` are never produced by dispatch itself but are available
/// to procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Invalid JSON was received
    ParseError,
    /// The JSON is not a valid request object
    InvalidRequest,
    /// No procedure is registered under the method name
    MethodNotFound,
    /// Invalid method parameters
    InvalidParams,
    /// Internal error
    InternalError,
    /// Any other code, set by a procedure
    Application(i32),
}

impl ErrorCode {
    /// Wire value of this code
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32603,
            ErrorCode::InternalError => -32693,
            ErrorCode::Application(code) => *code,
        }
    }

    /// Map a wire value back to a code
    pub fn from_code(code: i32) -> Self {
        match code {
            -32700 => ErrorCode::ParseError,
            -32600 => ErrorCode::InvalidRequest,
            -32601 => ErrorCode::MethodNotFound,
            -32603 => ErrorCode::InvalidParams,
            -32693 => ErrorCode::InternalError,
            other => ErrorCode::Application(other),
        }
    }

    /// Message sent with this code when nothing more specific is known
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error. Invalid JSON was received by the server.",
            ErrorCode::InvalidRequest => "The JSON sent is not a valid Request object.",
            ErrorCode::MethodNotFound => "Method not found.",
            ErrorCode::InvalidParams => "Invalid params.",
            ErrorCode::InternalError => "Internal error.",
            ErrorCode::Application(_) => "Application error.",
        }
    }

    /// Check if the code is one of the reserved protocol codes
    pub fn is_reserved(&self) -> bool {
        !matches!(self, ErrorCode::Application(_))
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        ErrorCode::from_code(code)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
