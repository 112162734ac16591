//! Error types for the document engine

use crate::node::Kind;
use thiserror::Error;

/// Result type alias for document operations
pub type JsonResult<T> = Result<T, JsonError>;

/// Why the parser gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// Input ended before the value was complete
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A byte that cannot start or continue a value
    #[error("unexpected byte 0x{0:02x}")]
    UnexpectedByte(u8),

    /// A keyword other than `null`, `true` or `false`
    #[error("invalid literal")]
    InvalidLiteral,

    /// Malformed number (missing digits after sign, dot, or exponent)
    #[error("invalid number")]
    InvalidNumber,

    /// Object member key is not a string
    #[error("expected string key")]
    ExpectedKey,

    /// Missing `:` between key and value
    #[error("expected ':' after key")]
    ExpectedColon,

    /// Missing `,` or closing bracket
    #[error("expected ',' or closing bracket")]
    ExpectedCommaOrClose,

    /// A `,` immediately followed by the closing bracket
    #[error("trailing comma")]
    TrailingComma,

    /// String contents are not valid UTF-8
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// Nesting exceeds [`MAX_DEPTH`](crate::MAX_DEPTH)
    #[error("nesting too deep")]
    TooDeep,
}

/// Errors that can occur while building, parsing, or rendering documents
#[derive(Error, Debug)]
pub enum JsonError {
    /// Input text could not be parsed
    #[error("parse error at offset {offset}: {reason}")]
    Parse { offset: usize, reason: ParseFailure },

    /// Handle does not refer to a live node in this document
    #[error("unknown node handle")]
    UnknownNode,

    /// Operation requires a different kind of node
    #[error("expected {expected} node, found {actual}")]
    KindMismatch { expected: Kind, actual: Kind },

    /// Node already has a parent; detach it first
    #[error("node is already attached to a parent")]
    AlreadyAttached,

    /// Attaching the node would make it its own ancestor
    #[error("attaching the node would create a cycle")]
    Cycle,

    /// Reference nodes alias another node and cannot be mutated
    #[error("reference nodes are read-only")]
    ReadOnlyReference,

    /// No item at the requested index or name
    #[error("no such item")]
    NotFound,

    /// Tree is nested deeper than the renderer allows
    #[error("tree nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    /// Allocator refused the request
    #[error("allocation of {requested} bytes refused by allocator")]
    OutOfMemory { requested: usize },

    /// I/O error while reading or writing a document file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JsonError {
    /// Offset into the input where parsing stopped, if this is a parse error
    pub fn parse_offset(&self) -> Option<usize> {
        match self {
            JsonError::Parse { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Check if this error means the input ended inside a valid prefix
    pub fn is_unexpected_end(&self) -> bool {
        matches!(
            self,
            JsonError::Parse {
                reason: ParseFailure::UnexpectedEnd,
                ..
            }
        )
    }
}

#[cfg(test)]
#[path = "error/error_tests.rs"]
mod error_tests;
