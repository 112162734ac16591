//! Newline-terminated JSON framing

use jrpc_core::{RpcError, RpcResult};
use jrpc_json::{Document, Format, NodeId};

/// A complete value parsed from the front of a byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Root of the parsed tree
    pub root: NodeId,
    /// Bytes the value occupied, including leading whitespace
    pub consumed: usize,
}

/// Codec for the wire format: one compact JSON value per line
///
/// There is no length prefix. A frame ends wherever the value's closing
/// token falls; the trailing newline is only whitespace before the next
/// value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl LineCodec {
    /// Render `id` compactly and terminate it with a newline
    pub fn encode(doc: &Document, id: NodeId) -> RpcResult<Vec<u8>> {
        let mut bytes = doc.render(id, Format::Compact)?.into_bytes();
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Parse one value from the front of `input`
    ///
    /// Returns `Ok(None)` when `input` is empty, all whitespace, or a valid
    /// prefix of a value. A parse that stops short of the end of `input` is
    /// a genuine syntax error.
    pub fn decode(doc: &mut Document, input: &[u8]) -> RpcResult<Option<Frame>> {
        let parsed = doc.parse_stream(input);
        let incomplete = parsed.is_incomplete() && parsed.consumed == input.len();
        match parsed.result {
            Ok(root) => Ok(Some(Frame {
                root,
                consumed: parsed.consumed,
            })),
            Err(_) if incomplete => Ok(None),
            Err(err) => Err(RpcError::from(err)),
        }
    }
}
