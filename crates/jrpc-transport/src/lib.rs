//! jrpc-transport - Envelopes, buffering, and framing for jrpc
//!
//! This crate provides:
//! - [`build_request`], [`build_result`], [`build_error`] for constructing
//!   envelopes in a [`Document`](jrpc_json::Document)
//! - [`ByteBuffer`] and [`ConnectionBuffers`] for growable per-connection
//!   read and write buffering with frame extraction
//! - [`LineCodec`] for turning envelopes into newline-terminated wire text
//! - [`Address`], [`Listener`], [`Stream`] and [`BlockingStream`] for TCP
//!   and unix-domain sockets

mod address;
mod buffer;
mod codec;
mod message;
mod socket;

pub use address::{Address, UNIX_PREFIX};
pub use buffer::{ByteBuffer, ConnectionBuffers};
pub use codec::{Frame, LineCodec};
pub use message::{
    MessageId, RemoteError, build_error, build_request, build_result, read_error,
};
pub use socket::{BlockingStream, Listener, Stream};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Address, BlockingStream, ByteBuffer, ConnectionBuffers, Frame, LineCodec, Listener,
        MessageId, Stream, build_error, build_request, build_result,
    };
}
