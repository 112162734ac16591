//! One accepted connection and its read/dispatch/write cycle

use crate::dispatch;
use crate::registry::Registry;
use crate::shutdown::ShutdownHandle;
use jrpc_core::{ConnectionState, DebugLevel, ErrorCode, RpcError, RpcResult};
use jrpc_json::{Document, Format, NodeId};
use jrpc_transport::{ConnectionBuffers, LineCodec, build_error};
use std::io::{self, Read, Write};
use tracing::{debug, trace, warn};

/// What the server should do with a connection after servicing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Keep,
    Close,
}

pub(crate) struct Connection<S> {
    stream: S,
    peer: String,
    buffers: ConnectionBuffers,
    state: ConnectionState,
}

impl<S: Read + Write> Connection<S> {
    pub(crate) fn new(stream: S, peer: String, buffer_size: usize) -> Self {
        Self {
            stream,
            peer,
            buffers: ConnectionBuffers::new(buffer_size),
            state: ConnectionState::Open,
        }
    }

    pub(crate) fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub(crate) fn peer(&self) -> &str {
        &self.peer
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }

    /// Move to `next` if the state machine allows it; staying put is a no-op
    fn enter(&mut self, next: ConnectionState) {
        if self.state.can_transition_to(next) {
            trace!(peer = %self.peer, from = %self.state, to = %next, "connection state");
            self.state = next;
        }
    }

    /// Read everything available, evaluate every complete frame, and queue
    /// the responses in arrival order
    pub(crate) fn on_readable(
        &mut self,
        doc: &mut Document,
        registry: &mut Registry,
        shutdown: &ShutdownHandle,
        debug_level: DebugLevel,
    ) -> Verdict {
        self.enter(ConnectionState::Reading);
        let at_eof = match self.fill() {
            Ok(at_eof) => at_eof,
            Err(err) => {
                debug!(peer = %self.peer, error = %err, "read failed");
                return Verdict::Close;
            }
        };

        loop {
            let request = match self.buffers.try_extract_frame(doc) {
                Ok(Some(request)) => request,
                Ok(None) => break,
                Err(RpcError::Parse { offset }) => {
                    if debug_level.logs_methods() {
                        debug!(peer = %self.peer, offset, "invalid JSON received");
                    }
                    if debug_level.logs_payloads() {
                        let buffered = String::from_utf8_lossy(self.buffers.inbound().as_slice());
                        trace!(peer = %self.peer, buffered = %buffered, "discarding unparseable input");
                    }
                    self.reply_parse_error(doc, debug_level);
                    return Verdict::Close;
                }
                Err(err) => {
                    warn!(peer = %self.peer, error = %err, "framing failed");
                    return Verdict::Close;
                }
            };

            self.enter(ConnectionState::Dispatching);
            if debug_level.logs_payloads()
                && let Ok(text) = doc.render(request, Format::Pretty)
            {
                trace!(peer = %self.peer, request = %text, "JSON request");
            }
            let envelope = dispatch::evaluate(doc, request, registry, shutdown, debug_level);
            doc.delete(request);

            let sent = match envelope {
                Ok(Some(envelope)) => self.send(doc, envelope, debug_level),
                Ok(None) => Ok(()),
                Err(err) => Err(RpcError::from(err)),
            };
            if let Err(err) = sent {
                warn!(peer = %self.peer, error = %err, "failed to answer request");
                return Verdict::Close;
            }
        }

        if at_eof {
            if debug_level.logs_methods() {
                debug!(peer = %self.peer, "peer closed connection");
            }
            return Verdict::Close;
        }
        Verdict::Keep
    }

    /// Drain the outbound buffer as far as the socket allows
    pub(crate) fn on_writable(&mut self) -> Verdict {
        if self.buffers.pending_outbound() == 0 {
            return Verdict::Keep;
        }
        self.enter(ConnectionState::Writing);
        match self.buffers.flush_outbound(&mut self.stream) {
            Ok(_) => Verdict::Keep,
            Err(err) => {
                debug!(peer = %self.peer, error = %err, "write failed");
                Verdict::Close
            }
        }
    }

    pub(crate) fn close(&mut self) {
        self.enter(ConnectionState::Closed);
    }

    pub(crate) fn pending_outbound(&self) -> usize {
        self.buffers.pending_outbound()
    }

    /// Read until the socket would block; returns whether the peer hung up
    fn fill(&mut self) -> RpcResult<bool> {
        loop {
            match self.buffers.read_inbound(&mut self.stream) {
                Ok(0) => return Ok(true),
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) if e.kind() == io::ErrorKind::OutOfMemory => {
                    return Err(RpcError::ResourceExhausted(e.to_string()));
                }
                Err(e) => return Err(RpcError::Transport(e)),
            }
        }
    }

    /// Encode `envelope`, release it, and queue the bytes for the peer
    fn send(&mut self, doc: &mut Document, envelope: NodeId, debug_level: DebugLevel) -> RpcResult<()> {
        let encoded = LineCodec::encode(doc, envelope);
        doc.delete(envelope);
        let bytes = encoded?;
        if debug_level.logs_payloads() {
            let text = String::from_utf8_lossy(&bytes);
            trace!(peer = %self.peer, response = %text.trim_end(), "JSON response");
        }
        self.enter(ConnectionState::Writing);
        self.buffers.enqueue_outbound(&bytes, &mut self.stream)?;
        Ok(())
    }

    /// Best-effort notice before a connection is dropped for bad framing
    fn reply_parse_error(&mut self, doc: &mut Document, debug_level: DebugLevel) {
        let code = ErrorCode::ParseError;
        let sent = build_error(doc, code, code.default_message(), None)
            .map_err(RpcError::from)
            .and_then(|envelope| self.send(doc, envelope, debug_level));
        if let Err(err) = sent {
            debug!(peer = %self.peer, error = %err, "could not send parse error");
        }
    }
}
