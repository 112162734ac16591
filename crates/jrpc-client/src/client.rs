//! Synchronous request/response over one connection

use jrpc_core::{ClientConfig, ErrorCode, RpcError, RpcResult};
use jrpc_json::{Document, Format, Kind, NodeId, parse_i64};
use jrpc_transport::{
    Address, BlockingStream, ConnectionBuffers, LineCodec, MessageId, build_error, build_request,
    read_error,
};
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Blocking JSON-RPC client
///
/// Ids start at 0 and advance by one for every answered call. Only one
/// call is in flight at a time. A transport failure, a corrupt stream, or
/// a response with the wrong id leaves the connection unusable; later
/// calls fail with [`RpcError::ConnectionClosed`].
pub struct Client {
    stream: BlockingStream,
    buffers: ConnectionBuffers,
    address: Address,
    config: ClientConfig,
    next_id: i64,
    broken: bool,
}

impl Client {
    /// Connect to `address`
    pub fn connect(address: &Address, config: ClientConfig) -> RpcResult<Self> {
        let stream = BlockingStream::connect(address)?;
        stream.set_read_timeout(config.read_timeout_ms.map(Duration::from_millis))?;
        if config.debug_level.logs_methods() {
            debug!(address = %address, debug_level = %config.debug_level, "client connected");
        }
        Ok(Self {
            stream,
            buffers: ConnectionBuffers::new(config.initial_buffer_size),
            address: address.clone(),
            config,
            next_id: 0,
            broken: false,
        })
    }

    /// Id the next call will use
    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether a previous failure has made the connection unusable
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Call `method` and wait for its result
    ///
    /// `params` must be a detached tree in `doc`; it is consumed. The result
    /// is returned as a detached tree in `doc`, owned by the caller. A
    /// response carrying an `error` member fails with [`RpcError::Remote`].
    pub fn call(
        &mut self,
        doc: &mut Document,
        method: &str,
        params: Option<NodeId>,
    ) -> RpcResult<NodeId> {
        if self.broken {
            if let Some(params) = params {
                doc.delete(params);
            }
            return Err(RpcError::ConnectionClosed);
        }
        let outcome = self.exchange(doc, method, params);
        if let Err(err) = &outcome
            && (err.is_fatal() || matches!(err, RpcError::Protocol(_)))
        {
            self.broken = true;
        }
        outcome
    }

    /// Shut the connection down
    pub fn close(self) -> RpcResult<()> {
        match self.stream.shutdown() {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn exchange(
        &mut self,
        doc: &mut Document,
        method: &str,
        params: Option<NodeId>,
    ) -> RpcResult<NodeId> {
        let expected = self.next_id;
        let request = build_request(doc, method, params, &MessageId::Number(expected))?;
        if self.config.debug_level.logs_methods() {
            debug!(method, id = expected, "calling method");
        }
        if self.config.debug_level.logs_payloads()
            && let Ok(text) = doc.render(request, Format::Pretty)
        {
            trace!(request = %text, "JSON request");
        }
        let encoded = LineCodec::encode(doc, request);
        doc.delete(request);
        self.stream.write_all(&encoded?)?;

        loop {
            match self.buffers.try_extract_frame(doc) {
                Ok(Some(response)) => {
                    let outcome = self.correlate(doc, response, expected);
                    doc.delete(response);
                    return outcome;
                }
                Ok(None) => {}
                Err(RpcError::Parse { offset }) => {
                    if self.config.debug_level.logs_methods() {
                        let buffered = String::from_utf8_lossy(self.buffers.inbound().as_slice());
                        warn!(offset, buffered = %buffered, "invalid JSON received");
                    }
                    self.notify_parse_error(doc);
                    return Err(RpcError::Parse { offset });
                }
                Err(err) => return Err(err),
            }

            match self.buffers.read_inbound(&mut self.stream) {
                Ok(0) => {
                    if self.config.debug_level.logs_methods() {
                        debug!("server closed connection");
                    }
                    return Err(RpcError::ConnectionClosed);
                }
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) if err.kind() == io::ErrorKind::OutOfMemory => {
                    return Err(RpcError::ResourceExhausted(err.to_string()));
                }
                Err(err) => return Err(RpcError::Transport(err)),
            }
        }
    }

    /// Match a framed response against the outstanding call
    fn correlate(&mut self, doc: &mut Document, response: NodeId, expected: i64) -> RpcResult<NodeId> {
        if self.config.debug_level.logs_payloads()
            && let Ok(text) = doc.render(response, Format::Pretty)
        {
            trace!(response = %text, "JSON response");
        }
        if doc.kind(response) != Some(Kind::Object) {
            return Err(RpcError::Protocol("response is not an object".to_string()));
        }

        let id = match doc.object_item(response, "id") {
            None => None,
            Some(id) => match doc.kind(id) {
                Some(Kind::Null) => None,
                Some(Kind::Number) => doc.as_f64(id).map(|value| value as i64),
                Some(Kind::String) => doc.as_str(id).and_then(parse_i64),
                _ => {
                    return Err(RpcError::Protocol(
                        "response id must be a number or a string".to_string(),
                    ));
                }
            },
        };
        let matched = match id {
            Some(id) if id == expected => true,
            Some(id) => {
                return Err(RpcError::Protocol(format!(
                    "response id {id} does not match request id {expected}"
                )));
            }
            None => false,
        };

        if let Some(error) = read_error(doc, response) {
            self.next_id += 1;
            return Err(RpcError::Remote {
                code: error.code,
                message: error.message,
            });
        }
        if !matched {
            return Err(RpcError::Protocol("response carries no id".to_string()));
        }

        self.next_id += 1;
        doc.detach_from_object(response, "result")
            .ok_or_else(|| RpcError::Protocol("response has no result member".to_string()))
    }

    /// Best-effort notice to the server that its output was unparseable
    fn notify_parse_error(&mut self, doc: &mut Document) {
        let code = ErrorCode::ParseError;
        let Ok(envelope) = build_error(doc, code, code.default_message(), None) else {
            return;
        };
        let encoded = LineCodec::encode(doc, envelope);
        doc.delete(envelope);
        if let Ok(bytes) = encoded
            && let Err(err) = self.stream.write_all(&bytes)
        {
            debug!(error = %err, "could not send parse error");
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("address", &self.address)
            .field("next_id", &self.next_id)
            .field("broken", &self.broken)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "client/client_tests.rs"]
mod client_tests;
