//! Server: listener, connections, and the readiness loop

use crate::connection::{Connection, Verdict};
use crate::context::CallContext;
use crate::registry::{Procedure, Registry};
use crate::shutdown::ShutdownHandle;
use jrpc_core::{RpcResult, ServerConfig};
use jrpc_json::{Document, NodeId};
use jrpc_transport::{Address, Listener, Stream};
use mio::{Events, Interest, Poll, Token, Waker};
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Token for the listening socket
const LISTENER_TOKEN: Token = Token(0);

/// Token for the shutdown waker
const WAKER_TOKEN: Token = Token(1);

/// First token handed to an accepted connection
const FIRST_CONNECTION_TOKEN: usize = 2;

/// Single-threaded JSON-RPC server
///
/// Connections are serviced on readiness events from a `mio` poll. Every
/// socket operation is non-blocking; partial reads and writes resume on
/// the next event. Requests from one connection are answered in the order
/// they arrived.
pub struct Server {
    poll: Poll,
    events: Events,
    listener: Listener,
    connections: HashMap<Token, Connection<Stream>>,
    next_token: usize,
    registry: Registry,
    doc: Document,
    config: ServerConfig,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Listen on `address`
    pub fn bind(address: &Address, config: ServerConfig) -> RpcResult<Self> {
        let poll = Poll::new()?;
        let mut listener = Listener::bind(address)?;
        poll.registry()
            .register(&mut listener, LISTENER_TOKEN, Interest::READABLE)?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKER_TOKEN)?);

        info!(address = %listener.local_addr()?, "server listening");

        Ok(Self {
            poll,
            events: Events::with_capacity(config.max_events.max(1)),
            listener,
            connections: HashMap::new(),
            next_token: FIRST_CONNECTION_TOKEN,
            registry: Registry::new(),
            doc: Document::new(),
            config,
            shutdown: ShutdownHandle::with_waker(waker),
        })
    }

    /// Register a closure under `name`
    ///
    /// Takes effect for requests dispatched after this call.
    pub fn register<F>(&mut self, name: impl Into<String>, procedure: F) -> RpcResult<()>
    where
        F: FnMut(&mut CallContext<'_>, Option<NodeId>, Option<NodeId>) -> Option<NodeId>
            + Send
            + 'static,
    {
        self.registry.register(name, procedure)
    }

    /// Register any [`Procedure`] implementation under `name`
    pub fn register_procedure(
        &mut self,
        name: impl Into<String>,
        procedure: impl Procedure + 'static,
    ) -> RpcResult<()> {
        self.registry.register(name, procedure)
    }

    /// Remove the procedure registered under `name`
    pub fn deregister(&mut self, name: &str) -> RpcResult<()> {
        self.registry.deregister(name)
    }

    /// Registered procedure names, in registration order
    pub fn procedure_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Address the server listens on, with the actual port for TCP
    pub fn local_addr(&self) -> RpcResult<Address> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle that stops [`Server::run`] from any thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of open connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Serve until shutdown is triggered, then close every connection
    pub fn run(&mut self) -> RpcResult<()> {
        let timeout = Duration::from_millis(self.config.poll_timeout_ms);
        while !self.shutdown.is_triggered() {
            self.run_once(Some(timeout))?;
        }
        self.close_all();
        info!("server stopped");
        Ok(())
    }

    /// Wait up to `timeout` for readiness and handle what arrived
    ///
    /// Returns the number of events handled.
    pub fn run_once(&mut self, timeout: Option<Duration>) -> RpcResult<usize> {
        if let Err(err) = self.poll.poll(&mut self.events, timeout) {
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(0);
            }
            return Err(err.into());
        }

        let ready: Vec<(Token, bool, bool)> = self
            .events
            .iter()
            .map(|event| {
                let readable = event.is_readable() || event.is_read_closed() || event.is_error();
                (event.token(), readable, event.is_writable())
            })
            .collect();

        for &(token, readable, writable) in &ready {
            match token {
                LISTENER_TOKEN => self.accept_all(),
                WAKER_TOKEN => {}
                token => {
                    if readable {
                        self.on_readable(token);
                    }
                    if writable {
                        self.on_writable(token);
                    }
                }
            }
        }
        Ok(ready.len())
    }

    fn accept_all(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((mut stream, peer)) => {
                    let token = Token(self.next_token);
                    self.next_token += 1;

                    if let Err(err) = self.poll.registry().register(
                        &mut stream,
                        token,
                        Interest::READABLE | Interest::WRITABLE,
                    ) {
                        warn!(peer = %peer, error = %err, "failed to register connection");
                        continue;
                    }
                    if self.config.debug_level.logs_methods() {
                        debug!(peer = %peer, "connection accepted");
                    }
                    let conn = Connection::new(stream, peer, self.config.initial_buffer_size);
                    self.connections.insert(token, conn);
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    break;
                }
            }
        }
    }

    fn on_readable(&mut self, token: Token) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };
        let verdict = conn.on_readable(
            &mut self.doc,
            &mut self.registry,
            &self.shutdown,
            self.config.debug_level,
        );
        if verdict == Verdict::Close {
            self.close(token);
        }
    }

    fn on_writable(&mut self, token: Token) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };
        if conn.on_writable() == Verdict::Close {
            self.close(token);
        }
    }

    fn close(&mut self, token: Token) {
        let Some(mut conn) = self.connections.remove(&token) else {
            return;
        };
        if let Err(err) = self.poll.registry().deregister(conn.stream_mut()) {
            debug!(peer = %conn.peer(), error = %err, "deregister failed");
        }
        if self.config.debug_level.logs_methods() {
            debug!(
                peer = %conn.peer(),
                state = %conn.state(),
                unsent = conn.pending_outbound(),
                "connection closed"
            );
        }
        conn.close();
    }

    fn close_all(&mut self) {
        let tokens: Vec<Token> = self.connections.keys().copied().collect();
        for token in tokens {
            self.close(token);
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("connections", &self.connections.len())
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
