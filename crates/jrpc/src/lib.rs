//! # jrpc
//!
//! A lightweight JSON-RPC transport: newline-delimited JSON requests and
//! responses over TCP or unix-domain sockets.
//!
//! jrpc provides:
//! - An arena-backed JSON document with a streaming parser
//! - A single-threaded, readiness-driven server with a procedure registry
//! - A blocking client with request/response id correlation
//! - Logging through `tracing`, with verbosity from `JRPC_DEBUG`
//!
//! ## Serving procedures
//!
//! ```no_run
//! use jrpc::prelude::*;
//!
//! let address = Address::parse("127.0.0.1", "1234")?;
//! let config = ServerConfig::from_env();
//! init_logging(config.debug_level);
//!
//! let mut server = Server::bind(&address, config)?;
//! server.register("sayHello", |ctx: &mut CallContext<'_>, _params, _id| {
//!     ctx.doc().create_string("Hello!").ok()
//! })?;
//! server.register("exit", |ctx: &mut CallContext<'_>, _params, _id| {
//!     ctx.stop_server();
//!     ctx.doc().create_string("Bye!").ok()
//! })?;
//! server.run()?;
//! # Ok::<(), RpcError>(())
//! ```
//!
//! ## Calling them
//!
//! ```no_run
//! use jrpc::prelude::*;
//!
//! let address = Address::parse("127.0.0.1", "1234")?;
//! let mut client = Client::connect(&address, ClientConfig::from_env())?;
//! let mut doc = Document::new();
//!
//! let greeting = client.call(&mut doc, "sayHello", None)?;
//! println!("{}", doc.render(greeting, Format::Pretty)?);
//! # Ok::<(), RpcError>(())
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`jrpc_json`] - Document, parser, and serializer
//! - [`jrpc_core`] - Errors, error codes, configuration, connection states
//! - [`jrpc_transport`] - Envelopes, buffers, framing, and sockets
//! - [`jrpc_logging`] - Log sink and subscriber setup
//! - [`jrpc_server`] - Server and procedure registry
//! - [`jrpc_client`] - Blocking client

// Re-export document types
pub use jrpc_json::{
    Allocator, BoundedAllocator, Document, Format, JsonError, JsonResult, Kind, NodeId,
    SystemAllocator,
};

// Re-export core types
pub use jrpc_core::{
    ClientConfig, ConnectionState, DebugLevel, ErrorCode, LogLevel, RpcError, RpcResult,
    ServerConfig,
};

// Re-export transport types
pub use jrpc_transport::{Address, LineCodec, MessageId, build_error, build_request, build_result};

// Re-export logging
pub use jrpc_logging::{LogSink, LogSinkManager, ReloadHandle, init_logging};

// Re-export server and client
pub use jrpc_client::Client;
pub use jrpc_server::{CallContext, Procedure, Registry, Server, ShutdownHandle};

// Re-export common dependencies that embedders need
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use jrpc::prelude::*;` to import commonly used types.
pub mod prelude {
    pub use crate::{
        Address, CallContext, Client, ClientConfig, Document, ErrorCode, Format, Kind, NodeId,
        Procedure, RpcError, RpcResult, Server, ServerConfig, init_logging,
    };
}
