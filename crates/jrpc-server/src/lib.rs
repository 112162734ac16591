//! jrpc-server - Readiness-driven JSON-RPC server
//!
//! This crate provides:
//! - [`Server`] accepting TCP or unix-domain connections on a `mio` poll
//! - [`Registry`] and the [`Procedure`] trait for named procedures
//! - [`CallContext`] handed to a procedure for one invocation
//! - [`ShutdownHandle`] for stopping the server from any thread
//!
//! # Example
//!
//! ```no_run
//! use jrpc_server::prelude::*;
//!
//! let address: Address = "127.0.0.1:8080".parse()?;
//! let mut server = Server::bind(&address, ServerConfig::from_env())?;
//! server.register("sayHello", |ctx: &mut CallContext<'_>, _params, _id| {
//!     ctx.doc().create_string("Hello!").ok()
//! })?;
//! server.run()?;
//! # Ok::<(), jrpc_core::RpcError>(())
//! ```

mod connection;
mod context;
mod dispatch;
mod registry;
mod server;
mod shutdown;

pub use context::CallContext;
pub use registry::{Procedure, Registry};
pub use server::Server;
pub use shutdown::ShutdownHandle;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{CallContext, Procedure, Registry, Server, ShutdownHandle};
    pub use jrpc_core::{ErrorCode, RpcError, RpcResult, ServerConfig};
    pub use jrpc_json::{Document, Kind, NodeId};
    pub use jrpc_transport::Address;
}
