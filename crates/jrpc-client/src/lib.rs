//! jrpc-client - Blocking JSON-RPC client
//!
//! [`Client`] owns one connection and performs one call at a time: it
//! writes the request, then blocks until the response carrying the same id
//! has been framed.
//!
//! # Example
//!
//! ```no_run
//! use jrpc_client::prelude::*;
//!
//! let address: Address = "127.0.0.1:8080".parse()?;
//! let mut client = Client::connect(&address, ClientConfig::from_env())?;
//! let mut doc = Document::new();
//! let params = doc.parse_str(r#"{"A":3,"B":10}"#)?;
//! let result = client.call(&mut doc, "add", Some(params))?;
//! assert_eq!(doc.as_i32(result), Some(13));
//! # Ok::<(), jrpc_core::RpcError>(())
//! ```

mod client;

pub use client::Client;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::Client;
    pub use jrpc_core::{ClientConfig, ErrorCode, RpcError, RpcResult};
    pub use jrpc_json::{Document, Format, Kind, NodeId};
    pub use jrpc_transport::Address;
}
