//! jrpc-json - JSON document engine
//!
//! This crate provides the document layer the jrpc transport is built on:
//!
//! - [`Document`] - an arena of generation-checked nodes holding one or
//!   more JSON trees
//! - [`Document::parse_stream`] - a parser that reports exactly how many
//!   bytes it consumed, so a framer can tell a complete value from a valid
//!   prefix that needs more input
//! - [`Document::render`] / [`Document::print`] - compact and pretty
//!   serialization, the latter cached per node
//! - [`Allocator`] - per-document allocation accounting
//!
//! # Example
//!
//! ```
//! use jrpc_json::{Document, Format};
//!
//! let mut doc = Document::new();
//! let parsed = doc.parse_stream(br#"{"method":"sum","params":[1,2]} {"#);
//! let root = parsed.result?;
//!
//! assert_eq!(parsed.consumed, 31);
//! let method = doc.object_item(root, "method").and_then(|m| doc.as_str(m));
//! assert_eq!(method, Some("sum"));
//! assert_eq!(doc.render(root, Format::Compact)?, r#"{"method":"sum","params":[1,2]}"#);
//! # Ok::<(), jrpc_json::JsonError>(())
//! ```

mod alloc;
mod document;
mod error;
mod io;
mod node;
mod number;
mod parse;
mod print;
mod tree;
mod value;

pub use alloc::{AllocError, Allocator, BoundedAllocator, SystemAllocator};
pub use document::{Children, Document, MAX_DEPTH};
pub use error::{JsonError, JsonResult, ParseFailure};
pub use node::{Kind, NodeId};
pub use number::{Number, parse_f64, parse_i64};
pub use parse::StreamParse;
pub use print::Format;
