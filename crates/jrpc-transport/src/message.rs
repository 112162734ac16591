//! Request, result, and error envelopes
//!
//! Every builder takes ownership of the node handles passed in: on success
//! they end up inside the returned envelope, on failure they are deleted
//! together with the partially built envelope.

use jrpc_core::ErrorCode;
use jrpc_json::{Document, JsonResult, Kind, NodeId};

/// Identifier a client attaches to a request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageId {
    Number(i64),
    String(String),
}

impl MessageId {
    /// Create the `id` node for this identifier
    pub fn to_node(&self, doc: &mut Document) -> JsonResult<NodeId> {
        match self {
            MessageId::Number(n) => doc.create_number(*n as f64),
            MessageId::String(s) => doc.create_string(s),
        }
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        MessageId::Number(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        MessageId::String(id.to_owned())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageId::Number(n) => write!(f, "{}", n),
            MessageId::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Error member of a response envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub code: i32,
    pub message: String,
}

/// Build `{"method":…,"params":…,"id":…}`
///
/// `params` is omitted when `None`.
pub fn build_request(
    doc: &mut Document,
    method: &str,
    params: Option<NodeId>,
    id: &MessageId,
) -> JsonResult<NodeId> {
    assemble(doc, &[params], |doc, root| {
        let method = doc.create_string(method)?;
        doc.add_to_object(root, "method", method)?;
        if let Some(params) = params {
            doc.add_to_object(root, "params", params)?;
        }
        let id = id.to_node(doc)?;
        doc.add_to_object(root, "id", id)
    })
}

/// Build `{"result":…,"id":…}`
///
/// The `result` member is left out entirely when `result` is `None`; a
/// missing `id` is written as `null`.
pub fn build_result(
    doc: &mut Document,
    result: Option<NodeId>,
    id: Option<NodeId>,
) -> JsonResult<NodeId> {
    assemble(doc, &[result, id], |doc, root| {
        if let Some(result) = result {
            doc.add_to_object(root, "result", result)?;
        }
        attach_id(doc, root, id)
    })
}

/// Build `{"error":{"code":…,"message":…},"id":…}`
///
/// A missing `id` is written as `null`, which is what the peer sees when
/// its request had no usable id.
pub fn build_error(
    doc: &mut Document,
    code: ErrorCode,
    message: &str,
    id: Option<NodeId>,
) -> JsonResult<NodeId> {
    assemble(doc, &[id], |doc, root| {
        let error = doc.create_object()?;
        doc.add_to_object(root, "error", error)?;
        let code = doc.create_number(f64::from(code.code()))?;
        doc.add_to_object(error, "code", code)?;
        let message = doc.create_string(message)?;
        doc.add_to_object(error, "message", message)?;
        attach_id(doc, root, id)
    })
}

/// Extract the `error` member of a response, if it has one
///
/// A missing or non-numeric code reads as [`ErrorCode::InternalError`] and a
/// missing message as an empty string.
pub fn read_error(doc: &Document, response: NodeId) -> Option<RemoteError> {
    let error = doc.object_item(response, "error")?;
    if doc.kind(error) != Some(Kind::Object) {
        return None;
    }
    let code = doc
        .object_item(error, "code")
        .and_then(|code| doc.as_i32(code))
        .unwrap_or(ErrorCode::InternalError.code());
    let message = doc
        .object_item(error, "message")
        .and_then(|message| doc.as_str(message))
        .unwrap_or_default()
        .to_owned();
    Some(RemoteError { code, message })
}

fn attach_id(doc: &mut Document, root: NodeId, id: Option<NodeId>) -> JsonResult<()> {
    let id = match id {
        Some(id) => id,
        None => doc.create_null()?,
    };
    doc.add_to_object(root, "id", id)
}

fn assemble(
    doc: &mut Document,
    inputs: &[Option<NodeId>],
    build: impl FnOnce(&mut Document, NodeId) -> JsonResult<()>,
) -> JsonResult<NodeId> {
    let root = match doc.create_object() {
        Ok(root) => root,
        Err(err) => {
            release(doc, inputs);
            return Err(err);
        }
    };
    if let Err(err) = build(doc, root) {
        doc.delete(root);
        release(doc, inputs);
        return Err(err);
    }
    Ok(root)
}

/// Delete inputs the failed build never attached
fn release(doc: &mut Document, inputs: &[Option<NodeId>]) {
    for &id in inputs.iter().flatten() {
        if doc.contains(id) && doc.parent(id).is_none() {
            doc.delete(id);
        }
    }
}

#[cfg(test)]
#[path = "message/message_tests.rs"]
mod message_tests;
