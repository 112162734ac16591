//! Request evaluation: shape checks, lookup, invocation, envelope

use crate::context::CallContext;
use crate::registry::Registry;
use crate::shutdown::ShutdownHandle;
use jrpc_core::{DebugLevel, ErrorCode};
use jrpc_json::{Document, JsonResult, Kind, NodeId};
use jrpc_transport::{build_error, build_result};
use tracing::debug;

/// Members of a well-formed request
struct RequestShape {
    method: String,
    params: Option<NodeId>,
    id: Option<NodeId>,
}

/// Evaluate one framed request and build the response envelope
///
/// Returns `Ok(None)` for top-level values that are not objects; those are
/// ignored. The request tree is left in place for the caller to delete; the
/// returned envelope owns copies of everything it needs.
pub(crate) fn evaluate(
    doc: &mut Document,
    request: NodeId,
    registry: &mut Registry,
    shutdown: &ShutdownHandle,
    debug_level: DebugLevel,
) -> JsonResult<Option<NodeId>> {
    if doc.kind(request) != Some(Kind::Object) {
        return Ok(None);
    }

    let Some(shape) = validate(doc, request) else {
        let code = ErrorCode::InvalidRequest;
        return build_error(doc, code, code.default_message(), None).map(Some);
    };

    // the envelope must not share the request's id node
    let id = shape.id.map(|id| doc.duplicate(id)).transpose()?;

    let Some(procedure) = registry.find_mut(&shape.method) else {
        if debug_level.logs_methods() {
            debug!(method = %shape.method, "method not found");
        }
        let code = ErrorCode::MethodNotFound;
        return build_error(doc, code, code.default_message(), id).map(Some);
    };

    if debug_level.logs_methods() {
        debug!(method = %shape.method, "method invoked");
    }

    let mut ctx = CallContext::new(doc, &shape.method, shutdown);
    let returned = procedure.invoke(&mut ctx, shape.params, shape.id);
    let error = ctx.take_error();

    let result = match claim_result(doc, request, returned) {
        Ok(result) => result,
        Err(err) => {
            discard(doc, id);
            return Err(err);
        }
    };

    match error {
        Some((code, message)) => {
            discard(doc, result);
            build_error(doc, code, &message, id).map(Some)
        }
        None => build_result(doc, result, id).map(Some),
    }
}

fn validate(doc: &Document, request: NodeId) -> Option<RequestShape> {
    let method = doc
        .object_item(request, "method")
        .and_then(|method| doc.as_str(method))?
        .to_owned();

    let params = doc.object_item(request, "params");
    if let Some(params) = params
        && !matches!(doc.kind(params), Some(Kind::Array | Kind::Object))
    {
        return None;
    }

    let id = doc.object_item(request, "id");
    if let Some(id) = id
        && !matches!(doc.kind(id), Some(Kind::String | Kind::Number))
    {
        return None;
    }

    Some(RequestShape { method, params, id })
}

/// Make the procedure's return value safe to attach to the envelope
///
/// Nodes that are still attached (or are the request itself) are copied;
/// stale ids are dropped.
fn claim_result(
    doc: &mut Document,
    request: NodeId,
    returned: Option<NodeId>,
) -> JsonResult<Option<NodeId>> {
    match returned {
        Some(node) if !doc.contains(node) => Ok(None),
        Some(node) if node == request || doc.parent(node).is_some() => {
            doc.duplicate(node).map(Some)
        }
        other => Ok(other),
    }
}

fn discard(doc: &mut Document, node: Option<NodeId>) {
    if let Some(node) = node {
        doc.delete(node);
    }
}
