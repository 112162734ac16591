#![allow(non_snake_case)]

use super::*;
use jrpc_json::{BoundedAllocator, Format};

fn compact(doc: &Document, id: NodeId) -> String {
    doc.render(id, Format::Compact).unwrap()
}

#[test]
fn build_request___with_params___orders_members() {
    let mut doc = Document::new();
    let params = doc.create_int_array(&[1, 2]).unwrap();

    let request = build_request(&mut doc, "sum", Some(params), &MessageId::Number(0)).unwrap();

    assert_eq!(compact(&doc, request), r#"{"method":"sum","params":[1,2],"id":0}"#);
    assert_eq!(doc.parent(params), Some(request));
}

#[test]
fn build_request___without_params___omits_member() {
    let mut doc = Document::new();

    let request = build_request(&mut doc, "ping", None, &MessageId::from("a-1")).unwrap();

    assert_eq!(compact(&doc, request), r#"{"method":"ping","id":"a-1"}"#);
}

#[test]
fn build_result___with_result___wraps_value() {
    let mut doc = Document::new();
    let result = doc.create_string("Hello!").unwrap();
    let id = doc.create_number(3.0).unwrap();

    let response = build_result(&mut doc, Some(result), Some(id)).unwrap();

    assert_eq!(compact(&doc, response), r#"{"result":"Hello!","id":3}"#);
}

#[test]
fn build_result___absent_result___omits_member() {
    let mut doc = Document::new();
    let id = doc.create_string("x").unwrap();

    let response = build_result(&mut doc, None, Some(id)).unwrap();

    assert_eq!(compact(&doc, response), r#"{"id":"x"}"#);
}

#[test]
fn build_error___without_id___writes_null_id() {
    let mut doc = Document::new();

    let response = build_error(
        &mut doc,
        ErrorCode::InvalidRequest,
        ErrorCode::InvalidRequest.default_message(),
        None,
    )
    .unwrap();

    assert_eq!(
        compact(&doc, response),
        r#"{"error":{"code":-32600,"message":"The JSON sent is not a valid Request object."},"id":null}"#
    );
}

#[test]
fn build_error___with_id___echoes_id() {
    let mut doc = Document::new();
    let id = doc.create_number(2.0).unwrap();

    let response = build_error(&mut doc, ErrorCode::MethodNotFound, "Method not found.", Some(id))
        .unwrap();

    let error = read_error(&doc, response).unwrap();
    assert_eq!(error.code, -32601);
    assert_eq!(error.message, "Method not found.");
    let id = doc.object_item(response, "id").unwrap();
    assert_eq!(doc.as_i32(id), Some(2));
}

#[test]
fn build_error___allocator_exhausted___frees_inputs() {
    let mut doc = Document::with_allocator(BoundedAllocator::new(4096));
    let id = doc.create_number(1.0).unwrap();
    let mut filler = Vec::new();
    while let Ok(node) = doc.create_null() {
        filler.push(node);
    }
    // room for the envelope root only
    doc.delete(filler.pop().unwrap());
    let before = doc.live_nodes();

    let result = build_error(&mut doc, ErrorCode::ParseError, "x", Some(id));

    assert!(result.is_err());
    assert!(!doc.contains(id));
    assert_eq!(doc.live_nodes(), before - 1);
}

#[test]
fn read_error___result_envelope___returns_none() {
    let mut doc = Document::new();
    let response = doc.parse_str(r#"{"result":1,"id":1}"#).unwrap();

    assert!(read_error(&doc, response).is_none());
}

#[test]
fn read_error___missing_code___defaults_to_internal() {
    let mut doc = Document::new();
    let response = doc.parse_str(r#"{"error":{"message":"boom"},"id":1}"#).unwrap();

    let error = read_error(&doc, response).unwrap();

    assert_eq!(error.code, -32693);
    assert_eq!(error.message, "boom");
}

#[test]
fn MessageId___display___quotes_strings() {
    assert_eq!(MessageId::Number(4).to_string(), "4");
    assert_eq!(MessageId::from("x").to_string(), "\"x\"");
}
