#![allow(non_snake_case)]

use super::*;
use crate::shutdown::ShutdownHandle;
use jrpc_json::Document;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn noop(_ctx: &mut CallContext<'_>, _params: Option<NodeId>, _id: Option<NodeId>) -> Option<NodeId> {
    None
}

struct Counter {
    calls: Arc<AtomicUsize>,
}

impl Procedure for Counter {
    fn invoke(
        &mut self,
        ctx: &mut CallContext<'_>,
        _params: Option<NodeId>,
        _id: Option<NodeId>,
    ) -> Option<NodeId> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        ctx.doc().create_number(calls as f64).ok()
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[test]
fn Registry___new___is_empty() {
    let registry = Registry::new();

    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
}

#[test]
fn Registry___register___keeps_registration_order() {
    let mut registry = Registry::new();

    registry.register("sayHello", noop).unwrap();
    registry.register("add", noop).unwrap();
    registry.register("exit", noop).unwrap();

    assert_eq!(registry.names(), vec!["sayHello", "add", "exit"]);
}

#[test]
fn Registry___register_duplicate___rejected() {
    let mut registry = Registry::new();
    registry.register("add", noop).unwrap();

    let err = registry.register("add", noop).unwrap_err();

    assert!(matches!(err, RpcError::DuplicateProcedure(name) if name == "add"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn Registry___register_empty_name___rejected() {
    let mut registry = Registry::new();

    let err = registry.register("", noop).unwrap_err();

    assert!(matches!(err, RpcError::Config(_)));
}

#[test]
fn Registry___names___case_sensitive() {
    let mut registry = Registry::new();
    registry.register("add", noop).unwrap();

    assert!(registry.contains("add"));
    assert!(!registry.contains("Add"));
    assert!(registry.find_mut("ADD").is_none());
}

#[test]
fn Registry___deregister___shifts_later_entries() {
    let mut registry = Registry::new();
    registry.register("a", noop).unwrap();
    registry.register("b", noop).unwrap();
    registry.register("c", noop).unwrap();

    registry.deregister("b").unwrap();

    assert_eq!(registry.names(), vec!["a", "c"]);
}

#[test]
fn Registry___deregister_unknown___not_found() {
    let mut registry = Registry::new();

    let err = registry.deregister("missing").unwrap_err();

    assert!(matches!(err, RpcError::ProcedureNotFound(name) if name == "missing"));
}

#[test]
fn Registry___deregister___drops_captured_state() {
    let mut registry = Registry::new();
    let dropped = Arc::new(AtomicBool::new(false));
    let flag = DropFlag(Arc::clone(&dropped));
    registry
        .register(
            "hold",
            move |_ctx: &mut CallContext<'_>, _params: Option<NodeId>, _id: Option<NodeId>| -> Option<NodeId> {
                let _keep = &flag;
                None
            },
        )
        .unwrap();

    registry.deregister("hold").unwrap();

    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn Registry___find_mut___invokes_struct_procedure() {
    let mut registry = Registry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    registry
        .register("count", Counter { calls: Arc::clone(&calls) })
        .unwrap();
    let mut doc = Document::new();
    let shutdown = ShutdownHandle::new();

    let procedure = registry.find_mut("count").unwrap();
    let mut ctx = CallContext::new(&mut doc, "count", &shutdown);
    let first = procedure.invoke(&mut ctx, None, None).unwrap();
    let second = procedure.invoke(&mut ctx, None, None).unwrap();

    assert_eq!(doc.as_i32(first), Some(1));
    assert_eq!(doc.as_i32(second), Some(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
