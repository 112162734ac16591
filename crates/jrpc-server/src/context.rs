//! Per-invocation context handed to procedures

use crate::shutdown::ShutdownHandle;
use jrpc_core::ErrorCode;
use jrpc_json::Document;

/// Context for one procedure invocation
///
/// Gives the procedure the document holding its parameters and an error
/// slot. Setting an error makes the server answer with an error envelope
/// instead of the procedure's return value.
pub struct CallContext<'a> {
    doc: &'a mut Document,
    method: &'a str,
    shutdown: &'a ShutdownHandle,
    error: Option<(ErrorCode, String)>,
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(doc: &'a mut Document, method: &'a str, shutdown: &'a ShutdownHandle) -> Self {
        Self {
            doc,
            method,
            shutdown,
            error: None,
        }
    }

    /// Document holding the request; build the result in it too
    pub fn doc(&mut self) -> &mut Document {
        self.doc
    }

    /// Name the procedure was invoked under
    pub fn method(&self) -> &str {
        self.method
    }

    /// Answer with an error instead of a result
    ///
    /// An empty message is replaced with the code's default message.
    pub fn set_error(&mut self, code: impl Into<ErrorCode>, message: impl Into<String>) {
        let code = code.into();
        let mut message = message.into();
        if message.is_empty() {
            message = code.default_message().to_string();
        }
        self.error = Some((code, message));
    }

    pub fn error(&self) -> Option<(ErrorCode, &str)> {
        self.error.as_ref().map(|(code, message)| (*code, message.as_str()))
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Stop the server once the current readiness pass finishes
    pub fn stop_server(&self) {
        self.shutdown.trigger();
    }

    pub(crate) fn take_error(&mut self) -> Option<(ErrorCode, String)> {
        self.error.take()
    }
}
