//! Procedure registry

use crate::context::CallContext;
use jrpc_core::{RpcError, RpcResult};
use jrpc_json::NodeId;

/// A named operation callable by remote peers
///
/// `params` and `id` point into the request tree, which the server deletes
/// after the call. Return a node built in [`CallContext::doc`] to send it as
/// the result, or `None` for a result-less response. A returned node that is
/// still attached somewhere (for example one of the params) is copied.
///
/// Closures with the matching signature implement this trait, so state the
/// procedure needs is simply captured.
pub trait Procedure: Send {
    fn invoke(
        &mut self,
        ctx: &mut CallContext<'_>,
        params: Option<NodeId>,
        id: Option<NodeId>,
    ) -> Option<NodeId>;
}

impl<F> Procedure for F
where
    F: FnMut(&mut CallContext<'_>, Option<NodeId>, Option<NodeId>) -> Option<NodeId> + Send,
{
    fn invoke(
        &mut self,
        ctx: &mut CallContext<'_>,
        params: Option<NodeId>,
        id: Option<NodeId>,
    ) -> Option<NodeId> {
        self(ctx, params, id)
    }
}

struct Entry {
    name: String,
    procedure: Box<dyn Procedure>,
}

/// Procedures by name, in registration order
///
/// Names are matched exactly (case-sensitive). Lookup is a linear scan;
/// registries hold tens of procedures, not thousands.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a procedure under `name`
    ///
    /// Fails with [`RpcError::DuplicateProcedure`] if the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        procedure: impl Procedure + 'static,
    ) -> RpcResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(RpcError::Config("procedure name must not be empty".to_string()));
        }
        if self.contains(&name) {
            return Err(RpcError::DuplicateProcedure(name));
        }
        self.entries.push(Entry {
            name,
            procedure: Box::new(procedure),
        });
        Ok(())
    }

    /// Remove the procedure registered under `name`, dropping it
    ///
    /// Later entries shift down so registration order is kept.
    pub fn deregister(&mut self, name: &str) -> RpcResult<()> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.name == name)
            .ok_or_else(|| RpcError::ProcedureNotFound(name.to_string()))?;
        self.entries.remove(index);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Find the procedure registered under `name`
    pub fn find_mut(&mut self, name: &str) -> Option<&mut (dyn Procedure + 'static)> {
        self.entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .map(|entry| entry.procedure.as_mut())
    }

    /// Registered names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry/registry_tests.rs"]
mod registry_tests;
