//! Pluggable allocation accounting for documents
//!
//! Every [`Document`](crate::Document) carries its own allocator value.
//! Node slots and owned strings are charged against it before they are
//! stored, so a constrained host can cap how much memory parsing may use
//! without any process-wide state.

use crate::error::JsonError;
use thiserror::Error;

/// Allocator refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("allocation of {requested} bytes refused")]
pub struct AllocError {
    /// Bytes that were requested
    pub requested: usize,
}

impl From<AllocError> for JsonError {
    fn from(err: AllocError) -> Self {
        JsonError::OutOfMemory {
            requested: err.requested,
        }
    }
}

/// Accounting hooks consulted for every node and string a document stores
pub trait Allocator: Send {
    /// Reserve `bytes`, or refuse with [`AllocError`]
    fn allocate(&mut self, bytes: usize) -> Result<(), AllocError>;

    /// Return `bytes` previously reserved with [`Allocator::allocate`]
    fn release(&mut self, bytes: usize);

    /// Bytes currently reserved
    fn in_use(&self) -> usize;
}

/// Default allocator: never refuses, only counts
#[derive(Debug, Default, Clone)]
pub struct SystemAllocator {
    in_use: usize,
}

impl SystemAllocator {
    /// Create a new system allocator
    pub fn new() -> Self {
        Self::default()
    }
}

impl Allocator for SystemAllocator {
    fn allocate(&mut self, bytes: usize) -> Result<(), AllocError> {
        self.in_use = self.in_use.saturating_add(bytes);
        Ok(())
    }

    fn release(&mut self, bytes: usize) {
        self.in_use = self.in_use.saturating_sub(bytes);
    }

    fn in_use(&self) -> usize {
        self.in_use
    }
}

/// Allocator with a fixed byte budget
///
/// Requests that would exceed the budget are refused; the document turns
/// the refusal into [`JsonError::OutOfMemory`](crate::JsonError::OutOfMemory).
#[derive(Debug, Clone)]
pub struct BoundedAllocator {
    limit: usize,
    in_use: usize,
}

impl BoundedAllocator {
    /// Create an allocator that grants at most `limit` bytes at a time
    pub fn new(limit: usize) -> Self {
        Self { limit, in_use: 0 }
    }

    /// Configured budget
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.in_use)
    }
}

impl Allocator for BoundedAllocator {
    fn allocate(&mut self, bytes: usize) -> Result<(), AllocError> {
        if bytes > self.remaining() {
            return Err(AllocError { requested: bytes });
        }
        self.in_use += bytes;
        Ok(())
    }

    fn release(&mut self, bytes: usize) {
        self.in_use = self.in_use.saturating_sub(bytes);
    }

    fn in_use(&self) -> usize {
        self.in_use
    }
}
