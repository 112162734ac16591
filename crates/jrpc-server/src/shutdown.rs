//! Graceful shutdown support

use mio::Waker;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle for stopping a [`Server`](crate::Server)
///
/// Clones share the same flag. Triggering wakes the server's poll so the
/// loop notices without waiting out its timeout.
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    triggered: Arc<AtomicBool>,
    waker: Option<Arc<Waker>>,
}

impl ShutdownHandle {
    /// Create a handle that is not attached to any poll
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_waker(waker: Arc<Waker>) -> Self {
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            waker: Some(waker),
        }
    }

    /// Trigger shutdown
    pub fn trigger(&self) {
        // Only wake on the first trigger
        if !self.triggered.swap(true, Ordering::SeqCst)
            && let Some(waker) = &self.waker
            && let Err(err) = waker.wake()
        {
            tracing::warn!(error = %err, "failed to wake server poll");
        }
    }

    /// Check if shutdown has been triggered
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownHandle")
            .field("triggered", &self.is_triggered())
            .finish_non_exhaustive()
    }
}
