//! Cooperative cancellation shared between pumps.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Flag checked by every pump between frames.
///
/// Clones share state. The first reason given to [`cancel`](Self::cancel)
/// is kept; later calls only re-set the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    reason: Arc<Mutex<Option<String>>>,
}

impl CancellationToken {
    /// Create a token in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self, reason: impl Into<String>) {
        let mut slot = self.reason.lock();
        if slot.is_none() {
            let reason = reason.into();
            warn!(%reason, "cancellation requested");
            *slot = Some(reason);
        }
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// The first cancellation reason, if any.
    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }
}
