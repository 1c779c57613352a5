//! In-flight work tracking for graceful drain.
//!
//! # Responsibilities
//! - Count business requests that have been accepted and not yet finished
//! - Let the shutdown coordinator wait for that count to reach zero
//! - Cancel whatever is still running once the drain deadline passes
//!
//! # Design Decisions
//! - The count lives in a watch channel, so waiting is notification driven
//! - Requests are tracked by an RAII guard; the count drops even if the
//!   handler future is cancelled or panics

use std::sync::Arc;
use tokio::sync::watch;

use crate::lifecycle::shutdown::{Shutdown, ShutdownListener};
use crate::observability::metrics;

/// Tracks in-flight work for graceful shutdown.
#[derive(Debug, Clone)]
pub struct InFlightTracker {
    count: Arc<watch::Sender<u64>>,
    abandon: Shutdown,
}

impl InFlightTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            count: Arc::new(tx),
            abandon: Shutdown::new(),
        }
    }

    /// Record a new in-flight request. Returns a guard that decrements on drop.
    pub fn track(&self) -> InFlightGuard {
        self.count.send_modify(|count| *count += 1);
        metrics::record_in_flight(self.active_count());
        InFlightGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Current number of in-flight requests.
    pub fn active_count(&self) -> u64 {
        *self.count.borrow()
    }

    /// Resolve once no request is in flight.
    pub async fn wait_idle(&self) {
        let mut rx = self.count.subscribe();
        // The sender is owned by `self`, so the channel cannot close here.
        let _ = rx.wait_for(|count| *count == 0).await;
    }

    /// Tell every tracked request to stop. Returns `true` only for the first call.
    pub fn abandon(&self) -> bool {
        self.abandon.trigger()
    }

    /// Resolves once [`abandon`](Self::abandon) has been called, even if that
    /// happened before the listener was created.
    pub fn abandoned(&self) -> ShutdownListener {
        self.abandon.listener()
    }
}

impl Default for InFlightTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard held for the lifetime of one in-flight request.
#[derive(Debug)]
pub struct InFlightGuard {
    count: Arc<watch::Sender<u64>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.send_modify(|count| *count = count.saturating_sub(1));
        metrics::record_in_flight(*self.count.borrow());
    }
}
