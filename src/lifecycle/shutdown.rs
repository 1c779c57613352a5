//! Shutdown coordination.
//!
//! # Sequence
//! ```text
//! termination request
//!     → LifecycleState::initiate_shutdown (liveness fails from here on)
//!     → Shutdown::trigger (servers stop accepting new work)
//!     → drain in-flight work, bounded by the drain deadline
//!     → cancel in-flight work and abort servers still running, report, exit
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::lifecycle::drain::InFlightTracker;
use crate::lifecycle::state::LifecycleState;
use crate::observability::metrics;

/// Stop-accepting notifier shared by every server task.
///
/// Triggering is idempotent, and listeners created before or after the
/// trigger both observe it.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
            triggered: Arc::clone(&self.triggered),
        }
    }

    /// Trigger the shutdown signal. Returns `true` only for the first call.
    pub fn trigger(&self) -> bool {
        if self.triggered.swap(true, Ordering::AcqRel) {
            return false;
        }
        let _ = self.tx.send(());
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of [`Shutdown`].
#[derive(Debug)]
pub struct ShutdownListener {
    rx: broadcast::Receiver<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownListener {
    /// Resolve once shutdown has been triggered.
    pub async fn recv(&mut self) {
        if self.triggered.load(Ordering::Acquire) {
            return;
        }
        // Subscribed before the flag check, so a concurrent trigger is still delivered.
        let _ = self.rx.recv().await;
    }
}

/// Internal shutdown failures. Logged and counted, never returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShutdownError {
    #[error("drain deadline of {deadline:?} exceeded, abandoning {abandoned} in-flight requests")]
    DrainTimeoutExceeded { deadline: Duration, abandoned: u64 },
}

/// How the drain phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// All in-flight work finished and every server stopped.
    Drained { elapsed: Duration },
    /// The deadline fired first; remaining work was abandoned.
    DeadlineExceeded { abandoned: u64 },
}

/// Orchestrates the transition from serving to terminated.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    lifecycle: Arc<LifecycleState>,
    shutdown: Shutdown,
    in_flight: InFlightTracker,
    drain_deadline: Duration,
}

impl ShutdownCoordinator {
    pub fn new(
        lifecycle: Arc<LifecycleState>,
        shutdown: Shutdown,
        in_flight: InFlightTracker,
        drain_deadline: Duration,
    ) -> Self {
        Self {
            lifecycle,
            shutdown,
            in_flight,
            drain_deadline,
        }
    }

    /// Flip the lifecycle into shutdown and tell servers to stop accepting.
    ///
    /// Returns `false` if shutdown was already under way; repeated
    /// termination requests are no-ops.
    pub fn begin(&self) -> bool {
        self.lifecycle.initiate_shutdown();
        if !self.shutdown.trigger() {
            tracing::debug!("Shutdown already in progress, ignoring termination request");
            return false;
        }
        tracing::info!(
            in_flight = self.in_flight.active_count(),
            deadline_ms = self.drain_deadline.as_millis() as u64,
            "Stopped accepting new work, draining"
        );
        true
    }

    /// Wait for in-flight work and the given server tasks to finish, up to
    /// the drain deadline. At the deadline in-flight requests are cancelled
    /// and server tasks still running are aborted.
    pub async fn drain(&self, mut servers: Vec<JoinHandle<std::io::Result<()>>>) -> DrainOutcome {
        let started = Instant::now();

        let drained = tokio::time::timeout(self.drain_deadline, async {
            self.in_flight.wait_idle().await;
            for server in servers.iter_mut() {
                match server.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::error!(error = %e, "Server exited with error during drain"),
                    Err(e) => tracing::error!(error = %e, "Server task failed during drain"),
                }
            }
        })
        .await;

        match drained {
            Ok(()) => {
                let elapsed = started.elapsed();
                tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "Drain complete");
                DrainOutcome::Drained { elapsed }
            }
            Err(_) => {
                // Count before cancelling; cancelled requests release their guards.
                let abandoned = self.in_flight.active_count();
                self.in_flight.abandon();
                for server in &servers {
                    server.abort();
                }
                let error = ShutdownError::DrainTimeoutExceeded {
                    deadline: self.drain_deadline,
                    abandoned,
                };
                tracing::warn!(error = %error, abandoned, "Forcing termination");
                metrics::record_drain_abandoned(abandoned);
                DrainOutcome::DeadlineExceeded { abandoned }
            }
        }
    }

    /// Run the whole sequence: begin, then drain.
    pub async fn shutdown(&self, servers: Vec<JoinHandle<std::io::Result<()>>>) -> DrainOutcome {
        self.begin();
        self.drain(servers).await
    }
}
