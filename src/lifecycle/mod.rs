//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Bind listeners → Serve probes → Startup delay → mark_initialized
//!
//! Shutdown (shutdown.rs):
//!     Termination request → initiate_shutdown → Stop accepting
//!         → Drain in-flight work (drain.rs) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → termination request
//! ```
//!
//! # Design Decisions
//! - state.rs is the only shared mutable state; it is passed around as
//!   `Arc<LifecycleState>`, never reached through a global
//! - Ordered shutdown: fail liveness, stop accept, drain, close
//! - Shutdown has a deadline: forced exit once it passes
//! - Repeated termination requests are no-ops

pub mod drain;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use drain::{InFlightGuard, InFlightTracker};
pub use shutdown::{DrainOutcome, Shutdown, ShutdownCoordinator, ShutdownError, ShutdownListener};
pub use startup::{Application, StartupError};
pub use state::{DependencyError, DependencyPolicy, LifecycleState, Snapshot};
