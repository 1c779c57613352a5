//! Health-query subsystem.
//!
//! # Data Flow
//! ```text
//! Probe request (liveness | readiness | startup | other)
//!     → probe.rs (map requested name to ProbeKind)
//!     → LifecycleState::snapshot
//!     → evaluator.rs (pure verdict + first failing condition)
//!     → SERVING | NOT_SERVING | UnknownProbeKind
//! ```
//!
//! # Design Decisions
//! - Evaluation recomputes from a fresh snapshot on every query
//! - Unknown probe kinds are errors, not NOT_SERVING, so misconfigured probes
//!   are distinguishable from an unhealthy process
//! - Dependency health is pushed in by admin tooling, never polled here

pub mod evaluator;
pub mod probe;

pub use evaluator::{assess, evaluate, Assessment, NotServingReason};
pub use probe::{HealthError, ProbeKind, Verdict};
