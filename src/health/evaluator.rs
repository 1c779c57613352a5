//! Probe evaluation.
//!
//! Pure functions of a [`Snapshot`] and a [`ProbeKind`]; no state, no I/O,
//! safe to call from any number of tasks at once.
//!
//! # Policy
//! - liveness: not serving iff shutdown has been initiated
//! - readiness / startup: serving iff initialized, every dependency healthy
//!   and shutdown not initiated. Failing conditions are reported in that
//!   order: not initialized, first unhealthy dependency, shutting down.

use std::fmt;

use crate::health::probe::{HealthError, ProbeKind, Verdict};
use crate::lifecycle::state::Snapshot;

/// The first condition that made a probe fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotServingReason {
    NotInitialized,
    DependencyUnhealthy(String),
    ShuttingDown,
}

impl fmt::Display for NotServingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotServingReason::NotInitialized => write!(f, "not initialized yet"),
            NotServingReason::DependencyUnhealthy(name) => {
                write!(f, "dependency {name} is not healthy")
            }
            NotServingReason::ShuttingDown => write!(f, "shutdown in progress"),
        }
    }
}

/// A verdict together with the reason for a negative one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub verdict: Verdict,
    pub reason: Option<NotServingReason>,
}

impl Assessment {
    fn serving() -> Self {
        Self {
            verdict: Verdict::Serving,
            reason: None,
        }
    }

    fn not_serving(reason: NotServingReason) -> Self {
        Self {
            verdict: Verdict::NotServing,
            reason: Some(reason),
        }
    }
}

/// Evaluate `probe` against `snapshot`, keeping the failing condition.
pub fn assess(probe: &ProbeKind, snapshot: &Snapshot) -> Result<Assessment, HealthError> {
    match probe {
        ProbeKind::Liveness => Ok(liveness(snapshot)),
        ProbeKind::Readiness | ProbeKind::Startup => Ok(readiness(snapshot)),
        ProbeKind::Other(name) => Err(HealthError::UnknownProbeKind(name.clone())),
    }
}

/// Evaluate `probe` against `snapshot`.
pub fn evaluate(probe: &ProbeKind, snapshot: &Snapshot) -> Result<Verdict, HealthError> {
    assess(probe, snapshot).map(|assessment| assessment.verdict)
}

fn liveness(snapshot: &Snapshot) -> Assessment {
    if snapshot.shutdown_initiated {
        return Assessment::not_serving(NotServingReason::ShuttingDown);
    }
    Assessment::serving()
}

// Startup shares this policy; a startup probe that tolerates dependency
// flaps after boot would be a separate function.
fn readiness(snapshot: &Snapshot) -> Assessment {
    if !snapshot.initialized {
        return Assessment::not_serving(NotServingReason::NotInitialized);
    }
    if let Some(unhealthy) = snapshot.dependencies.iter().find(|d| !d.healthy) {
        return Assessment::not_serving(NotServingReason::DependencyUnhealthy(
            unhealthy.name.clone(),
        ));
    }
    if snapshot.shutdown_initiated {
        return Assessment::not_serving(NotServingReason::ShuttingDown);
    }
    Assessment::serving()
}
