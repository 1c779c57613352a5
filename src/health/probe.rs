//! Probe kinds, verdicts and probe errors.

use std::fmt;

use serde::Serialize;

/// A health probe as requested by an orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    Liveness,
    Readiness,
    Startup,
    /// Any name outside the known probe kinds.
    Other(String),
}

impl ProbeKind {
    /// Map a requested service name to a probe kind.
    ///
    /// An empty name refers to the process itself and is a liveness probe.
    pub fn from_name(name: &str) -> Self {
        match name {
            "" | "liveness" => ProbeKind::Liveness,
            "readiness" => ProbeKind::Readiness,
            "startup" => ProbeKind::Startup,
            other => ProbeKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProbeKind::Liveness => "liveness",
            ProbeKind::Readiness => "readiness",
            ProbeKind::Startup => "startup",
            ProbeKind::Other(name) => name,
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a recognised probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Serving,
    NotServing,
}

impl Verdict {
    pub fn is_serving(self) -> bool {
        matches!(self, Verdict::Serving)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Serving => "SERVING",
            Verdict::NotServing => "NOT_SERVING",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probe evaluation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealthError {
    /// The request named a probe kind outside liveness, readiness and startup.
    #[error("unknown probe kind: {0}")]
    UnknownProbeKind(String),
}
