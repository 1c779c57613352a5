//! Authoritative lifecycle flags.
//!
//! # Responsibilities
//! - Hold per-dependency health flags, keyed by dependency name
//! - Hold the one-time `initialized` and `shutdown_initiated` transitions
//! - Produce point-in-time snapshots for probe evaluation
//!
//! # Design Decisions
//! - Every flag is its own atomic; there is no global lock
//! - The dependency set lives behind an `ArcSwap`, so readers never lock and
//!   only lenient auto-registration replaces the list
//! - Snapshots are per-flag atomic, not cross-flag atomic: a snapshot may mix
//!   flag values from before and after a concurrent write
//! - `initialized` and `shutdown_initiated` only ever go false → true

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::observability::metrics;

/// Most dependencies the lenient policy will grow the set to. Configured
/// names count towards the limit but are never rejected.
pub const MAX_DEPENDENCIES: usize = 256;

/// How writes naming a dependency outside the configured set are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyPolicy {
    /// Reject unknown dependency names.
    #[default]
    Strict,
    /// Register unknown dependency names on first write, up to
    /// [`MAX_DEPENDENCIES`]. Each registration is permanent and adds a metric
    /// label, so admin access should be restricted when using this policy.
    Lenient,
}

impl std::str::FromStr for DependencyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_ref() {
            "strict" => Ok(DependencyPolicy::Strict),
            "lenient" => Ok(DependencyPolicy::Lenient),
            _ => Err(format!("unknown dependency policy: {s}, must be strict or lenient")),
        }
    }
}

/// Error returned by dependency writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DependencyError {
    /// The name is not part of the monitored set and the policy is strict.
    #[error("unknown dependency: {0}")]
    Unknown(String),
    /// The lenient policy has already registered the maximum number of names.
    #[error("cannot register dependency {name}: limit of {limit} reached")]
    LimitReached { name: String, limit: usize },
}

/// A single monitored dependency.
#[derive(Debug)]
struct Dependency {
    name: String,
    healthy: AtomicBool,
}

impl Dependency {
    fn new(name: String, healthy: bool) -> Self {
        Self {
            name,
            healthy: AtomicBool::new(healthy),
        }
    }
}

/// Health of one dependency as captured by a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    pub name: String,
    pub healthy: bool,
}

/// Point-in-time view of the lifecycle flags, sufficient for one evaluation.
///
/// Dependencies are listed in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Snapshot {
    pub dependencies: Vec<DependencyStatus>,
    pub initialized: bool,
    pub shutdown_initiated: bool,
}

impl Snapshot {
    /// Look up one dependency by name.
    pub fn dependency(&self, name: &str) -> Option<bool> {
        self.dependencies
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.healthy)
    }
}

/// The single source of truth for process lifecycle and dependency health.
///
/// Constructed once at startup and shared through an `Arc` with every
/// component that reads or writes it.
#[derive(Debug)]
pub struct LifecycleState {
    dependencies: ArcSwap<Vec<Arc<Dependency>>>,
    initialized: AtomicBool,
    shutdown_initiated: AtomicBool,
    policy: DependencyPolicy,
}

impl LifecycleState {
    /// Create the state with every named dependency healthy, not initialized
    /// and not shutting down. Duplicate names are registered once.
    pub fn new<I, S>(dependency_names: I, policy: DependencyPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dependencies: Vec<Arc<Dependency>> = Vec::new();
        for name in dependency_names {
            let name = name.into();
            if dependencies.iter().all(|d| d.name != name) {
                dependencies.push(Arc::new(Dependency::new(name, true)));
            }
        }

        Self {
            dependencies: ArcSwap::from_pointee(dependencies),
            initialized: AtomicBool::new(false),
            shutdown_initiated: AtomicBool::new(false),
            policy,
        }
    }

    pub fn policy(&self) -> DependencyPolicy {
        self.policy
    }

    fn find(&self, name: &str) -> Option<Arc<Dependency>> {
        self.dependencies
            .load()
            .iter()
            .find(|d| d.name == name)
            .cloned()
    }

    /// Resolve `name` to its flag, registering it under the lenient policy.
    fn resolve(&self, name: &str, initial: bool) -> Result<Arc<Dependency>, DependencyError> {
        if let Some(dependency) = self.find(name) {
            return Ok(dependency);
        }

        match self.policy {
            DependencyPolicy::Strict => Err(DependencyError::Unknown(name.to_string())),
            DependencyPolicy::Lenient => {
                // Concurrent registrations of the same name converge on one entry.
                self.dependencies.rcu(|current| {
                    if current.len() >= MAX_DEPENDENCIES || current.iter().any(|d| d.name == name) {
                        Arc::clone(current)
                    } else {
                        let mut next = Vec::with_capacity(current.len() + 1);
                        next.extend(current.iter().cloned());
                        next.push(Arc::new(Dependency::new(name.to_string(), initial)));
                        Arc::new(next)
                    }
                });
                match self.find(name) {
                    Some(dependency) => {
                        tracing::info!(dependency = %name, "Registered new dependency");
                        Ok(dependency)
                    }
                    None => {
                        tracing::warn!(dependency = %name, limit = MAX_DEPENDENCIES, "Dependency limit reached");
                        Err(DependencyError::LimitReached {
                            name: name.to_string(),
                            limit: MAX_DEPENDENCIES,
                        })
                    }
                }
            }
        }
    }

    /// Overwrite the health of `name`. Later reads of `name` return `healthy`.
    pub fn set_dependency(&self, name: &str, healthy: bool) -> Result<(), DependencyError> {
        let dependency = self.resolve(name, healthy)?;
        let previous = dependency.healthy.swap(healthy, Ordering::AcqRel);
        if previous != healthy {
            tracing::info!(dependency = %name, healthy, "Dependency health changed");
        }
        metrics::record_dependency_health(name, healthy);
        Ok(())
    }

    /// Atomically flip the health of `name` and return the new value.
    pub fn toggle_dependency(&self, name: &str) -> Result<bool, DependencyError> {
        let dependency = self.resolve(name, true)?;
        let healthy = !dependency.healthy.fetch_xor(true, Ordering::AcqRel);
        tracing::info!(dependency = %name, healthy, "Dependency health toggled");
        metrics::record_dependency_health(name, healthy);
        Ok(healthy)
    }

    /// Current health of `name`, or `None` if it is not monitored.
    pub fn dependency(&self, name: &str) -> Option<bool> {
        self.find(name).map(|d| d.healthy.load(Ordering::Acquire))
    }

    /// Names of all monitored dependencies, in registration order.
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies.load().iter().map(|d| d.name.clone()).collect()
    }

    /// Record that one-time initialization finished.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn mark_initialized(&self) -> bool {
        let first = !self.initialized.swap(true, Ordering::AcqRel);
        if first {
            tracing::info!("Service initialization complete, ready to serve traffic");
        }
        first
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Record that shutdown has begun.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn initiate_shutdown(&self) -> bool {
        let first = !self.shutdown_initiated.swap(true, Ordering::AcqRel);
        if first {
            tracing::info!("Shutdown initiated, probes will report not serving");
        }
        first
    }

    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::Acquire)
    }

    /// Capture every flag once.
    pub fn snapshot(&self) -> Snapshot {
        let dependencies = self
            .dependencies
            .load()
            .iter()
            .map(|d| DependencyStatus {
                name: d.name.clone(),
                healthy: d.healthy.load(Ordering::Acquire),
            })
            .collect();

        Snapshot {
            dependencies,
            initialized: self.initialized.load(Ordering::Acquire),
            shutdown_initiated: self.shutdown_initiated.load(Ordering::Acquire),
        }
    }
}
