//! Process lifecycle and health reporting for long-running servers.

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use health::{evaluate, HealthError, ProbeKind, Verdict};
pub use lifecycle::{Application, DrainOutcome, LifecycleState};
