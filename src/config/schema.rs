//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::lifecycle::state::DependencyPolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Public server: health probes and work requests.
    pub server: ServerConfig,

    /// Management server for dependency signals.
    pub admin: AdminConfig,

    /// Startup, shutdown and dependency settings.
    pub lifecycle: LifecycleConfig,

    /// Demo work endpoint settings.
    pub work: WorkConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Public server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8085").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8085".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Admin server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin server.
    pub enabled: bool,

    /// Admin server bind address.
    pub bind_address: String,

    /// Bearer token required on admin requests. No auth when unset.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:9090".to_string(),
            api_key: None,
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Time to wait before marking the service as initialized, in milliseconds.
    pub startup_delay_ms: u64,

    /// Maximum time to drain in-flight work on shutdown, in milliseconds.
    pub drain_deadline_ms: u64,

    /// Monitored dependency names. All start healthy.
    pub dependencies: Vec<String>,

    /// Handling of writes to dependency names outside `dependencies`.
    pub dependency_policy: DependencyPolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            startup_delay_ms: 0,
            drain_deadline_ms: 30_000,
            dependencies: vec!["database".to_string(), "downstream".to_string()],
            dependency_policy: DependencyPolicy::Strict,
        }
    }
}

/// Demo work endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkConfig {
    /// Simulated processing time per work request, in milliseconds.
    pub duration_ms: u64,
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self { duration_ms: 200 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output for development.
    #[default]
    Pretty,
    /// One JSON object per line for production.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
