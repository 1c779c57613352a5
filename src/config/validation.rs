//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges (deadlines > 0)
//! - Detect conflicting listeners and duplicate dependency names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("server and admin both bind {0}")]
    ConflictingAddresses(String),

    #[error("lifecycle.dependencies: empty dependency name")]
    EmptyDependencyName,

    #[error("lifecycle.dependencies: duplicate dependency {0:?}")]
    DuplicateDependency(String),

    #[error("lifecycle.drain_deadline_ms must be greater than zero")]
    ZeroDrainDeadline,

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("observability.log_level: unknown level {0:?}")]
    UnknownLogLevel(String),
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let server_addr = parse_address("server.bind_address", &config.server.bind_address, &mut errors);
    if config.admin.enabled {
        let admin_addr = parse_address("admin.bind_address", &config.admin.bind_address, &mut errors);
        if let (Some(server), Some(admin)) = (server_addr, admin_addr) {
            // Port 0 asks the OS for a fresh port, so two of them never collide.
            if server == admin && server.port() != 0 {
                errors.push(ValidationError::ConflictingAddresses(server.to_string()));
            }
        }
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.lifecycle.drain_deadline_ms == 0 {
        errors.push(ValidationError::ZeroDrainDeadline);
    }

    let mut seen = HashSet::new();
    for name in &config.lifecycle.dependencies {
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyDependencyName);
        } else if !seen.insert(name.as_str()) {
            errors.push(ValidationError::DuplicateDependency(name.clone()));
        }
    }

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn parse_address(
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<SocketAddr> {
    match value.parse() {
        Ok(addr) => Some(addr),
        Err(_) => {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}
