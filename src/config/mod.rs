//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) and command-line overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to lifecycle::startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the dependency set is fixed at startup
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AdminConfig, AppConfig, LifecycleConfig, LogFormat, ObservabilityConfig, ServerConfig, WorkConfig};
pub use validation::{validate_config, ValidationError};
