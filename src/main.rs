//! safe-lifecycle server.
//!
//! # Architecture Overview
//!
//! ```text
//!      Orchestrator probes          ┌───────────────────────────────────────────┐
//!      ─────────────────────────────┼─▶ http server ──▶ health evaluator        │
//!      Work requests                │       │                  ▲                │
//!      ─────────────────────────────┼─▶ in-flight tracker      │ snapshot       │
//!                                   │                          │                │
//!      Admin tooling                │                  ┌───────┴────────┐       │
//!      ─────────────────────────────┼─▶ admin server ─▶│ LifecycleState │       │
//!                                   │                  └───────▲────────┘       │
//!      SIGTERM / SIGINT             │                          │                │
//!      ─────────────────────────────┼─▶ shutdown coordinator ──┘                │
//!                                   │     (stop accept → drain → exit)          │
//!                                   └───────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use safe_lifecycle::config::{load_config, validate_config, AppConfig, ConfigError};
use safe_lifecycle::lifecycle::{signals, Application, DependencyPolicy};
use safe_lifecycle::observability::logging;

#[derive(Parser)]
#[command(name = "safe-lifecycle")]
#[command(about = "Long-running server with liveness, readiness and startup probes", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Time to wait before marking the service as initialized.
    #[arg(long)]
    startup_delay_ms: Option<u64>,

    /// Maximum time to drain in-flight work on shutdown.
    #[arg(long)]
    drain_deadline_ms: Option<u64>,

    /// Public server bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Admin server bind address.
    #[arg(long)]
    admin_bind: Option<String>,

    /// Monitored dependency name; repeat to monitor several.
    #[arg(long = "dependency")]
    dependencies: Vec<String>,

    /// How writes to unknown dependency names are handled (strict or lenient).
    #[arg(long)]
    dependency_policy: Option<DependencyPolicy>,
}

impl Args {
    fn into_config(self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };

        if let Some(delay) = self.startup_delay_ms {
            config.lifecycle.startup_delay_ms = delay;
        }
        if let Some(deadline) = self.drain_deadline_ms {
            config.lifecycle.drain_deadline_ms = deadline;
        }
        if let Some(bind) = self.bind {
            config.server.bind_address = bind;
        }
        if let Some(bind) = self.admin_bind {
            config.admin.bind_address = bind;
        }
        if !self.dependencies.is_empty() {
            config.lifecycle.dependencies = self.dependencies;
        }
        if let Some(policy) = self.dependency_policy {
            config.lifecycle.dependency_policy = policy;
        }

        // Overrides can break a config that was valid on disk.
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config()?;
    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        startup_delay_ms = config.lifecycle.startup_delay_ms,
        "safe-lifecycle starting"
    );

    let app = Application::bind(config).await?;
    app.run(async {
        signals::termination().await;
    })
    .await;

    tracing::info!("Application exiting");
    Ok(())
}
