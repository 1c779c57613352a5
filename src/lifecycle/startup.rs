//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the lifecycle state from configuration
//! - Bind listeners and begin answering probes
//! - Run one-time initialization, then mark the service initialized
//! - Hand over to the shutdown coordinator on termination
//!
//! # Design Decisions
//! - Fail fast: a listener that cannot bind is fatal
//! - Probes are served before initialization completes, so startup and
//!   readiness probes can observe the not-initialized phase
//! - Termination during the startup delay skips initialization

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::admin::{run_admin_server, AdminState};
use crate::config::AppConfig;
use crate::http::{AppState, HttpServer};
use crate::lifecycle::drain::InFlightTracker;
use crate::lifecycle::shutdown::{DrainOutcome, Shutdown, ShutdownCoordinator};
use crate::lifecycle::state::LifecycleState;

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// A bound, not yet running service.
pub struct Application {
    config: AppConfig,
    lifecycle: Arc<LifecycleState>,
    shutdown: Shutdown,
    in_flight: InFlightTracker,
    server_listener: TcpListener,
    admin_listener: Option<TcpListener>,
}

impl Application {
    /// Build the lifecycle state and bind every listener.
    pub async fn bind(config: AppConfig) -> Result<Self, StartupError> {
        let lifecycle = Arc::new(LifecycleState::new(
            config.lifecycle.dependencies.iter().cloned(),
            config.lifecycle.dependency_policy,
        ));

        let server_listener = bind(&config.server.bind_address).await?;
        let admin_listener = if config.admin.enabled {
            Some(bind(&config.admin.bind_address).await?)
        } else {
            None
        };

        tracing::info!(
            dependencies = ?lifecycle.dependency_names(),
            policy = ?lifecycle.policy(),
            startup_delay_ms = config.lifecycle.startup_delay_ms,
            drain_deadline_ms = config.lifecycle.drain_deadline_ms,
            "Application bound"
        );

        Ok(Self {
            config,
            lifecycle,
            shutdown: Shutdown::new(),
            in_flight: InFlightTracker::new(),
            server_listener,
            admin_listener,
        })
    }

    pub fn server_addr(&self) -> std::io::Result<SocketAddr> {
        self.server_listener.local_addr()
    }

    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin_listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Shared handle to the lifecycle state.
    pub fn lifecycle(&self) -> Arc<LifecycleState> {
        Arc::clone(&self.lifecycle)
    }

    pub fn in_flight(&self) -> InFlightTracker {
        self.in_flight.clone()
    }

    /// Serve until `termination` resolves, then shut down gracefully.
    pub async fn run<F>(self, termination: F) -> DrainOutcome
    where
        F: Future<Output = ()>,
    {
        let Self {
            config,
            lifecycle,
            shutdown,
            in_flight,
            server_listener,
            admin_listener,
        } = self;

        let mut servers = Vec::new();

        let app_state = AppState {
            lifecycle: Arc::clone(&lifecycle),
            in_flight: in_flight.clone(),
            work: config.work.clone(),
        };
        let server = HttpServer::new(&config.server, app_state);
        servers.push(tokio::spawn(server.run(server_listener, shutdown.listener())));

        if let Some(listener) = admin_listener {
            let admin_state = AdminState {
                lifecycle: Arc::clone(&lifecycle),
                api_key: config.admin.api_key.as_deref().map(Arc::from),
            };
            servers.push(tokio::spawn(run_admin_server(
                listener,
                admin_state,
                shutdown.listener(),
            )));
        }

        let startup_delay = Duration::from_millis(config.lifecycle.startup_delay_ms);
        tokio::pin!(termination);
        tokio::select! {
            _ = initialize(&lifecycle, startup_delay) => termination.await,
            _ = &mut termination => {
                tracing::warn!("Termination requested before initialization completed");
            }
        }

        let coordinator = ShutdownCoordinator::new(
            lifecycle,
            shutdown,
            in_flight,
            Duration::from_millis(config.lifecycle.drain_deadline_ms),
        );
        let outcome = coordinator.shutdown(servers).await;
        tracing::info!(outcome = ?outcome, "Shutdown complete");
        outcome
    }
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Run one-time initialization, then mark the lifecycle initialized.
pub async fn initialize(lifecycle: &LifecycleState, startup_delay: Duration) {
    if !startup_delay.is_zero() {
        tracing::info!(delay_ms = startup_delay.as_millis() as u64, "Simulating slow startup");
        tokio::time::sleep(startup_delay).await;
    }
    lifecycle.mark_initialized();
}
