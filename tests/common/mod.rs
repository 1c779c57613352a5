//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use safe_lifecycle::config::AppConfig;
use safe_lifecycle::lifecycle::{Application, DrainOutcome, InFlightTracker, LifecycleState};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A running application on ephemeral ports.
pub struct TestApp {
    pub server: SocketAddr,
    pub admin: SocketAddr,
    pub lifecycle: Arc<LifecycleState>,
    tracker: InFlightTracker,
    pub client: reqwest::Client,
    terminate: Option<oneshot::Sender<()>>,
    handle: JoinHandle<DrainOutcome>,
}

/// Config bound to loopback ephemeral ports with fast work.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.bind_address = "127.0.0.1:0".into();
    config.admin.bind_address = "127.0.0.1:0".into();
    config.work.duration_ms = 50;
    config
}

pub async fn start(config: AppConfig) -> TestApp {
    let app = Application::bind(config).await.unwrap();
    let server = app.server_addr().unwrap();
    let admin = app.admin_addr().expect("admin enabled in tests");
    let lifecycle = app.lifecycle();
    let tracker = app.in_flight();

    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(app.run(async move {
        let _ = rx.await;
    }));

    TestApp {
        server,
        admin,
        lifecycle,
        tracker,
        client: reqwest::Client::builder().no_proxy().build().unwrap(),
        terminate: Some(tx),
        handle,
    }
}

impl TestApp {
    pub fn server_url(&self, path: &str) -> String {
        format!("http://{}{}", self.server, path)
    }

    pub fn admin_url(&self, path: &str) -> String {
        format!("http://{}{}", self.admin, path)
    }

    pub fn in_flight(&self) -> u64 {
        self.tracker.active_count()
    }

    pub fn tracker(&self) -> InFlightTracker {
        self.tracker.clone()
    }

    /// Status code of a probe.
    pub async fn probe(&self, kind: &str) -> u16 {
        self.client
            .get(self.server_url(&format!("/health/{kind}")))
            .send()
            .await
            .expect("server unreachable")
            .status()
            .as_u16()
    }

    /// Poll a probe until it reports `status`, or panic after two seconds.
    pub async fn wait_for_probe(&self, kind: &str, status: u16) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            if self.probe(kind).await == status {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "{kind} probe never reported {status}"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Deliver the termination request. Later calls are no-ops.
    pub fn terminate(&mut self) {
        if let Some(tx) = self.terminate.take() {
            let _ = tx.send(());
        }
    }

    /// Terminate and wait for shutdown to finish.
    pub async fn shutdown(mut self) -> DrainOutcome {
        self.terminate();
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("shutdown must be bounded")
            .unwrap()
    }
}
