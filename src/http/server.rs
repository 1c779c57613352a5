//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and work handlers
//! - Wire up middleware (tracing, timeout, in-flight tracking)
//! - Serve until the shutdown signal, then finish accepted connections

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ServerConfig, WorkConfig};
use crate::http::handlers::{check, check_process, do_work, track_in_flight};
use crate::lifecycle::{InFlightTracker, LifecycleState, ShutdownListener};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<LifecycleState>,
    pub in_flight: InFlightTracker,
    pub work: WorkConfig,
}

/// Public server answering health probes and work requests.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ServerConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let work = post(do_work).route_layer(middleware::from_fn_with_state(
            state.clone(),
            track_in_flight,
        ));

        Router::new()
            .route("/health", get(check_process))
            .route("/health/{probe}", get(check))
            .route("/work", work)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires, then let accepted requests finish.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::DependencyPolicy;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState {
            lifecycle: Arc::new(LifecycleState::new(["database", "downstream"], DependencyPolicy::Strict)),
            in_flight: InFlightTracker::new(),
            work: WorkConfig { duration_ms: 10 },
        }
    }

    async fn fetch(router: &Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn work_request() -> Request<Body> {
        Request::post("/work")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"data":"request-1"}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn probes_follow_lifecycle() {
        let state = state();
        let router = HttpServer::build_router(&ServerConfig::default(), state.clone());

        let (status, body) = fetch(&router, "/health/readiness").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "NOT_SERVING");
        assert_eq!(body["reason"], "not initialized yet");

        let (status, body) = fetch(&router, "/health/liveness").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "SERVING");
        assert!(body.get("reason").is_none());

        state.lifecycle.mark_initialized();
        let (status, _) = fetch(&router, "/health/startup").await;
        assert_eq!(status, StatusCode::OK);

        state.lifecycle.set_dependency("downstream", false).unwrap();
        let (status, body) = fetch(&router, "/health/readiness").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["reason"], "dependency downstream is not healthy");
    }

    #[tokio::test]
    async fn bare_health_path_is_liveness() {
        let state = state();
        let router = HttpServer::build_router(&ServerConfig::default(), state.clone());

        let (status, body) = fetch(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["probe"], "liveness");

        state.lifecycle.initiate_shutdown();
        let (status, _) = fetch(&router, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unknown_probe_is_not_found() {
        let router = HttpServer::build_router(&ServerConfig::default(), state());
        let (status, body) = fetch(&router, "/health/foo").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "unknown probe kind: foo");
    }

    #[tokio::test]
    async fn work_completes_and_is_tracked() {
        let state = state();
        let router = HttpServer::build_router(&ServerConfig::default(), state.clone());

        let response = router.oneshot(work_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["result"], "Work completed successfully for: request-1");
        assert_eq!(state.in_flight.active_count(), 0);
    }

    #[tokio::test]
    async fn work_is_rejected_after_shutdown() {
        let state = state();
        let router = HttpServer::build_router(&ServerConfig::default(), state.clone());
        state.lifecycle.initiate_shutdown();

        let response = router.oneshot(work_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.in_flight.active_count(), 0);
    }

    #[tokio::test]
    async fn in_flight_count_covers_handler_duration() {
        let state = AppState {
            work: WorkConfig { duration_ms: 200 },
            ..state()
        };
        let router = HttpServer::build_router(&ServerConfig::default(), state.clone());

        let request = tokio::spawn(router.oneshot(work_request()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(state.in_flight.active_count(), 1);

        let response = request.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.in_flight.active_count(), 0);
    }

    #[tokio::test]
    async fn abandoned_work_is_cancelled() {
        let state = AppState {
            work: WorkConfig { duration_ms: 30_000 },
            ..state()
        };
        let router = HttpServer::build_router(&ServerConfig::default(), state.clone());

        let request = tokio::spawn(router.oneshot(work_request()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(state.in_flight.active_count(), 1);

        state.in_flight.abandon();
        let response = tokio::time::timeout(Duration::from_secs(1), request)
            .await
            .expect("cancelled work should respond promptly")
            .unwrap()
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "request abandoned at drain deadline");
        assert_eq!(state.in_flight.active_count(), 0);
    }
}
