//! Management server for dependency signals.
//!
//! # Routes
//! ```text
//! GET  /admin/status                       → version + lifecycle snapshot
//! GET  /admin/dependencies                 → current dependency map
//! PUT  /admin/dependencies/{name}          → {"healthy": bool}
//! POST /admin/dependencies/{name}/toggle   → flip, respond with new value
//! ```
//!
//! Runs on its own listener so it can be firewalled off from probe traffic.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::lifecycle::{LifecycleState, ShutdownListener};

#[derive(Clone)]
pub struct AdminState {
    pub lifecycle: Arc<LifecycleState>,
    pub api_key: Option<Arc<str>>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/dependencies", get(get_dependencies))
        .route("/admin/dependencies/{name}", put(set_dependency))
        .route("/admin/dependencies/{name}/toggle", post(toggle_dependency))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the admin router until `shutdown` fires.
pub async fn run_admin_server(
    listener: TcpListener,
    state: AdminState,
    mut shutdown: ShutdownListener,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin server listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move { shutdown.recv().await })
        .await?;

    tracing::info!(address = %addr, "Admin server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::state::MAX_DEPENDENCIES;
    use crate::lifecycle::DependencyPolicy;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn state(policy: DependencyPolicy, api_key: Option<&str>) -> AdminState {
        AdminState {
            lifecycle: Arc::new(LifecycleState::new(["database", "downstream"], policy)),
            api_key: api_key.map(Arc::from),
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, body)
    }

    fn put_health(name: &str, healthy: bool) -> Request<Body> {
        Request::put(format!("/admin/dependencies/{name}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(r#"{{"healthy":{healthy}}}"#)))
            .unwrap()
    }

    fn toggle(name: &str) -> Request<Body> {
        Request::post(format!("/admin/dependencies/{name}/toggle"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn set_and_toggle_dependency() {
        let state = state(DependencyPolicy::Strict, None);
        let router = setup_admin_router(state.clone());

        let (status, body) = send(&router, put_health("database", false)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], false);
        assert_eq!(state.lifecycle.dependency("database"), Some(false));

        let (status, body) = send(&router, toggle("database")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "database");
        assert_eq!(body["healthy"], true);
        assert_eq!(state.lifecycle.dependency("database"), Some(true));
    }

    #[tokio::test]
    async fn unknown_dependency_depends_on_policy() {
        let strict = setup_admin_router(state(DependencyPolicy::Strict, None));
        let (status, body) = send(&strict, toggle("cache")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "unknown dependency: cache");

        let lenient_state = state(DependencyPolicy::Lenient, None);
        let lenient = setup_admin_router(lenient_state.clone());
        let (status, _) = send(&lenient, put_health("cache", false)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(lenient_state.lifecycle.dependency("cache"), Some(false));
    }

    #[tokio::test]
    async fn lenient_registration_limit_is_reported() {
        let names: Vec<String> = (0..MAX_DEPENDENCIES).map(|i| format!("dep-{i}")).collect();
        let router = setup_admin_router(AdminState {
            lifecycle: Arc::new(LifecycleState::new(names, DependencyPolicy::Lenient)),
            api_key: None,
        });

        let (status, body) = send(&router, put_health("extra", true)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["error"],
            format!("cannot register dependency extra: limit of {MAX_DEPENDENCIES} reached")
        );
    }

    #[tokio::test]
    async fn status_reports_snapshot() {
        let state = state(DependencyPolicy::Strict, None);
        state.lifecycle.mark_initialized();
        let router = setup_admin_router(state);

        let (status, body) = send(
            &router,
            Request::get("/admin/status").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["initialized"], true);
        assert_eq!(body["shutdown_initiated"], false);
        assert_eq!(body["dependencies"][0]["name"], "database");

        let (_, body) = send(
            &router,
            Request::get("/admin/dependencies").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn api_key_is_enforced_when_configured() {
        let router = setup_admin_router(state(DependencyPolicy::Strict, Some("secret")));

        let (status, _) = send(&router, toggle("database")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut request = toggle("database");
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, "Bearer wrong".parse().unwrap());
        let (status, _) = send(&router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut request = toggle("database");
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, "Bearer secret".parse().unwrap());
        let (status, _) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
    }
}
