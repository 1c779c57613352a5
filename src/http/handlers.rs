//! Request handlers for the public server.

use std::time::Duration;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::health::{assess, ProbeKind};
use crate::http::response::{error_response, ProbeResponse};
use crate::http::server::AppState;
use crate::observability::metrics;

/// `GET /health/{probe}`.
pub async fn check(State(state): State<AppState>, Path(probe): Path<String>) -> Response {
    evaluate_probe(&state, ProbeKind::from_name(&probe))
}

/// `GET /health`: no service name, so the process itself.
pub async fn check_process(State(state): State<AppState>) -> Response {
    evaluate_probe(&state, ProbeKind::Liveness)
}

fn evaluate_probe(state: &AppState, probe: ProbeKind) -> Response {
    let snapshot = state.lifecycle.snapshot();
    match assess(&probe, &snapshot) {
        Ok(assessment) => {
            if let Some(reason) = &assessment.reason {
                tracing::info!(probe = %probe, reason = %reason, "Probe check failed");
            }
            metrics::record_probe(probe.as_str(), assessment.verdict.as_str());
            ProbeResponse::new(&probe, assessment).into_response()
        }
        Err(e) => {
            tracing::warn!(probe = %probe, error = %e, "Probe for unknown service");
            metrics::record_probe("unknown", "UNKNOWN");
            e.into_response()
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WorkRequest {
    pub data: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WorkResponse {
    pub result: String,
}

/// `POST /work`: simulated business work that takes a while.
pub async fn do_work(
    State(state): State<AppState>,
    Json(request): Json<WorkRequest>,
) -> Json<WorkResponse> {
    tracing::info!(data = %request.data, "Received work request");
    tokio::time::sleep(Duration::from_millis(state.work.duration_ms)).await;
    Json(WorkResponse {
        result: format!("Work completed successfully for: {}", request.data),
    })
}

/// Middleware tracking work requests for the drain. New work is refused once
/// shutdown has started, and running work is cancelled at the drain deadline.
pub async fn track_in_flight(State(state): State<AppState>, request: Request, next: Next) -> Response {
    // Track before checking, so the drain cannot miss a request that passes the check.
    let guard = state.in_flight.track();
    if state.lifecycle.is_shutdown_initiated() {
        drop(guard);
        metrics::record_work_rejected();
        tracing::debug!("Rejecting work request, shutdown in progress");
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "shutdown in progress");
    }

    let mut abandoned = state.in_flight.abandoned();
    let response = tokio::select! {
        response = next.run(request) => response,
        _ = abandoned.recv() => {
            tracing::warn!("Cancelling work request at drain deadline");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "request abandoned at drain deadline")
        }
    };
    drop(guard);
    response
}
