//! Response mapping.
//!
//! # Design Decisions
//! - SERVING maps to 200 and NOT_SERVING to 503, so plain HTTP probes work
//!   without parsing the body
//! - Unknown probe kinds map to 404, distinct from 503
//! - Bodies are JSON and carry the first failing condition for debugging

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::health::{Assessment, HealthError, ProbeKind, Verdict};

/// Body of a probe response.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub probe: String,
    pub status: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProbeResponse {
    pub fn new(probe: &ProbeKind, assessment: Assessment) -> Self {
        Self {
            probe: probe.to_string(),
            status: assessment.verdict,
            reason: assessment.reason.map(|r| r.to_string()),
        }
    }
}

impl IntoResponse for ProbeResponse {
    fn into_response(self) -> Response {
        let status = match self.status {
            Verdict::Serving => StatusCode::OK,
            Verdict::NotServing => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(self)).into_response()
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Build a JSON error response.
pub fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for HealthError {
    fn into_response(self) -> Response {
        match self {
            HealthError::UnknownProbeKind(_) => error_response(StatusCode::NOT_FOUND, self),
        }
    }
}
