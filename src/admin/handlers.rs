use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::http::response::error_response;
use crate::lifecycle::{DependencyError, Snapshot};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyUpdate {
    pub healthy: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyState {
    pub name: String,
    pub healthy: bool,
}

impl IntoResponse for DependencyError {
    fn into_response(self) -> Response {
        match self {
            DependencyError::Unknown(_) => error_response(StatusCode::NOT_FOUND, self),
            DependencyError::LimitReached { .. } => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, self)
            }
        }
    }
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        snapshot: state.lifecycle.snapshot(),
    })
}

pub async fn get_dependencies(State(state): State<AdminState>) -> Json<Vec<DependencyState>> {
    let dependencies = state
        .lifecycle
        .snapshot()
        .dependencies
        .into_iter()
        .map(|d| DependencyState {
            name: d.name,
            healthy: d.healthy,
        })
        .collect();
    Json(dependencies)
}

pub async fn set_dependency(
    State(state): State<AdminState>,
    Path(name): Path<String>,
    Json(update): Json<DependencyUpdate>,
) -> Result<Json<DependencyState>, DependencyError> {
    state.lifecycle.set_dependency(&name, update.healthy)?;
    Ok(Json(DependencyState {
        name,
        healthy: update.healthy,
    }))
}

pub async fn toggle_dependency(
    State(state): State<AdminState>,
    Path(name): Path<String>,
) -> Result<Json<DependencyState>, DependencyError> {
    let healthy = state.lifecycle.toggle_dependency(&name)?;
    Ok(Json(DependencyState { name, healthy }))
}
