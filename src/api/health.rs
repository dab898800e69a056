use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    scaler_loaded: bool,
}

/// GET /healthz - liveness plus artifact status
///
/// The service answers even with missing artifacts; `degraded` means every
/// prediction will report failure until the artifacts are restored.
pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let degraded = state.predictor.is_degraded();

    Json(HealthResponse {
        status: if degraded { "degraded" } else { "ok" },
        model_loaded: state.predictor.has_model(),
        scaler_loaded: state.predictor.has_scaler(),
    })
}
