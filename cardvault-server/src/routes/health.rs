use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct EscalationResponse {
    pub algorithm: String,
    pub position: usize,
    pub rungs: Vec<String>,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /escalation
pub async fn escalation(State(state): State<AppState>) -> Json<EscalationResponse> {
    let ladder = state.engine.escalation_state().current();
    Json(EscalationResponse {
        algorithm: ladder.algorithm_name().to_string(),
        position: ladder.position(),
        rungs: ladder.rung_names(),
    })
}
