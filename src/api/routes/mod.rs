//! Route handlers.

pub mod stats;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub league_id: u32,
    pub cached_matches: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        league_id: state.league_id,
        cached_matches: state.matches.len(),
    })
}
