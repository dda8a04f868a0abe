use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::aggregate;
use crate::models::AggregateReport;

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    /// Comma-separated region ids, e.g. `3,8,9`
    pub regions: Option<String>,
    /// Unix seconds, exclusive
    pub from: Option<String>,
    /// Unix seconds, exclusive
    pub to: Option<String>,
}

/// Read a timestamp bound. Zero or anything that is not an integer counts as
/// not given.
pub fn parse_timestamp(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&t| t != 0)
}

/// Parse a comma-separated region list. Blank input yields `None`.
pub fn parse_regions(raw: &str) -> Result<Option<Vec<i32>>, ApiError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    raw.split(',')
        .map(|s| {
            s.trim()
                .parse::<i32>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid region id: {:?}", s.trim())))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

pub async fn league_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<AggregateReport>, ApiError> {
    let regions = match params.regions.as_deref() {
        Some(raw) => parse_regions(raw)?,
        None => None,
    }
    .unwrap_or_else(|| state.default_regions.as_ref().clone());

    let from = parse_timestamp(params.from.as_deref()).unwrap_or(0);
    let to = parse_timestamp(params.to.as_deref())
        .unwrap_or_else(|| chrono::Utc::now().timestamp());

    let report = aggregate(&state.matches, &regions, from, to)?;
    Ok(Json(report))
}
