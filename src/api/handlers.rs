//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, HistoryQuery, StatusResponse};
use crate::monitor::record::CycleRecord;

/// Returns the run summary, power mode and latest report.
///
/// `GET /status` → 200 + `StatusResponse` JSON
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        grid_name: state.grid_name.clone(),
        power_mode: state.power_mode,
        summary: state.summary.clone(),
        latest_report: state.last_report.clone(),
    })
}

/// Returns cycle records, optionally filtered by cycle range.
///
/// `GET /history` → 200 + `Vec<CycleRecord>` JSON
/// `GET /history?from=N&to=M` → filtered range (inclusive)
/// `GET /history?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<CycleRecord> = state
        .records
        .iter()
        .filter(|r| r.cycle >= from && r.cycle <= to)
        .cloned()
        .collect();

    Ok(Json(records))
}
