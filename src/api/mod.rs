//! REST API for the results of a monitoring run.
//!
//! Provides two GET endpoints:
//! - `/status`: run summary, current power mode and the latest report
//! - `/history`: per-cycle records with optional range filtering

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::monitor::power_mode::PowerMode;
use crate::monitor::record::CycleRecord;
use crate::monitor::report::Report;
use crate::monitor::summary::RunSummary;

pub use types::{ErrorResponse, HistoryQuery, StatusResponse};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the run completes and wrapped in `Arc`; no locks
/// needed since all data is read-only.
pub struct AppState {
    /// Display name of the monitored grid.
    pub grid_name: String,
    /// Mode committed by the last completed cycle.
    pub power_mode: PowerMode,
    pub summary: RunSummary,
    /// Report of the last completed cycle.
    pub last_report: Option<Report>,
    /// Per-cycle history.
    pub records: Vec<CycleRecord>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(handlers::get_status))
        .route("/history", get(handlers::get_history))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
