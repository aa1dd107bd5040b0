//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::monitor::power_mode::PowerMode;
use crate::monitor::report::Report;
use crate::monitor::summary::RunSummary;

/// Current state of the run: summary, power mode and latest report.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub grid_name: String,
    pub power_mode: PowerMode,
    pub summary: RunSummary,
    /// `null` when no cycle completed.
    pub latest_report: Option<Report>,
}

/// Optional range query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// First cycle (inclusive).
    pub from: Option<usize>,
    /// Last cycle (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
