//! Flat per-cycle history entry.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::monitor::cycle::CycleStatus;
use crate::monitor::power_mode::PowerMode;

/// One row of run history, taken from a completed or degraded cycle.
///
/// Degraded cycles keep their index and time but carry zeroed metrics and
/// the error text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRecord {
    /// Evaluation cycle index, starting at 0.
    pub cycle: usize,
    /// Host tick on which the cycle ran.
    pub host_tick: u64,
    pub timestamp: DateTime<Utc>,
    pub degraded: bool,
    pub error: Option<String>,
    pub power_mode: Option<PowerMode>,
    /// Fraction in [0, 1].
    pub charge_percent: f64,
    pub stored_mwh: f64,
    pub peak_load_mw: f64,
    pub production_mw: f64,
    pub consumption_mw: f64,
    pub solar_mw: f64,
    pub wind_mw: f64,
    pub reactor_mw: f64,
    pub active_reactors: usize,
    pub solar_units_to_add: u32,
    pub wind_units_to_add: u32,
}

impl CycleRecord {
    pub fn from_status(
        cycle: usize,
        host_tick: u64,
        timestamp: DateTime<Utc>,
        status: &CycleStatus,
    ) -> Self {
        match status {
            CycleStatus::Completed(outcome) => {
                let m = &outcome.metrics;
                let rec = &outcome.report.recommendation;
                Self {
                    cycle,
                    host_tick,
                    timestamp,
                    degraded: false,
                    error: None,
                    power_mode: outcome.report.power_mode,
                    charge_percent: m.charge_percent,
                    stored_mwh: m.total_stored.0,
                    peak_load_mw: m.peak_load.0,
                    production_mw: m.production_total.0,
                    consumption_mw: m.consumption_total.0,
                    solar_mw: m.solar_production.0,
                    wind_mw: m.wind_production.0,
                    reactor_mw: m.reactor_production.0,
                    active_reactors: m.active_reactor_count,
                    solar_units_to_add: rec.solar_units_to_add,
                    wind_units_to_add: rec.wind_units_to_add,
                }
            }
            CycleStatus::Degraded(err) => Self {
                cycle,
                host_tick,
                timestamp,
                degraded: true,
                error: Some(err.to_string()),
                power_mode: None,
                charge_percent: 0.0,
                stored_mwh: 0.0,
                peak_load_mw: 0.0,
                production_mw: 0.0,
                consumption_mw: 0.0,
                solar_mw: 0.0,
                wind_mw: 0.0,
                reactor_mw: 0.0,
                active_reactors: 0,
                solar_units_to_add: 0,
                wind_units_to_add: 0,
            },
        }
    }
}
