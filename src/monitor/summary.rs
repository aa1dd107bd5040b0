//! Post-hoc summary of a monitoring run.

use std::fmt;

use serde::Serialize;

use crate::monitor::power_mode::PowerMode;
use crate::monitor::record::CycleRecord;

/// Aggregate indicators derived from a run's cycle history.
///
/// Computed post-hoc from `&[CycleRecord]` so the summary always agrees with
/// the exported history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Evaluation cycles attempted.
    pub cycles: usize,
    /// Cycles that ended in a degraded status.
    pub degraded_cycles: usize,
    pub surplus_cycles: usize,
    pub battery_assist_cycles: usize,
    pub reactor_assist_cycles: usize,
    /// Changes of power mode between consecutive completed cycles; a high
    /// count relative to `cycles` means the thresholds oscillate.
    pub mode_switches: usize,
    /// Lowest charge fraction over completed cycles.
    pub min_charge: f64,
    /// Highest charge fraction over completed cycles.
    pub max_charge: f64,
    /// Highest battery discharge seen (MW).
    pub max_peak_load_mw: f64,
    /// Solar units suggested by the last completed cycle.
    pub final_solar_units_to_add: u32,
    /// Wind units suggested by the last completed cycle.
    pub final_wind_units_to_add: u32,
}

impl RunSummary {
    /// Computes the summary from the complete cycle history.
    pub fn from_records(records: &[CycleRecord]) -> Self {
        let mut summary = Self {
            cycles: records.len(),
            ..Self::default()
        };

        let completed: Vec<&CycleRecord> = records.iter().filter(|r| !r.degraded).collect();
        summary.degraded_cycles = records.len() - completed.len();
        if completed.is_empty() {
            return summary;
        }

        summary.min_charge = f64::INFINITY;
        let mut previous: Option<PowerMode> = None;
        for r in &completed {
            summary.min_charge = summary.min_charge.min(r.charge_percent);
            summary.max_charge = summary.max_charge.max(r.charge_percent);
            summary.max_peak_load_mw = summary.max_peak_load_mw.max(r.peak_load_mw);

            match r.power_mode {
                Some(PowerMode::Surplus) => summary.surplus_cycles += 1,
                Some(PowerMode::BatteryAssist) => summary.battery_assist_cycles += 1,
                Some(PowerMode::ReactorAssist) => summary.reactor_assist_cycles += 1,
                None => {}
            }
            if matches!((previous, r.power_mode), (Some(prev), Some(mode)) if prev != mode) {
                summary.mode_switches += 1;
            }
            previous = r.power_mode.or(previous);
        }

        if let Some(last) = completed.last() {
            summary.final_solar_units_to_add = last.solar_units_to_add;
            summary.final_wind_units_to_add = last.wind_units_to_add;
        }
        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(
            f,
            "Cycles:                {} ({} degraded)",
            self.cycles, self.degraded_cycles
        )?;
        writeln!(
            f,
            "Modes:                 surplus {} | battery {} | reactor {}",
            self.surplus_cycles, self.battery_assist_cycles, self.reactor_assist_cycles
        )?;
        writeln!(f, "Mode switches:         {}", self.mode_switches)?;
        writeln!(
            f,
            "Charge range:          {:.1}% .. {:.1}%",
            self.min_charge * 100.0,
            self.max_charge * 100.0
        )?;
        writeln!(f, "Max peak load:         {:.2} MW", self.max_peak_load_mw)?;
        write!(
            f,
            "Suggested additions:   +{} solar, +{} wind",
            self.final_solar_units_to_add, self.final_wind_units_to_add
        )
    }
}
