//! Structured per-cycle report and its text layout.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::devices::types::{ConnectorStatus, DeviceKind};
use crate::monitor::metrics::{AggregateMetrics, Snapshot};
use crate::monitor::power_mode::PowerMode;
use crate::monitor::recommendation::Recommendation;
use crate::quantity::{MegawattHours, Megawatts};

/// Battery section of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatterySummary {
    pub count: usize,
    /// Fraction in [0, 1].
    pub charge_percent: f64,
    pub stored: MegawattHours,
    pub charging: usize,
    pub discharging: usize,
    pub peak_load: Megawatts,
}

/// Generation section of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSummary {
    pub solar_production: Megawatts,
    pub solar_count: usize,
    pub wind_production: Megawatts,
    pub wind_count: usize,
    pub reactor_production: Megawatts,
    pub active_reactors: usize,
    pub reactor_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlowDirection {
    Export,
    Import,
}

impl FlowDirection {
    /// Zero flow counts as export.
    pub fn of(flow: Megawatts) -> Self {
        if flow >= Megawatts::ZERO {
            Self::Export
        } else {
            Self::Import
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Export => "EXPORT",
            Self::Import => "IMPORT",
        })
    }
}

/// One connector line of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorFlow {
    pub name: String,
    pub status: ConnectorStatus,
    /// Flow magnitude; the sign lives in `direction`.
    pub flow: Megawatts,
    pub direction: FlowDirection,
}

/// Everything one evaluation cycle has to say.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub grid_name: String,
    pub timestamp: DateTime<Utc>,
    /// `None` when the grid has no batteries.
    pub batteries: Option<BatterySummary>,
    pub sources: SourceSummary,
    pub connectors: Vec<ConnectorFlow>,
    pub recommendation: Recommendation,
    /// Margin the recommendation was sized with.
    pub margin_factor: f64,
    /// Selected mode; only present when the monitor also actuates.
    pub power_mode: Option<PowerMode>,
}

impl Report {
    pub fn build(
        grid_name: &str,
        timestamp: DateTime<Utc>,
        snapshot: &Snapshot,
        metrics: &AggregateMetrics,
        recommendation: Recommendation,
        margin_factor: f64,
        power_mode: Option<PowerMode>,
    ) -> Self {
        let batteries = (metrics.battery_count > 0).then(|| BatterySummary {
            count: metrics.battery_count,
            charge_percent: metrics.charge_percent,
            stored: metrics.total_stored,
            charging: metrics.charging_count,
            discharging: metrics.discharging_count,
            peak_load: metrics.peak_load,
        });

        let connectors = snapshot
            .of_kind(DeviceKind::Connector)
            .iter()
            .map(|sample| ConnectorFlow {
                name: sample.name.clone(),
                status: sample
                    .connector_status
                    .unwrap_or(ConnectorStatus::Unconnected),
                flow: sample.output.abs(),
                direction: FlowDirection::of(sample.output),
            })
            .collect();

        Self {
            grid_name: grid_name.to_string(),
            timestamp,
            batteries,
            sources: SourceSummary {
                solar_production: metrics.solar_production,
                solar_count: metrics.solar_count,
                wind_production: metrics.wind_production,
                wind_count: metrics.wind_count,
                reactor_production: metrics.reactor_production,
                active_reactors: metrics.active_reactor_count,
                reactor_count: metrics.reactor_count,
            },
            connectors,
            recommendation,
            margin_factor,
            power_mode,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== GRID POWER STATUS ===")?;
        writeln!(f, "Grid: {}", self.grid_name)?;
        writeln!(f, "Time: {}", self.timestamp.format("%H:%M:%S"))?;
        writeln!(f)?;

        match &self.batteries {
            Some(b) => {
                writeln!(f, "BATTERIES ({}):", b.count)?;
                writeln!(f, "  Charge: {:.1}% ({})", b.charge_percent * 100.0, b.stored)?;
                writeln!(f, "  Charging: {} | Discharging: {}", b.charging, b.discharging)?;
                writeln!(f, "  Peak Load: {}", b.peak_load)?;
                writeln!(f)?;
            }
            None => writeln!(f, "No batteries found")?,
        }

        let s = &self.sources;
        writeln!(f, "SOURCES:")?;
        writeln!(f, "  Solar: {} ({})", s.solar_production, s.solar_count)?;
        writeln!(f, "  Wind:  {} ({})", s.wind_production, s.wind_count)?;
        writeln!(f, "  Reactors: {}/{}", s.active_reactors, s.reactor_count)?;
        writeln!(f)?;

        if let Some(mode) = self.power_mode {
            writeln!(f, "POWER MODE: {mode}")?;
            writeln!(f)?;
        }

        writeln!(f, "CONNECTOR FLOWS ({}):", self.connectors.len())?;
        for c in &self.connectors {
            writeln!(f, "  {}: {}", c.name, c.status)?;
            writeln!(f, "    {} -> {}", c.flow, c.direction)?;
            writeln!(f)?;
        }

        // nothing to size without batteries
        if self.batteries.is_none() {
            return Ok(());
        }

        let r = &self.recommendation;
        let margin_pct = (self.margin_factor - 1.0) * 100.0;
        let peak = self.batteries.as_ref().map_or(Megawatts::ZERO, |b| b.peak_load);
        writeln!(f, "=== RECOMMENDATIONS ({margin_pct:.0}% DAY MARGIN) ===")?;
        writeln!(f, "Peak Load: {peak:.1}")?;
        writeln!(f)?;

        writeln!(f, "DAYTIME (Solar):")?;
        writeln!(
            f,
            "  Current: {:.1} ({} panels)",
            r.current_day_power, self.sources.solar_count
        )?;
        writeln!(f, "  Target:  {:.1}", r.target_day_power)?;
        writeln!(f, "  ADD:     +{} solar panels", r.solar_units_to_add)?;
        writeln!(f)?;

        writeln!(f, "NIGHTTIME (Wind):")?;
        writeln!(
            f,
            "  Current: {} turbines (~{:.1} peak)",
            r.current_wind_count, r.target_night_power
        )?;
        writeln!(f, "  Target:  {} turbines", r.wind_units_needed)?;
        writeln!(f, "  ADD:     +{} turbines", r.wind_units_to_add)?;
        writeln!(f)?;

        writeln!(f, "SOLAR LAYOUT: 8blk apart, back-to-back pairs")?;
        writeln!(f, "WIND LAYOUT:  9blk high, 8blk apart horizontally")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::devices::types::{ChargeState, DeviceSample};
    use crate::monitor::metrics::aggregate;
    use crate::monitor::recommendation::RecommendationConfig;

    fn report(samples: Vec<DeviceSample>, mode: Option<PowerMode>) -> Report {
        let snapshot = Snapshot::from_samples(samples);
        let metrics = aggregate(&snapshot);
        let config = RecommendationConfig::default();
        let rec = Recommendation::compute(
            metrics.peak_load,
            metrics.solar_production,
            metrics.wind_count,
            &config,
        );
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 13, 5, 9).unwrap();
        Report::build("Outpost", at, &snapshot, &metrics, rec, config.margin_factor, mode)
    }

    #[test]
    fn connector_flow_splits_sign_from_magnitude() {
        let r = report(
            vec![
                DeviceSample::connector("Dock A", Megawatts(-0.25), ConnectorStatus::Connected),
                DeviceSample::connector("Dock B", Megawatts::ZERO, ConnectorStatus::Connectable),
            ],
            None,
        );
        assert_eq!(r.connectors[0].flow, Megawatts(0.25));
        assert_eq!(r.connectors[0].direction, FlowDirection::Import);
        assert_eq!(r.connectors[1].direction, FlowDirection::Export);
    }

    #[test]
    fn text_without_batteries_skips_recommendation() {
        let r = report(
            vec![DeviceSample::generator(DeviceKind::Solar, "S", Megawatts(0.1))],
            None,
        );
        let text = r.to_string();
        assert!(text.contains("No batteries found"));
        assert!(text.contains("  Solar: 0.10MW (1)"));
        assert!(!text.contains("RECOMMENDATIONS"));
        assert_eq!(r.recommendation.solar_units_to_add, 0);
    }

    #[test]
    fn text_layout_matches_display_surface() {
        let r = report(
            vec![
                DeviceSample::battery(
                    "Battery 1",
                    MegawattHours(3.0),
                    MegawattHours(1.5),
                    Megawatts(2.0),
                    ChargeState::Discharging,
                ),
                DeviceSample::generator(DeviceKind::Solar, "S", Megawatts(1.0)),
                DeviceSample::generator(DeviceKind::Wind, "W", Megawatts(0.3)),
                DeviceSample::connector("Dock A", Megawatts(0.5), ConnectorStatus::Connected),
            ],
            Some(PowerMode::BatteryAssist),
        );
        let text = r.to_string();
        let expected = [
            "=== GRID POWER STATUS ===",
            "Grid: Outpost",
            "Time: 13:05:09",
            "BATTERIES (1):",
            "  Charge: 50.0% (2MWh)",
            "  Charging: 0 | Discharging: 1",
            "  Peak Load: 2.00MW",
            "  Wind:  0.30MW (1)",
            "  Reactors: 0/0",
            "POWER MODE: BatteryAssist",
            "CONNECTOR FLOWS (1):",
            "  Dock A: Connected",
            "    0.50MW -> EXPORT",
            "=== RECOMMENDATIONS (50% DAY MARGIN) ===",
            "Peak Load: 2.0MW",
            "  Current: 1.0MW (1 panels)",
            "  Target:  3.0MW",
            "  ADD:     +20 solar panels",
            "  Current: 1 turbines (~2.0MW peak)",
            "  Target:  5 turbines",
            "  ADD:     +4 turbines",
            "SOLAR LAYOUT: 8blk apart, back-to-back pairs",
        ];
        for line in expected {
            assert!(text.lines().any(|l| l == line), "missing line {line:?} in\n{text}");
        }
    }

    #[test]
    fn advisory_report_has_no_mode_line() {
        let r = report(Vec::new(), None);
        assert!(!r.to_string().contains("POWER MODE"));
    }
}
