//! Host loop: gate ticks, advance the grid, run evaluation cycles.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::config::MonitorConfig;
use crate::devices::grid::SimulatedGrid;
use crate::monitor::clock::UpdateGate;
use crate::monitor::collaborator::ReportSink;
use crate::monitor::cycle::Monitor;
use crate::monitor::power_mode::PowerMode;
use crate::monitor::record::CycleRecord;
use crate::monitor::report::Report;
use crate::monitor::summary::RunSummary;

/// Everything a finished run leaves behind.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<CycleRecord>,
    /// Report of the last completed cycle.
    pub last_report: Option<Report>,
    /// Power mode committed when the run ended.
    pub power_mode: PowerMode,
    pub summary: RunSummary,
}

/// Drives evaluation cycles one at a time.
///
/// Each cycle consumes one update interval of host ticks and one simulated
/// grid step. Callers that need to interfere between cycles (fault
/// injection, interactive hosts) use [`Runner::step`]; everyone else calls
/// [`run`].
pub struct Runner {
    monitor: Monitor,
    gate: UpdateGate,
    start: DateTime<Utc>,
    host_tick: u64,
    records: Vec<CycleRecord>,
    last_report: Option<Report>,
}

impl Runner {
    /// `start` is the wall-clock time of simulated step 0.
    pub fn new(config: &MonitorConfig, start: DateTime<Utc>) -> Self {
        Self {
            monitor: Monitor::from_config(config),
            gate: UpdateGate::new(config.monitor.update_interval),
            start,
            host_tick: 0,
            records: Vec::with_capacity(config.monitor.cycles),
            last_report: None,
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Waits out one update interval, advances the grid and runs a cycle.
    pub fn step<S>(&mut self, grid: &mut SimulatedGrid, sink: &mut S) -> &CycleRecord
    where
        S: ReportSink + ?Sized,
    {
        self.host_tick += u64::from(self.gate.wait());

        let timestamp = self.start + sim_offset(grid.timestep(), grid.dt_hours());
        grid.advance();

        let status = self.monitor.tick(grid, sink, timestamp);
        let cycle = self.records.len();
        debug!(cycle, host_tick = self.host_tick, degraded = status.is_degraded(), "cycle ran");

        if let Some(outcome) = status.outcome() {
            self.last_report = Some(outcome.report.clone());
        }
        self.records.push(CycleRecord::from_status(cycle, self.host_tick, timestamp, &status));
        &self.records[cycle]
    }

    pub fn finish(self) -> RunOutput {
        RunOutput {
            summary: RunSummary::from_records(&self.records),
            records: self.records,
            last_report: self.last_report,
            power_mode: self.monitor.power_mode(),
        }
    }
}

/// Runs `config.monitor.cycles` evaluation cycles against the grid.
pub fn run<S>(
    config: &MonitorConfig,
    grid: &mut SimulatedGrid,
    sink: &mut S,
    start: DateTime<Utc>,
) -> RunOutput
where
    S: ReportSink + ?Sized,
{
    let mut runner = Runner::new(config, start);
    for _ in 0..config.monitor.cycles {
        runner.step(grid, sink);
    }
    runner.finish()
}

fn sim_offset(timestep: usize, dt_hours: f64) -> TimeDelta {
    let ms = (timestep as f64 * dt_hours * 3_600_000.0).round();
    TimeDelta::milliseconds(ms as i64)
}
