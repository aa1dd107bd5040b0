//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use power_monitor::config::MonitorConfig;
use power_monitor::devices::types::{ChargeState, DeviceKind, DeviceSample, PowerBlock};
use power_monitor::monitor::collaborator::{Actuator, CollaboratorError, Grid, ReportSink};
use power_monitor::monitor::power_mode::ActuationIntent;
use power_monitor::monitor::report::Report;
use power_monitor::quantity::{MegawattHours, Megawatts};

/// Baseline configuration shortened to `cycles` evaluation cycles.
pub fn baseline_config(cycles: usize) -> MonitorConfig {
    let mut config = MonitorConfig::baseline();
    config.monitor.cycles = cycles;
    config
}

/// Wall-clock time of simulated step 0.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

/// Battery sample with the given stored/capacity (MWh) and signed output (MW).
pub fn battery(name: &str, stored: f64, capacity: f64, output: f64) -> DeviceSample {
    let state = if output > 0.0 {
        ChargeState::Discharging
    } else if output < 0.0 {
        ChargeState::Charging
    } else {
        ChargeState::Idle
    };
    DeviceSample::battery(
        name,
        MegawattHours(capacity),
        MegawattHours(stored),
        Megawatts(output),
        state,
    )
}

pub fn solar(name: &str, output: f64) -> DeviceSample {
    DeviceSample::generator(DeviceKind::Solar, name, Megawatts(output))
}

pub fn wind(name: &str, output: f64) -> DeviceSample {
    DeviceSample::generator(DeviceKind::Wind, name, Megawatts(output))
}

pub fn reactor(name: &str, output: f64) -> DeviceSample {
    DeviceSample::generator(DeviceKind::Reactor, name, Megawatts(output))
}

/// Grid that hands out a fixed set of samples and records what it is told.
pub struct SampleGrid {
    pub samples: Vec<DeviceSample>,
    pub offline: bool,
    pub applied: Vec<ActuationIntent>,
}

impl SampleGrid {
    pub fn new(samples: Vec<DeviceSample>) -> Self {
        Self {
            samples,
            offline: false,
            applied: Vec::new(),
        }
    }
}

impl Grid for SampleGrid {
    fn name(&self) -> &str {
        "Test Rig"
    }

    fn blocks(&self) -> Result<Vec<&dyn PowerBlock>, CollaboratorError> {
        if self.offline {
            return Err(CollaboratorError::Unavailable("rig offline".into()));
        }
        Ok(self.samples.iter().map(|s| s as &dyn PowerBlock).collect())
    }
}

impl Actuator for SampleGrid {
    fn apply(&mut self, intent: ActuationIntent) -> Result<(), CollaboratorError> {
        self.applied.push(intent);
        Ok(())
    }
}

/// Sink that keeps every report and status line it is given.
#[derive(Default)]
pub struct RecordingSink {
    pub reports: Vec<Report>,
    pub status: Vec<String>,
}

impl ReportSink for RecordingSink {
    fn write(&mut self, report: &Report) -> Result<(), CollaboratorError> {
        self.reports.push(report.clone());
        Ok(())
    }

    fn write_status(&mut self, line: &str) -> Result<(), CollaboratorError> {
        self.status.push(line.to_string());
        Ok(())
    }
}
