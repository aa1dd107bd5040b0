//! One evaluation cycle: snapshot, aggregate, recommend, decide, report.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::monitor::collaborator::{Actuator, CollaboratorError, Grid, ReportSink};
use crate::monitor::metrics::{AggregateMetrics, Snapshot, aggregate};
use crate::monitor::power_mode::{ActuationIntent, ModeThresholds, PowerMode, PowerModeController};
use crate::monitor::recommendation::{Recommendation, RecommendationConfig};
use crate::monitor::report::Report;

/// Whether the monitor only reports or also switches sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MonitorMode {
    /// Report and recommend; never actuate.
    Advisory,
    /// Also select a power mode and apply it.
    #[default]
    Controller,
}

/// Collaborator step a cycle failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Discovery,
    Actuation,
    Display,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Discovery => "discovery",
            Self::Actuation => "actuation",
            Self::Display => "display",
        })
    }
}

/// Why a cycle did not complete.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("{stage} failed: {source}")]
    CollaboratorUnavailable {
        stage: Stage,
        #[source]
        source: CollaboratorError,
    },
    #[error("non-finite aggregate metrics: {0}")]
    Computation(String),
}

impl CycleError {
    fn at(stage: Stage) -> impl FnOnce(CollaboratorError) -> Self {
        move |source| Self::CollaboratorUnavailable { stage, source }
    }
}

/// Result of a completed cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub metrics: AggregateMetrics,
    pub report: Report,
    /// Applied intent; `None` in advisory mode.
    pub intent: Option<ActuationIntent>,
}

/// What [`Monitor::tick`] hands back to the host.
#[derive(Debug)]
pub enum CycleStatus {
    Completed(Box<CycleOutcome>),
    Degraded(CycleError),
}

impl CycleStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn outcome(&self) -> Option<&CycleOutcome> {
        match self {
            Self::Completed(outcome) => Some(outcome.as_ref()),
            Self::Degraded(_) => None,
        }
    }
}

/// Stateful driver of evaluation cycles.
///
/// The only state kept between cycles is the controller's last mode.
#[derive(Debug, Clone)]
pub struct Monitor {
    mode: MonitorMode,
    recommendation: RecommendationConfig,
    controller: PowerModeController,
}

impl Monitor {
    pub fn new(
        mode: MonitorMode,
        recommendation: RecommendationConfig,
        thresholds: ModeThresholds,
    ) -> Self {
        Self {
            mode,
            recommendation,
            controller: PowerModeController::new(thresholds),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.monitor.mode,
            config.thresholds.recommendation(),
            config.thresholds.mode_thresholds(),
        )
    }

    pub fn mode(&self) -> MonitorMode {
        self.mode
    }

    /// Last committed power mode.
    pub fn power_mode(&self) -> PowerMode {
        self.controller.mode()
    }

    /// Runs one cycle against the collaborators.
    ///
    /// The controller state only advances when every step succeeded, so a
    /// failed cycle can simply be retried on the next tick.
    ///
    /// # Errors
    ///
    /// Returns `CycleError::CollaboratorUnavailable` if discovery, actuation or
    /// display fails, and `CycleError::Computation` if a reading produced a
    /// non-finite total.
    pub fn run_cycle<G, S>(
        &mut self,
        grid: &mut G,
        sink: &mut S,
        now: DateTime<Utc>,
    ) -> Result<CycleOutcome, CycleError>
    where
        G: Grid + Actuator + ?Sized,
        S: ReportSink + ?Sized,
    {
        let grid_name = grid.name().to_string();
        let snapshot = Snapshot::capture(grid.blocks().map_err(CycleError::at(Stage::Discovery))?);

        let metrics = aggregate(&snapshot);
        if !metrics.is_finite() {
            return Err(CycleError::Computation(format!("{metrics:?}")));
        }
        debug!(?metrics, "aggregated");

        let recommendation = Recommendation::compute(
            metrics.peak_load,
            metrics.solar_production,
            metrics.wind_count,
            &self.recommendation,
        );
        debug!(?recommendation, "recommendation");

        let power_mode = match self.mode {
            MonitorMode::Controller => Some(self.controller.decide(&metrics)),
            MonitorMode::Advisory => None,
        };

        let report = Report::build(
            &grid_name,
            now,
            &snapshot,
            &metrics,
            recommendation,
            self.recommendation.margin_factor,
            power_mode,
        );

        let intent = power_mode.map(PowerMode::intent);
        if let Some(intent) = intent {
            grid.apply(intent).map_err(CycleError::at(Stage::Actuation))?;
        }
        sink.write(&report).map_err(CycleError::at(Stage::Display))?;

        if let Some(mode) = power_mode {
            let previous = self.controller.mode();
            if mode != previous {
                info!(from = %previous, to = %mode, "power mode changed");
            }
            self.controller.commit(mode);
        }

        info!(
            grid = %grid_name,
            mode = ?power_mode,
            charge_pct = metrics.charge_percent * 100.0,
            peak = %metrics.peak_load,
            production = %metrics.production_total,
            consumption = %metrics.consumption_total,
            "cycle complete"
        );

        Ok(CycleOutcome {
            metrics,
            report,
            intent,
        })
    }

    /// Runs one cycle and folds any failure into a degraded status.
    ///
    /// A failure is logged once and a one-line status is offered to the sink
    /// in place of the report. Nothing is fatal.
    pub fn tick<G, S>(&mut self, grid: &mut G, sink: &mut S, now: DateTime<Utc>) -> CycleStatus
    where
        G: Grid + Actuator + ?Sized,
        S: ReportSink + ?Sized,
    {
        match self.run_cycle(grid, sink, now) {
            Ok(outcome) => CycleStatus::Completed(Box::new(outcome)),
            Err(err) => {
                warn!(error = %err, "cycle degraded");
                let line = format!("POWER MONITOR DEGRADED: {err}");
                if let Err(sink_err) = sink.write_status(&line) {
                    debug!(error = %sink_err, "status line not shown");
                }
                CycleStatus::Degraded(err)
            }
        }
    }
}
