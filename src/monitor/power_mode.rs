//! Selection of the generation sources that should run right now.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::monitor::metrics::AggregateMetrics;

/// Operating mode of the grid, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PowerMode {
    /// Renewables out-produce consumption with margin; reactors are not needed.
    Surplus,
    /// Batteries hold enough charge to carry the grid.
    BatteryAssist,
    /// Everything on.
    #[default]
    ReactorAssist,
}

impl PowerMode {
    pub const ALL: [Self; 3] = [Self::Surplus, Self::BatteryAssist, Self::ReactorAssist];

    /// Which sources this mode wants enabled.
    pub fn intent(self) -> ActuationIntent {
        match self {
            Self::Surplus | Self::BatteryAssist => ActuationIntent {
                batteries_enabled: true,
                reactors_enabled: false,
            },
            Self::ReactorAssist => ActuationIntent {
                batteries_enabled: true,
                reactors_enabled: true,
            },
        }
    }
}

impl fmt::Display for PowerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Surplus => "Surplus",
            Self::BatteryAssist => "BatteryAssist",
            Self::ReactorAssist => "ReactorAssist",
        };
        f.write_str(name)
    }
}

/// Enable flags handed to the actuation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActuationIntent {
    pub batteries_enabled: bool,
    pub reactors_enabled: bool,
}

/// Thresholds of the mode decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeThresholds {
    /// Production must exceed consumption times this factor for surplus.
    pub surplus_factor: f64,
    /// Charge fraction above which batteries carry the grid.
    pub target_recharge: f64,
    /// Dead-band favouring the previous mode; 0 disables it.
    pub hysteresis: f64,
}

impl Default for ModeThresholds {
    fn default() -> Self {
        Self {
            surplus_factor: 1.2,
            target_recharge: 0.5,
            hysteresis: 0.0,
        }
    }
}

/// Classifies a cycle's metrics into exactly one mode.
///
/// First match wins: surplus, then battery assist, then reactor assist. Pure
/// and stateless; the dead-band is ignored.
pub fn classify(metrics: &AggregateMetrics, thresholds: &ModeThresholds) -> PowerMode {
    classify_with_bias(metrics, thresholds, None)
}

fn classify_with_bias(
    metrics: &AggregateMetrics,
    thresholds: &ModeThresholds,
    previous: Option<PowerMode>,
) -> PowerMode {
    let band = thresholds.hysteresis.max(0.0);
    // staying in the previous mode needs less than entering it
    let shift = |mode: PowerMode| match previous {
        Some(prev) if prev == mode => -band,
        Some(_) => band,
        None => 0.0,
    };

    let surplus_factor = thresholds.surplus_factor + shift(PowerMode::Surplus);
    if metrics.production_total.0 > metrics.consumption_total.0 * surplus_factor {
        return PowerMode::Surplus;
    }
    if metrics.charge_percent > thresholds.target_recharge + shift(PowerMode::BatteryAssist) {
        return PowerMode::BatteryAssist;
    }
    PowerMode::ReactorAssist
}

/// Holds the last selected mode across cycles.
///
/// `decide` only reads state. The cycle calls `commit` once everything else
/// has succeeded, so a failed cycle leaves the controller untouched.
#[derive(Debug, Clone)]
pub struct PowerModeController {
    thresholds: ModeThresholds,
    mode: PowerMode,
}

impl PowerModeController {
    pub fn new(thresholds: ModeThresholds) -> Self {
        Self {
            thresholds,
            mode: PowerMode::ReactorAssist,
        }
    }

    /// Last committed mode; `ReactorAssist` before the first cycle.
    pub fn mode(&self) -> PowerMode {
        self.mode
    }

    pub fn thresholds(&self) -> &ModeThresholds {
        &self.thresholds
    }

    /// Mode for this cycle's metrics, biased towards the current mode when a
    /// dead-band is configured.
    pub fn decide(&self, metrics: &AggregateMetrics) -> PowerMode {
        if self.thresholds.hysteresis > 0.0 {
            classify_with_bias(metrics, &self.thresholds, Some(self.mode))
        } else {
            classify(metrics, &self.thresholds)
        }
    }

    /// Records the mode selected by a completed cycle.
    pub fn commit(&mut self, mode: PowerMode) {
        self.mode = mode;
    }
}
