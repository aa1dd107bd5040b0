//! TOML-based monitor configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::monitor::cycle::MonitorMode;
use crate::monitor::power_mode::ModeThresholds;
use crate::monitor::recommendation::RecommendationConfig;
use crate::quantity::Megawatts;

/// Top-level monitor configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`MonitorConfig::from_toml_file`] or use
/// [`MonitorConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Simulated grid timing and seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Evaluation cycle parameters.
    #[serde(default)]
    pub monitor: MonitorSection,
    /// Decision thresholds and per-unit ratings.
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// Hidden base load of the simulated grid.
    #[serde(default)]
    pub load: LoadConfig,
    /// Battery banks.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Solar panels.
    #[serde(default)]
    pub solar: SolarConfig,
    /// Wind turbines.
    #[serde(default)]
    pub wind: WindConfig,
    /// Reactors.
    #[serde(default)]
    pub reactor: ReactorConfig,
    /// Docking connectors.
    #[serde(default)]
    pub connector: ConnectorConfig,
}

/// Simulated grid timing and seed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of simulated grid steps per day (must be > 0).
    pub steps_per_day: usize,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps_per_day: 24,
            seed: 42,
        }
    }
}

/// Evaluation cycle parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorSection {
    /// Display name of the monitored grid.
    pub grid_name: String,
    /// `"advisory"` reports only, `"controller"` also actuates.
    pub mode: MonitorMode,
    /// Host ticks between two evaluation cycles (must be > 0).
    pub update_interval: u32,
    /// Number of evaluation cycles to run (must be > 0).
    pub cycles: usize,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            grid_name: "Outpost".to_string(),
            mode: MonitorMode::Controller,
            update_interval: 60,
            cycles: 24,
        }
    }
}

/// Decision thresholds and per-unit ratings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Peak-load multiplier for daytime generation sizing.
    pub margin_factor: f64,
    /// Consumption multiplier production must exceed for surplus.
    pub surplus_factor: f64,
    /// Charge fraction above which batteries carry the grid alone.
    pub target_recharge: f64,
    /// Nameplate output of one additional solar panel (MW).
    pub solar_unit_output_mw: f64,
    /// Nameplate output of one additional wind turbine (MW).
    pub wind_unit_output_mw: f64,
    /// Dead-band favouring the previous power mode (0 disables it).
    pub hysteresis: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            margin_factor: 1.5,
            surplus_factor: 1.2,
            target_recharge: 0.5,
            solar_unit_output_mw: 0.1,
            wind_unit_output_mw: 0.4,
            hysteresis: 0.0,
        }
    }
}

impl ThresholdConfig {
    pub fn recommendation(&self) -> RecommendationConfig {
        RecommendationConfig {
            margin_factor: self.margin_factor,
            solar_unit_output: Megawatts(self.solar_unit_output_mw),
            wind_unit_output: Megawatts(self.wind_unit_output_mw),
        }
    }

    pub fn mode_thresholds(&self) -> ModeThresholds {
        ModeThresholds {
            surplus_factor: self.surplus_factor,
            target_recharge: self.target_recharge,
            hysteresis: self.hysteresis,
        }
    }
}

/// Hidden base load of the simulated grid.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Baseline consumption (MW).
    pub base_mw: f64,
    /// Sinusoidal amplitude (MW).
    pub amp_mw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (MW).
    pub noise_std: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_mw: 1.2,
            amp_mw: 0.5,
            phase_rad: 1.2,
            noise_std: 0.05,
        }
    }
}

/// Battery banks.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    pub count: usize,
    /// Capacity of one bank (MWh).
    pub capacity_mwh: f64,
    /// Initial charge fraction (0.0–1.0).
    pub initial_charge: f64,
    /// Maximum charge and discharge rate of one bank (MW).
    pub max_rate_mw: f64,
    /// Charge efficiency (0.0–1.0].
    pub efficiency: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            count: 4,
            capacity_mwh: 3.0,
            initial_charge: 0.6,
            max_rate_mw: 12.0,
            efficiency: 0.8,
        }
    }
}

/// Solar panels.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    pub count: usize,
    /// Peak output of one panel (MW).
    pub panel_peak_mw: f64,
    /// Sunrise step index (inclusive).
    pub sunrise_idx: usize,
    /// Sunset step index (exclusive).
    pub sunset_idx: usize,
    /// Relative noise standard deviation.
    pub noise_std: f64,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            count: 10,
            panel_peak_mw: 0.1,
            sunrise_idx: 6,
            sunset_idx: 18,
            noise_std: 0.05,
        }
    }
}

/// Wind turbines.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindConfig {
    pub count: usize,
    /// Rated output of one turbine (MW).
    pub rated_mw: f64,
    /// Long-run mean wind as a fraction of rated speed.
    pub mean_wind: f64,
    /// AR(1) persistence of the wind (0.0–1.0).
    pub alpha: f64,
    /// AR(1) innovation standard deviation.
    pub noise_std: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            count: 2,
            rated_mw: 0.4,
            mean_wind: 0.6,
            alpha: 0.85,
            noise_std: 0.15,
        }
    }
}

/// Reactors.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReactorConfig {
    pub count: usize,
    /// Maximum output of one reactor (MW).
    pub rating_mw: f64,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            count: 1,
            rating_mw: 15.0,
        }
    }
}

/// Docking connectors.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectorConfig {
    /// Docks; every other one has a ship attached that carries a share of
    /// the machinery load.
    pub count: usize,
    /// Mean draw of a docked ship on top of its machinery share (MW).
    pub ship_draw_mw: f64,
    /// Gaussian noise standard deviation of the ship draw (MW).
    pub noise_std: f64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            count: 2,
            ship_draw_mw: 0.1,
            noise_std: 0.1,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"thresholds.margin_factor"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl MonitorConfig {
    /// Returns the baseline scenario: a small outpost with every source kind.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the solar-heavy preset: a large array, no wind, weak reactor.
    pub fn solar_heavy() -> Self {
        Self {
            monitor: MonitorSection {
                grid_name: "Solar Farm".to_string(),
                ..MonitorSection::default()
            },
            solar: SolarConfig {
                count: 40,
                sunrise_idx: 5,
                sunset_idx: 19,
                ..SolarConfig::default()
            },
            wind: WindConfig {
                count: 0,
                ..WindConfig::default()
            },
            reactor: ReactorConfig {
                count: 1,
                rating_mw: 2.0,
            },
            ..Self::default()
        }
    }

    /// Returns the reactor-dependent preset: heavy load, drained batteries,
    /// almost no renewables.
    pub fn reactor_dependent() -> Self {
        Self {
            monitor: MonitorSection {
                grid_name: "Refinery".to_string(),
                ..MonitorSection::default()
            },
            load: LoadConfig {
                base_mw: 4.0,
                amp_mw: 1.0,
                ..LoadConfig::default()
            },
            battery: BatteryConfig {
                count: 2,
                initial_charge: 0.2,
                ..BatteryConfig::default()
            },
            solar: SolarConfig {
                count: 2,
                ..SolarConfig::default()
            },
            wind: WindConfig {
                count: 1,
                ..WindConfig::default()
            },
            reactor: ReactorConfig {
                count: 2,
                rating_mw: 15.0,
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "solar_heavy", "reactor_dependent"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "solar_heavy" => Ok(Self::solar_heavy()),
            "reactor_dependent" => Ok(Self::reactor_dependent()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.simulation.steps_per_day == 0 {
            errors.push(ConfigError::new("simulation.steps_per_day", "must be > 0"));
        }

        let m = &self.monitor;
        if m.update_interval == 0 {
            errors.push(ConfigError::new("monitor.update_interval", "must be > 0"));
        }
        if m.cycles == 0 {
            errors.push(ConfigError::new("monitor.cycles", "must be > 0"));
        }

        let t = &self.thresholds;
        if !(t.margin_factor >= 1.0) {
            errors.push(ConfigError::new("thresholds.margin_factor", "must be >= 1.0"));
        }
        if !(t.surplus_factor > 0.0) {
            errors.push(ConfigError::new("thresholds.surplus_factor", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&t.target_recharge) {
            errors.push(ConfigError::new(
                "thresholds.target_recharge",
                "must be in [0.0, 1.0]",
            ));
        }
        if !(t.solar_unit_output_mw > 0.0) {
            errors.push(ConfigError::new("thresholds.solar_unit_output_mw", "must be > 0"));
        }
        if !(t.wind_unit_output_mw > 0.0) {
            errors.push(ConfigError::new("thresholds.wind_unit_output_mw", "must be > 0"));
        }
        if !(0.0..=0.5).contains(&t.hysteresis) {
            errors.push(ConfigError::new("thresholds.hysteresis", "must be in [0.0, 0.5]"));
        }

        let bat = &self.battery;
        if bat.count > 0 && !(bat.capacity_mwh > 0.0) {
            errors.push(ConfigError::new("battery.capacity_mwh", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&bat.initial_charge) {
            errors.push(ConfigError::new("battery.initial_charge", "must be in [0.0, 1.0]"));
        }
        if !(bat.max_rate_mw >= 0.0) {
            errors.push(ConfigError::new("battery.max_rate_mw", "must be >= 0"));
        }
        if !(bat.efficiency > 0.0 && bat.efficiency <= 1.0) {
            errors.push(ConfigError::new("battery.efficiency", "must be in (0.0, 1.0]"));
        }

        let sol = &self.solar;
        if sol.sunrise_idx >= sol.sunset_idx {
            errors.push(ConfigError::new("solar.sunrise_idx", "must be < solar.sunset_idx"));
        }
        if self.simulation.steps_per_day > 0 && sol.sunset_idx > self.simulation.steps_per_day {
            errors.push(ConfigError::new(
                "solar.sunset_idx",
                "must be <= simulation.steps_per_day",
            ));
        }

        if !(0.0..=1.0).contains(&self.wind.alpha) {
            errors.push(ConfigError::new("wind.alpha", "must be in [0.0, 1.0]"));
        }

        for (field, value) in [
            ("load.base_mw", self.load.base_mw),
            ("load.amp_mw", self.load.amp_mw),
            ("load.noise_std", self.load.noise_std),
            ("solar.panel_peak_mw", sol.panel_peak_mw),
            ("solar.noise_std", sol.noise_std),
            ("wind.rated_mw", self.wind.rated_mw),
            ("wind.mean_wind", self.wind.mean_wind),
            ("wind.noise_std", self.wind.noise_std),
            ("reactor.rating_mw", self.reactor.rating_mw),
            ("connector.ship_draw_mw", self.connector.ship_draw_mw),
            ("connector.noise_std", self.connector.noise_std),
        ] {
            if !(value >= 0.0) {
                errors.push(ConfigError::new(field, "must be >= 0"));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = MonitorConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn baseline_uses_reference_thresholds() {
        let t = MonitorConfig::baseline().thresholds;
        assert_eq!(t.margin_factor, 1.5);
        assert_eq!(t.surplus_factor, 1.2);
        assert_eq!(t.target_recharge, 0.5);
        assert_eq!(t.solar_unit_output_mw, 0.1);
        assert_eq!(t.wind_unit_output_mw, 0.4);
        assert_eq!(t.hysteresis, 0.0);
    }

    #[test]
    fn from_preset_unknown() {
        let err = MonitorConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in MonitorConfig::PRESETS {
            let cfg = MonitorConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
steps_per_day = 48
seed = 7

[monitor]
grid_name = "Moon Base"
mode = "advisory"
update_interval = 10
cycles = 12

[thresholds]
margin_factor = 2.0
surplus_factor = 1.1
target_recharge = 0.4
solar_unit_output_mw = 0.16
wind_unit_output_mw = 0.5
hysteresis = 0.05

[battery]
count = 6
capacity_mwh = 1.0
"#;
        let cfg = MonitorConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.monitor.mode), Some(MonitorMode::Advisory));
        assert_eq!(cfg.as_ref().map(|c| c.thresholds.margin_factor), Some(2.0));
        assert_eq!(cfg.as_ref().map(|c| c.battery.count), Some(6));
        // untouched fields keep their defaults
        assert_eq!(cfg.as_ref().map(|c| c.battery.max_rate_mw), Some(12.0));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[thresholds]
margin_factor = 1.5
bogus_field = true
"#;
        assert!(MonitorConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_zero_unit_output() {
        let mut cfg = MonitorConfig::baseline();
        cfg.thresholds.solar_unit_output_mw = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "thresholds.solar_unit_output_mw"));
    }

    #[test]
    fn validation_catches_nan_margin() {
        let mut cfg = MonitorConfig::baseline();
        cfg.thresholds.margin_factor = f64::NAN;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "thresholds.margin_factor"));
    }

    #[test]
    fn validation_catches_out_of_range_recharge() {
        let mut cfg = MonitorConfig::baseline();
        cfg.thresholds.target_recharge = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "thresholds.target_recharge"));
    }

    #[test]
    fn validation_catches_zero_interval() {
        let mut cfg = MonitorConfig::baseline();
        cfg.monitor.update_interval = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "monitor.update_interval"));
    }

    #[test]
    fn validation_catches_negative_device_parameters() {
        let mut cfg = MonitorConfig::baseline();
        cfg.load.base_mw = -1.0;
        cfg.load.noise_std = -0.1;
        cfg.solar.panel_peak_mw = -0.1;
        cfg.solar.noise_std = -0.1;
        cfg.wind.rated_mw = -0.4;
        cfg.wind.mean_wind = -0.5;
        cfg.wind.noise_std = f64::NAN;
        cfg.connector.noise_std = -0.1;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        for field in [
            "load.base_mw",
            "load.noise_std",
            "solar.panel_peak_mw",
            "solar.noise_std",
            "wind.rated_mw",
            "wind.mean_wind",
            "wind.noise_std",
            "connector.noise_std",
        ] {
            assert!(fields.iter().any(|f| f == field), "{field} not reported: {fields:?}");
        }
    }

    #[test]
    fn threshold_conversions_carry_values() {
        let t = ThresholdConfig {
            hysteresis: 0.1,
            ..ThresholdConfig::default()
        };
        assert_eq!(t.recommendation().solar_unit_output, Megawatts(0.1));
        assert_eq!(t.mode_thresholds().hysteresis, 0.1);
    }
}
