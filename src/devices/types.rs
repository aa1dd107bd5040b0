//! Telemetry samples and the traits that produce them.

use std::fmt;

use rand::{Rng, rngs::StdRng};
use serde::Serialize;

use crate::quantity::{MegawattHours, Megawatts};

/// Kind of power block on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DeviceKind {
    Battery,
    Solar,
    Wind,
    Reactor,
    Connector,
}

impl DeviceKind {
    pub const ALL: [Self; 5] = [
        Self::Battery,
        Self::Solar,
        Self::Wind,
        Self::Reactor,
        Self::Connector,
    ];

    /// Whether the kind produces power rather than storing or relaying it.
    pub fn is_generation(self) -> bool {
        matches!(self, Self::Solar | Self::Wind | Self::Reactor)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Battery => "Battery",
            Self::Solar => "Solar",
            Self::Wind => "Wind",
            Self::Reactor => "Reactor",
            Self::Connector => "Connector",
        };
        f.write_str(name)
    }
}

/// Battery charge direction as reported by the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ChargeState {
    Charging,
    Discharging,
    #[default]
    Idle,
}

/// Docking state of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectorStatus {
    Connected,
    Connectable,
    Unconnected,
}

impl fmt::Display for ConnectorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connected => "Connected",
            Self::Connectable => "Connectable",
            Self::Unconnected => "Unconnected",
        };
        f.write_str(name)
    }
}

/// One reading of one power block, taken during a single evaluation cycle.
///
/// # Power Flow Convention
/// `output` is positive when the block exports/produces and negative when it
/// imports/consumes. It is a flow rate and never combines with the stored
/// energy fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSample {
    pub kind: DeviceKind,
    pub name: String,
    /// Maximum stored energy (batteries only).
    pub capacity: Option<MegawattHours>,
    /// Current stored energy (batteries only).
    pub stored: Option<MegawattHours>,
    pub output: Megawatts,
    pub functional: bool,
    /// Charge direction (batteries only).
    pub charge_state: Option<ChargeState>,
    /// Docking state (connectors only).
    pub connector_status: Option<ConnectorStatus>,
}

impl DeviceSample {
    /// Battery reading. `stored` is clamped into `[0, capacity]`.
    pub fn battery(
        name: impl Into<String>,
        capacity: MegawattHours,
        stored: MegawattHours,
        output: Megawatts,
        charge_state: ChargeState,
    ) -> Self {
        let capacity = capacity.max(MegawattHours::ZERO);
        Self {
            kind: DeviceKind::Battery,
            name: name.into(),
            capacity: Some(capacity),
            stored: Some(stored.max(MegawattHours::ZERO).min(capacity)),
            output,
            functional: true,
            charge_state: Some(charge_state),
            connector_status: None,
        }
    }

    /// Solar, wind or reactor reading.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is not a generation kind.
    pub fn generator(kind: DeviceKind, name: impl Into<String>, output: Megawatts) -> Self {
        assert!(kind.is_generation(), "{kind} is not a generation kind");
        Self {
            kind,
            name: name.into(),
            capacity: None,
            stored: None,
            output,
            functional: true,
            charge_state: None,
            connector_status: None,
        }
    }

    /// Connector reading; positive flow exports out of the grid.
    pub fn connector(name: impl Into<String>, output: Megawatts, status: ConnectorStatus) -> Self {
        Self {
            kind: DeviceKind::Connector,
            name: name.into(),
            capacity: None,
            stored: None,
            output,
            functional: true,
            charge_state: None,
            connector_status: Some(status),
        }
    }

    /// Marks the sample as (non-)functional.
    pub fn with_functional(mut self, functional: bool) -> Self {
        self.functional = functional;
        self
    }

    /// Power pulled from the grid by this block (`max(0, -output)`).
    pub fn draw(&self) -> Megawatts {
        (-self.output).max(Megawatts::ZERO)
    }

    pub fn is_discharging(&self) -> bool {
        self.charge_state == Some(ChargeState::Discharging)
    }

    pub fn is_charging(&self) -> bool {
        self.charge_state == Some(ChargeState::Charging)
    }
}

/// Read-only handle to one power block on the structure.
///
/// Handles come from the grid's discovery collaborator already filtered to the
/// structure of interest.
pub trait PowerBlock {
    /// Reads the block. `None` means the handle is no longer available; the
    /// block is then skipped and contributes nothing to any total.
    fn sample(&self) -> Option<DeviceSample>;
}

impl PowerBlock for DeviceSample {
    fn sample(&self) -> Option<DeviceSample> {
        Some(self.clone())
    }
}

/// Contextual information passed to simulated devices each step.
/// # Fields
/// * `timestep` - Current simulation timestep
/// * `setpoint` - Optional power setpoint for controllable devices
pub struct DeviceContext {
    pub timestep: usize,
    pub setpoint: Option<Megawatts>,
}

impl DeviceContext {
    /// Creates a new DeviceContext with the given timestep and no setpoint.
    pub fn new(timestep: usize) -> Self {
        Self {
            timestep,
            setpoint: None,
        }
    }

    /// Creates a new DeviceContext with the given timestep and setpoint.
    pub fn with_setpoint(timestep: usize, setpoint: Megawatts) -> Self {
        Self {
            timestep,
            setpoint: Some(setpoint),
        }
    }
}

/// A simulated block whose output evolves over time.
pub trait Device {
    /// Advances the block by one timestep and returns its output in the
    /// block convention (positive = export into the grid).
    fn step(&mut self, context: &DeviceContext) -> Megawatts;

    /// Returns a human-readable type name for the device.
    fn device_type(&self) -> &'static str;
}

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified standard deviation
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Fraction of peak daylight at timestep `t`, a half-cosine between sunrise
/// (inclusive) and sunset (exclusive), zero at night. Wraps every day.
pub fn daylight_frac(t: usize, steps_per_day: usize, sunrise_idx: usize, sunset_idx: usize) -> f64 {
    let t = t % steps_per_day;
    if t < sunrise_idx || t >= sunset_idx {
        return 0.0;
    }
    let span = (sunset_idx - sunrise_idx) as f64;
    let x = (t - sunrise_idx) as f64 + 0.5;
    (std::f64::consts::PI * x / span).sin().max(0.0)
}
