use crate::devices::types::{ChargeState, Device, DeviceContext, DeviceSample, PowerBlock};
use crate::quantity::{MegawattHours, Megawatts};

/// A battery bank that absorbs surplus and covers deficits on the grid.
///
/// # Power Flow Convention
/// - Positive setpoint/output: discharging (export into the grid)
/// - Negative setpoint/output: charging (import from the grid)
#[derive(Debug, Clone)]
pub struct BatteryBank {
    pub name: String,

    /// Maximum stored energy.
    pub capacity: MegawattHours,

    /// Current stored energy.
    pub stored: MegawattHours,

    /// Maximum charge and discharge rate (positive value).
    pub max_rate: Megawatts,

    /// Charging efficiency (0..1.0).
    pub efficiency: f64,

    /// Whether the bank may exchange power at all.
    pub enabled: bool,

    /// Whether the block is built and undamaged.
    pub functional: bool,

    /// Output of the last step.
    output: Megawatts,

    /// Duration of one timestep in hours.
    dt_hours: f64,
}

impl BatteryBank {
    /// Creates a new battery bank.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name of the block
    /// * `capacity` - Maximum stored energy (must be > 0)
    /// * `charge` - Initial charge as a fraction (0.0 to 1.0)
    /// * `max_rate` - Maximum charge/discharge rate
    /// * `efficiency` - Charging efficiency (0..1.0)
    /// * `dt_hours` - Duration of one timestep in hours
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero/negative, charge out of range, or efficiency invalid.
    pub fn new(
        name: impl Into<String>,
        capacity: MegawattHours,
        charge: f64,
        max_rate: Megawatts,
        efficiency: f64,
        dt_hours: f64,
    ) -> Self {
        assert!(capacity > MegawattHours::ZERO);
        assert!((0.0..=1.0).contains(&charge));
        assert!(max_rate >= Megawatts::ZERO);
        assert!(efficiency > 0.0 && efficiency <= 1.0);

        Self {
            name: name.into(),
            capacity,
            stored: capacity * charge,
            max_rate,
            efficiency,
            enabled: true,
            functional: true,
            output: Megawatts::ZERO,
            dt_hours,
        }
    }

    /// Fraction of capacity currently stored.
    pub fn charge(&self) -> f64 {
        self.stored / self.capacity
    }

    pub fn output(&self) -> Megawatts {
        self.output
    }

    pub fn charge_state(&self) -> ChargeState {
        if self.output > Megawatts::ZERO {
            ChargeState::Discharging
        } else if self.output < Megawatts::ZERO {
            ChargeState::Charging
        } else {
            ChargeState::Idle
        }
    }
}

impl Device for BatteryBank {
    /// Applies the setpoint within rate and storage limits and returns the
    /// actual flow.
    fn step(&mut self, context: &DeviceContext) -> Megawatts {
        if !self.enabled || !self.functional {
            self.output = Megawatts::ZERO;
            return self.output;
        }

        let setpoint = context.setpoint.unwrap_or(Megawatts::ZERO);
        let cmd = setpoint.min(self.max_rate).max(-self.max_rate);

        self.output = if cmd > Megawatts::ZERO {
            // Discharging: limit by stored energy
            let available = self.stored.per_hours(self.dt_hours);
            let actual = cmd.min(available);
            self.stored = (self.stored - actual.over_hours(self.dt_hours)).max(MegawattHours::ZERO);
            actual
        } else if cmd < Megawatts::ZERO {
            // Charging: limit by remaining room
            let room = (self.capacity - self.stored).per_hours(self.dt_hours) / self.efficiency;
            let actual = (-cmd).min(room.max(Megawatts::ZERO));
            let gained = actual.over_hours(self.dt_hours) * self.efficiency;
            self.stored = (self.stored + gained).min(self.capacity);
            -actual
        } else {
            Megawatts::ZERO
        };
        self.output
    }

    fn device_type(&self) -> &'static str {
        "Battery"
    }
}

impl PowerBlock for BatteryBank {
    fn sample(&self) -> Option<DeviceSample> {
        let sample = DeviceSample::battery(
            self.name.clone(),
            self.capacity,
            self.stored,
            self.output,
            self.charge_state(),
        );
        Some(sample.with_functional(self.functional))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn bank(charge: f64) -> BatteryBank {
        BatteryBank::new(
            "Battery 1",
            MegawattHours(3.0),
            charge,
            Megawatts(12.0),
            1.0,
            1.0,
        )
    }

    #[test]
    #[should_panic]
    fn test_invalid_capacity() {
        BatteryBank::new("B", MegawattHours(0.0), 0.5, Megawatts(1.0), 1.0, 1.0);
    }

    #[test]
    #[should_panic]
    fn test_invalid_charge() {
        BatteryBank::new("B", MegawattHours(3.0), 1.1, Megawatts(1.0), 1.0, 1.0);
    }

    #[test]
    fn test_discharge_limited_by_stored_energy() {
        // 10% of 3MWh = 0.3MWh available over a 1h step
        let mut battery = bank(0.1);
        let actual = battery.step(&DeviceContext::with_setpoint(0, Megawatts(5.0)));
        assert_abs_diff_eq!(actual.0, 0.3, epsilon = 1e-9);
        assert_abs_diff_eq!(battery.stored.0, 0.0, epsilon = 1e-9);
        assert_eq!(battery.charge_state(), ChargeState::Discharging);
    }

    #[test]
    fn test_charge_limited_by_room() {
        let mut battery = bank(0.9);
        let actual = battery.step(&DeviceContext::with_setpoint(0, Megawatts(-5.0)));
        assert_abs_diff_eq!(actual.0, -0.3, epsilon = 1e-9);
        assert_abs_diff_eq!(battery.charge(), 1.0, epsilon = 1e-9);
        assert_eq!(battery.charge_state(), ChargeState::Charging);
    }

    #[test]
    fn test_rate_limit() {
        let mut battery = BatteryBank::new("B", MegawattHours(30.0), 0.5, Megawatts(2.0), 1.0, 1.0);
        let actual = battery.step(&DeviceContext::with_setpoint(0, Megawatts(10.0)));
        assert_eq!(actual, Megawatts(2.0));
    }

    #[test]
    fn test_efficiency_charge() {
        let mut battery = BatteryBank::new("B", MegawattHours(3.0), 0.0, Megawatts(12.0), 0.8, 1.0);
        battery.step(&DeviceContext::with_setpoint(0, Megawatts(-1.0)));
        assert_abs_diff_eq!(battery.stored.0, 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_disabled_bank_is_idle() {
        let mut battery = bank(0.5);
        battery.enabled = false;
        let actual = battery.step(&DeviceContext::with_setpoint(0, Megawatts(1.0)));
        assert_eq!(actual, Megawatts::ZERO);
        assert_eq!(battery.charge_state(), ChargeState::Idle);
    }

    #[test]
    fn test_sample_reports_storage_and_flow_separately() {
        let mut battery = bank(0.5);
        battery.step(&DeviceContext::with_setpoint(0, Megawatts(1.0)));
        let sample = battery.sample().unwrap();
        assert_eq!(sample.output, Megawatts(1.0));
        assert_abs_diff_eq!(sample.stored.unwrap().0, 0.5, epsilon = 1e-9);
        assert_eq!(sample.capacity, Some(MegawattHours(3.0)));
        assert!(sample.is_discharging());
    }
}
