use crate::devices::types::{Device, DeviceContext, DeviceKind, DeviceSample, PowerBlock};
use crate::quantity::Megawatts;

/// A dispatchable reactor that follows the requested setpoint up to its rating
/// while enabled.
///
/// The reactor reports itself functional only while it is both enabled and
/// operational, so disabled reactors drop out of the active count.
#[derive(Debug, Clone)]
pub struct Reactor {
    pub name: String,

    /// Maximum output.
    pub rating: Megawatts,

    /// Toggled by actuation.
    pub enabled: bool,

    /// Built, fuelled and undamaged.
    pub operational: bool,

    output: Megawatts,
}

impl Reactor {
    pub fn new(name: impl Into<String>, rating: Megawatts) -> Self {
        Self {
            name: name.into(),
            rating: rating.max(Megawatts::ZERO),
            enabled: true,
            operational: true,
            output: Megawatts::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled && self.operational
    }
}

impl Device for Reactor {
    fn step(&mut self, context: &DeviceContext) -> Megawatts {
        self.output = if self.is_active() {
            context
                .setpoint
                .unwrap_or(Megawatts::ZERO)
                .max(Megawatts::ZERO)
                .min(self.rating)
        } else {
            Megawatts::ZERO
        };
        self.output
    }

    fn device_type(&self) -> &'static str {
        "Reactor"
    }
}

impl PowerBlock for Reactor {
    fn sample(&self) -> Option<DeviceSample> {
        let sample = DeviceSample::generator(DeviceKind::Reactor, self.name.clone(), self.output);
        Some(sample.with_functional(self.is_active()))
    }
}
