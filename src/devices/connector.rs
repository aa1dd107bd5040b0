use rand::{SeedableRng, rngs::StdRng};

use crate::devices::types::{
    ConnectorStatus, Device, DeviceContext, DeviceSample, PowerBlock, gaussian_noise,
};
use crate::quantity::Megawatts;

/// A docking connector feeding a docked ship.
///
/// Docked ships run the structure's machinery, so a connected connector draws
/// its share of the machinery load plus the ship's own noisy demand. Output
/// follows the block convention: negative while power leaves the grid through
/// the dock.
#[derive(Debug, Clone)]
pub struct Connector {
    pub name: String,
    pub status: ConnectorStatus,

    /// Mean draw of the docked ship on top of its machinery share.
    pub ship_draw: Megawatts,

    /// Standard deviation of the ship draw noise (MW).
    pub noise_std: f64,

    /// `false` once the handle is lost. Power still flows; the monitor just
    /// cannot read it.
    pub attached: bool,

    output: Megawatts,
    rng: StdRng,
}

impl Connector {
    pub fn new(
        name: impl Into<String>,
        status: ConnectorStatus,
        ship_draw: Megawatts,
        noise_std: f64,
        seed: u64,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            ship_draw,
            noise_std: noise_std.max(0.0),
            attached: true,
            output: Megawatts::ZERO,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn is_docked(&self) -> bool {
        self.status == ConnectorStatus::Connected
    }
}

impl Device for Connector {
    /// The setpoint is the machinery load routed through this dock.
    fn step(&mut self, context: &DeviceContext) -> Megawatts {
        self.output = if self.is_docked() {
            let routed = context.setpoint.unwrap_or(Megawatts::ZERO);
            let ship = self.ship_draw + Megawatts(gaussian_noise(&mut self.rng, self.noise_std));
            -(routed + ship)
        } else {
            Megawatts::ZERO
        };
        self.output
    }

    fn device_type(&self) -> &'static str {
        "Connector"
    }
}

impl PowerBlock for Connector {
    fn sample(&self) -> Option<DeviceSample> {
        self.attached
            .then(|| DeviceSample::connector(self.name.clone(), self.output, self.status))
    }
}
