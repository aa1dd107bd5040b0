use rand::{SeedableRng, rngs::StdRng};

use crate::devices::types::{
    Device, DeviceContext, DeviceKind, DeviceSample, PowerBlock, daylight_frac, gaussian_noise,
};
use crate::quantity::Megawatts;

/// A solar panel producing a half-cosine profile between sunrise and sunset.
///
/// Output is the panel peak scaled by the daylight fraction, with Gaussian
/// noise standing in for weather. Zero at night.
#[derive(Debug, Clone)]
pub struct SolarPanel {
    pub name: String,

    /// Output under ideal conditions.
    pub peak: Megawatts,

    /// Number of time steps per simulated day.
    steps_per_day: usize,

    /// Time step index when sunrise occurs (inclusive).
    pub sunrise_idx: usize,

    /// Time step index when sunset occurs (exclusive).
    pub sunset_idx: usize,

    /// Standard deviation of the noise as a fraction of output.
    pub noise_std: f64,

    pub functional: bool,

    output: Megawatts,
    rng: StdRng,
}

impl SolarPanel {
    /// Creates a new solar panel.
    ///
    /// # Panics
    ///
    /// Panics if `sunrise_idx >= sunset_idx` or `sunset_idx > steps_per_day`.
    pub fn new(
        name: impl Into<String>,
        peak: Megawatts,
        steps_per_day: usize,
        sunrise_idx: usize,
        sunset_idx: usize,
        noise_std: f64,
        seed: u64,
    ) -> Self {
        assert!(sunrise_idx < sunset_idx && sunset_idx <= steps_per_day);
        Self {
            name: name.into(),
            peak: peak.max(Megawatts::ZERO),
            steps_per_day,
            sunrise_idx,
            sunset_idx,
            noise_std: noise_std.max(0.0),
            functional: true,
            output: Megawatts::ZERO,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Device for SolarPanel {
    fn step(&mut self, context: &DeviceContext) -> Megawatts {
        let frac = daylight_frac(
            context.timestep,
            self.steps_per_day,
            self.sunrise_idx,
            self.sunset_idx,
        );
        self.output = if frac <= 0.0 || !self.functional {
            Megawatts::ZERO
        } else {
            let noise_mult = 1.0 + gaussian_noise(&mut self.rng, self.noise_std);
            (self.peak * (frac * noise_mult)).max(Megawatts::ZERO).min(self.peak)
        };
        self.output
    }

    fn device_type(&self) -> &'static str {
        "Solar"
    }
}

impl PowerBlock for SolarPanel {
    fn sample(&self) -> Option<DeviceSample> {
        let sample = DeviceSample::generator(DeviceKind::Solar, self.name.clone(), self.output);
        Some(sample.with_functional(self.functional))
    }
}
