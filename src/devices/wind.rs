//! Wind turbine with temporally correlated wind speed (AR(1) process).

use rand::{SeedableRng, rngs::StdRng};

use crate::devices::types::{
    Device, DeviceContext, DeviceKind, DeviceSample, PowerBlock, gaussian_noise,
};
use crate::quantity::Megawatts;

/// Minimum relative wind speed (dead calm).
const WIND_MIN: f64 = 0.0;
/// Maximum relative wind speed (gusts above rated).
const WIND_MAX: f64 = 1.3;

/// A wind turbine whose relative wind speed follows a mean-reverting AR(1)
/// process:
/// ```text
/// w(t) = alpha * w(t-1) + (1 - alpha) * mean + epsilon(t)
/// ```
/// Output is the rated power times the wind, capped at rated.
#[derive(Debug, Clone)]
pub struct WindTurbine {
    pub name: String,

    /// Output at or above rated wind.
    pub rated: Megawatts,

    /// Long-run mean of the relative wind speed.
    pub mean_wind: f64,

    /// AR(1) correlation coefficient (0.0 = uncorrelated, 1.0 = fully persistent).
    pub alpha: f64,

    /// Standard deviation of the AR(1) innovation noise.
    pub noise_std: f64,

    pub functional: bool,

    wind: f64,
    output: Megawatts,
    rng: StdRng,
}

impl WindTurbine {
    pub fn new(
        name: impl Into<String>,
        rated: Megawatts,
        mean_wind: f64,
        alpha: f64,
        noise_std: f64,
        seed: u64,
    ) -> Self {
        let mean_wind = mean_wind.clamp(WIND_MIN, WIND_MAX);
        Self {
            name: name.into(),
            rated: rated.max(Megawatts::ZERO),
            mean_wind,
            alpha: alpha.clamp(0.0, 1.0),
            noise_std: noise_std.max(0.0),
            functional: true,
            wind: mean_wind,
            output: Megawatts::ZERO,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Advances the AR(1) wind by one step and returns the new value.
    fn advance_wind(&mut self) -> f64 {
        let epsilon = gaussian_noise(&mut self.rng, self.noise_std);
        self.wind = self.alpha * self.wind + (1.0 - self.alpha) * self.mean_wind + epsilon;
        self.wind = self.wind.clamp(WIND_MIN, WIND_MAX);
        self.wind
    }
}

impl Device for WindTurbine {
    /// The wind evolves every step, even for a broken turbine, so repairs
    /// resume from a correlated state.
    fn step(&mut self, _context: &DeviceContext) -> Megawatts {
        let wind = self.advance_wind();
        self.output = if self.functional {
            self.rated * wind.min(1.0)
        } else {
            Megawatts::ZERO
        };
        self.output
    }

    fn device_type(&self) -> &'static str {
        "Wind"
    }
}

impl PowerBlock for WindTurbine {
    fn sample(&self) -> Option<DeviceSample> {
        let sample = DeviceSample::generator(DeviceKind::Wind, self.name.clone(), self.output);
        Some(sample.with_functional(self.functional))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_output_bounded_by_rating() {
        let mut turbine = WindTurbine::new("Wind 1", Megawatts(0.4), 0.9, 0.5, 0.5, 3);
        for t in 0..200 {
            let out = turbine.step(&DeviceContext::new(t));
            assert!(out >= Megawatts::ZERO && out <= Megawatts(0.4), "t={t} out={out}");
        }
    }

    #[test]
    fn test_calm_noise_free_turbine_holds_mean() {
        let mut turbine = WindTurbine::new("Wind 1", Megawatts(0.4), 0.5, 0.9, 0.0, 3);
        for t in 0..10 {
            let out = turbine.step(&DeviceContext::new(t));
            assert_abs_diff_eq!(out.0, 0.2, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_broken_turbine_produces_nothing() {
        let mut turbine = WindTurbine::new("Wind 1", Megawatts(0.4), 0.5, 0.9, 0.0, 3);
        turbine.functional = false;
        assert_eq!(turbine.step(&DeviceContext::new(0)), Megawatts::ZERO);
    }
}
