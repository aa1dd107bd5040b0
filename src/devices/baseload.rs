use rand::{SeedableRng, rngs::StdRng};

use crate::devices::types::gaussian_noise;
use crate::quantity::Megawatts;

/// The machinery demand of a simulated grid.
///
/// `BaseLoad` is a sinusoidal daily pattern with configurable baseline,
/// amplitude, phase, and Gaussian noise. It is not a power block itself; the
/// grid routes it through the docked connectors, where it reads as draw.
///
/// # Examples
///
/// ```
/// use power_monitor::devices::baseload::BaseLoad;
/// use power_monitor::quantity::Megawatts;
///
/// let mut load = BaseLoad::new(Megawatts(1.0), Megawatts(0.5), 0.0, 0.0, 24, 42);
/// assert!(load.demand(12) >= Megawatts::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLoad {
    /// Baseline demand.
    pub base: Megawatts,

    /// Amplitude of the sinusoidal variation.
    pub amp: Megawatts,

    /// Phase offset of the sinusoidal pattern in radians.
    pub phase_rad: f64,

    /// Standard deviation of the Gaussian noise (MW).
    pub noise_std: f64,

    pub steps_per_day: usize,

    rng: StdRng,
}

impl BaseLoad {
    pub fn new(
        base: Megawatts,
        amp: Megawatts,
        phase_rad: f64,
        noise_std: f64,
        steps_per_day: usize,
        seed: u64,
    ) -> Self {
        Self {
            base,
            amp,
            phase_rad,
            noise_std,
            steps_per_day: steps_per_day.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Demand at a time step; never negative.
    pub fn demand(&mut self, timestep: usize) -> Megawatts {
        let day_pos = (timestep % self.steps_per_day) as f64 / self.steps_per_day as f64; // [0,1)
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.phase_rad;
        let noise = Megawatts(gaussian_noise(&mut self.rng, self.noise_std));
        (self.base + self.amp * angle.sin() + noise).max(Megawatts::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_noise_free_profile_follows_sinus() {
        let mut load = BaseLoad::new(Megawatts(1.0), Megawatts(0.5), 0.0, 0.0, 4, 0);
        assert_abs_diff_eq!(load.demand(0).0, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(load.demand(1).0, 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(load.demand(3).0, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_demand_never_negative() {
        let mut load = BaseLoad::new(Megawatts(0.1), Megawatts(1.0), 0.0, 0.5, 24, 9);
        for t in 0..100 {
            assert!(load.demand(t) >= Megawatts::ZERO);
        }
    }
}
