//! Capacity planning: how much generation the grid should add.

use serde::Serialize;

use crate::quantity::Megawatts;

/// Sizing constants for the recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecommendationConfig {
    /// Multiplier applied to peak load to size daytime generation.
    pub margin_factor: f64,
    /// Output of one additional solar panel.
    pub solar_unit_output: Megawatts,
    /// Output of one additional wind turbine.
    pub wind_unit_output: Megawatts,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            margin_factor: 1.5,
            solar_unit_output: Megawatts(0.1),
            wind_unit_output: Megawatts(0.4),
        }
    }
}

/// Suggested additions for one cycle.
///
/// Solar is sized to carry the peak with margin during the day; wind is sized
/// to carry the bare peak at night, when solar produces nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendation {
    pub current_day_power: Megawatts,
    pub target_day_power: Megawatts,
    pub solar_units_to_add: u32,
    pub current_wind_count: usize,
    pub wind_units_needed: u32,
    pub wind_units_to_add: u32,
    /// Night output of the target wind fleet.
    pub target_night_power: Megawatts,
}

impl Recommendation {
    /// Sizes the solar and wind fleets against the current peak load.
    ///
    /// Stateless: the same inputs always produce the same recommendation.
    ///
    /// # Examples
    ///
    /// ```
    /// use power_monitor::monitor::recommendation::{Recommendation, RecommendationConfig};
    /// use power_monitor::quantity::Megawatts;
    ///
    /// let rec = Recommendation::compute(
    ///     Megawatts(2.0),
    ///     Megawatts(1.0),
    ///     0,
    ///     &RecommendationConfig::default(),
    /// );
    /// assert_eq!(rec.target_day_power, Megawatts(3.0));
    /// assert_eq!(rec.solar_units_to_add, 20);
    /// ```
    pub fn compute(
        peak_load: Megawatts,
        current_solar: Megawatts,
        current_wind_count: usize,
        config: &RecommendationConfig,
    ) -> Self {
        let target_day_power = peak_load * config.margin_factor;
        let solar_units_to_add =
            units_for(target_day_power - current_solar, config.solar_unit_output);
        let wind_units_needed = units_for(peak_load, config.wind_unit_output);
        let current_wind = u32::try_from(current_wind_count).unwrap_or(u32::MAX);

        Self {
            current_day_power: current_solar,
            target_day_power,
            solar_units_to_add,
            current_wind_count,
            wind_units_needed,
            wind_units_to_add: wind_units_needed.saturating_sub(current_wind),
            target_night_power: config.wind_unit_output * f64::from(wind_units_needed),
        }
    }
}

/// Whole units of `unit` needed to cover `shortfall`; zero when there is none.
fn units_for(shortfall: Megawatts, unit: Megawatts) -> u32 {
    if !(shortfall > Megawatts::ZERO && unit > Megawatts::ZERO) {
        return 0;
    }
    // trim float noise so 19.999999999 units stays 20
    let quotient = ((shortfall / unit) * 1e9).round() / 1e9;
    // saturating float-to-int cast
    quotient.ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(peak: f64, solar: f64, wind_count: usize) -> Recommendation {
        Recommendation::compute(
            Megawatts(peak),
            Megawatts(solar),
            wind_count,
            &RecommendationConfig::default(),
        )
    }

    #[test]
    fn sizes_solar_against_margin() {
        let rec = compute(2.0, 1.0, 0);
        assert_eq!(rec.target_day_power, Megawatts(3.0));
        assert_eq!(rec.current_day_power, Megawatts(1.0));
        assert_eq!(rec.solar_units_to_add, 20);
    }

    #[test]
    fn sizes_wind_against_bare_peak() {
        let rec = compute(1.2, 0.0, 1);
        assert_eq!(rec.wind_units_needed, 3);
        assert_eq!(rec.wind_units_to_add, 2);
        assert_eq!(rec.current_wind_count, 1);
    }

    #[test]
    fn zero_peak_needs_nothing() {
        let rec = compute(0.0, 0.0, 0);
        assert_eq!(rec.solar_units_to_add, 0);
        assert_eq!(rec.wind_units_needed, 0);
        assert_eq!(rec.wind_units_to_add, 0);
        assert_eq!(rec.target_night_power, Megawatts::ZERO);
    }

    #[test]
    fn excess_fleet_adds_nothing() {
        let rec = compute(0.4, 5.0, 10);
        assert_eq!(rec.solar_units_to_add, 0);
        assert_eq!(rec.wind_units_needed, 1);
        assert_eq!(rec.wind_units_to_add, 0);
    }

    #[test]
    fn partial_units_round_up() {
        let rec = compute(0.41, 0.0, 0);
        assert_eq!(rec.wind_units_needed, 2);
        // 0.615 / 0.1 = 6.15
        assert_eq!(rec.solar_units_to_add, 7);
    }

    #[test]
    fn solar_units_non_decreasing_in_peak() {
        let mut previous = 0;
        for step in 0..200 {
            let rec = compute(f64::from(step) * 0.05, 1.0, 2);
            assert!(rec.solar_units_to_add >= previous);
            previous = rec.solar_units_to_add;
        }
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(compute(1.7, 0.3, 1), compute(1.7, 0.3, 1));
    }

    #[test]
    fn target_night_power_covers_needed_fleet() {
        let rec = compute(1.2, 0.0, 0);
        assert!((rec.target_night_power.0 - 1.2).abs() < 1e-9);
    }
}
