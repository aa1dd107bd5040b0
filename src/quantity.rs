//! Typed power and energy quantities.
//!
//! Power (a flow rate) and energy (a stored amount) never mix: there is no
//! arithmetic between [`Megawatts`] and [`MegawattHours`] except the explicit
//! time integration in [`Megawatts::over_hours`].

use std::fmt::{self, Display, Formatter};
use std::ops::{Div, Mul};

use serde::{Deserialize, Serialize};

/// Instantaneous power flow in megawatts.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Megawatts(pub f64);

/// Stored energy in megawatt-hours.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct MegawattHours(pub f64);

impl Megawatts {
    pub const ZERO: Self = Self(0.0);

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn max(self, rhs: Self) -> Self {
        if rhs > self { rhs } else { self }
    }

    pub fn min(self, rhs: Self) -> Self {
        if rhs < self { rhs } else { self }
    }

    /// Energy delivered by this flow sustained for `hours`.
    pub fn over_hours(self, hours: f64) -> MegawattHours {
        MegawattHours(self.0 * hours)
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl MegawattHours {
    pub const ZERO: Self = Self(0.0);

    pub fn max(self, rhs: Self) -> Self {
        if rhs > self { rhs } else { self }
    }

    pub fn min(self, rhs: Self) -> Self {
        if rhs < self { rhs } else { self }
    }

    /// Flow that moves this energy in `hours`.
    pub fn per_hours(self, hours: f64) -> Megawatts {
        Megawatts(self.0 / hours)
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Mul<f64> for Megawatts {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Megawatts {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self(self.0 / rhs)
    }
}

/// Dimensionless ratio of two flows.
impl Div for Megawatts {
    type Output = f64;

    fn div(self, rhs: Self) -> f64 {
        self.0 / rhs.0
    }
}

impl Mul<f64> for MegawattHours {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

/// Dimensionless ratio of two energies, e.g. stored over capacity.
impl Div for MegawattHours {
    type Output = f64;

    fn div(self, rhs: Self) -> f64 {
        self.0 / rhs.0
    }
}

impl Display for Megawatts {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        write!(f, "{:.*}MW", precision, self.0)
    }
}

impl Display for MegawattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(0);
        write!(f, "{:.*}MWh", precision, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_of_flows() {
        let total: Megawatts = [1.0, -0.5, 2.0].into_iter().map(Megawatts).sum();
        assert_eq!(total, Megawatts(2.5));
    }

    #[test]
    fn energy_ratio_is_dimensionless() {
        assert_eq!(MegawattHours(1.0) / MegawattHours(4.0), 0.25);
    }

    #[test]
    fn time_integration_round_trips() {
        let energy = Megawatts(2.0).over_hours(0.5);
        assert_eq!(energy, MegawattHours(1.0));
        assert_eq!(energy.per_hours(0.5), Megawatts(2.0));
    }

    #[test]
    fn display_uses_requested_precision() {
        assert_eq!(format!("{}", Megawatts(1.234)), "1.23MW");
        assert_eq!(format!("{:.1}", Megawatts(1.26)), "1.3MW");
        assert_eq!(format!("{}", MegawattHours(12.6)), "13MWh");
    }
}
