//! Per-cycle snapshot of the grid and the totals derived from it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::devices::types::{DeviceKind, DeviceSample, PowerBlock};
use crate::quantity::{MegawattHours, Megawatts};

/// Immutable view of every readable block for one evaluation cycle, grouped
/// by kind in discovery order.
///
/// Built once per cycle and never updated; the next cycle captures a new one.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    samples: BTreeMap<DeviceKind, Vec<DeviceSample>>,
}

impl Snapshot {
    /// Reads every handle once. Handles that return nothing are skipped.
    pub fn capture<'a>(blocks: impl IntoIterator<Item = &'a dyn PowerBlock>) -> Self {
        Self::from_samples(blocks.into_iter().filter_map(|block| block.sample()))
    }

    pub fn from_samples(samples: impl IntoIterator<Item = DeviceSample>) -> Self {
        let mut grouped: BTreeMap<DeviceKind, Vec<DeviceSample>> = BTreeMap::new();
        for sample in samples {
            grouped.entry(sample.kind).or_default().push(sample);
        }
        Self { samples: grouped }
    }

    /// Samples of one kind, in discovery order.
    pub fn of_kind(&self, kind: DeviceKind) -> &[DeviceSample] {
        self.samples.get(&kind).map_or(&[], Vec::as_slice)
    }

    pub fn count(&self, kind: DeviceKind) -> usize {
        self.of_kind(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.values().all(Vec::is_empty)
    }
}

/// Grid-wide totals for one cycle.
///
/// Energy fields (`total_capacity`, `total_stored`) and power fields never
/// mix; `charge_percent` is the only quantity derived from energy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateMetrics {
    pub total_capacity: MegawattHours,
    pub total_stored: MegawattHours,
    /// Stored over capacity as a fraction in [0, 1]; 0 without capacity.
    pub charge_percent: f64,
    /// Sum of |output| over discharging batteries.
    pub peak_load: Megawatts,
    /// Sum of output over generation blocks.
    pub production_total: Megawatts,
    /// Sum of draw over batteries and connectors.
    pub consumption_total: Megawatts,
    pub charging_count: usize,
    pub discharging_count: usize,

    pub solar_production: Megawatts,
    pub wind_production: Megawatts,
    pub reactor_production: Megawatts,

    /// Raw block counts, functional or not.
    pub battery_count: usize,
    pub solar_count: usize,
    pub wind_count: usize,
    pub reactor_count: usize,
    pub connector_count: usize,
    /// Reactors that are enabled and operational.
    pub active_reactor_count: usize,
}

impl AggregateMetrics {
    /// Whether every derived value is a finite number.
    pub fn is_finite(&self) -> bool {
        self.total_capacity.is_finite()
            && self.total_stored.is_finite()
            && self.charge_percent.is_finite()
            && self.peak_load.is_finite()
            && self.production_total.is_finite()
            && self.consumption_total.is_finite()
    }
}

/// Reduces a snapshot into grid-wide totals.
///
/// Non-functional blocks are ignored in every sum. Generation blocks add their
/// signed output to production; batteries and connectors add their draw to
/// consumption. The two are never netted against each other.
pub fn aggregate(snapshot: &Snapshot) -> AggregateMetrics {
    let functional = |kind| snapshot.of_kind(kind).iter().filter(|s| s.functional);
    let production_of = |kind| functional(kind).map(|s| s.output).sum::<Megawatts>();

    let mut metrics = AggregateMetrics {
        battery_count: snapshot.count(DeviceKind::Battery),
        solar_count: snapshot.count(DeviceKind::Solar),
        wind_count: snapshot.count(DeviceKind::Wind),
        reactor_count: snapshot.count(DeviceKind::Reactor),
        connector_count: snapshot.count(DeviceKind::Connector),
        active_reactor_count: functional(DeviceKind::Reactor).count(),
        solar_production: production_of(DeviceKind::Solar),
        wind_production: production_of(DeviceKind::Wind),
        reactor_production: production_of(DeviceKind::Reactor),
        ..AggregateMetrics::default()
    };
    metrics.production_total =
        metrics.solar_production + metrics.wind_production + metrics.reactor_production;

    for battery in functional(DeviceKind::Battery) {
        metrics.total_capacity += battery.capacity.unwrap_or_default();
        metrics.total_stored += battery.stored.unwrap_or_default();
        if battery.is_charging() {
            metrics.charging_count += 1;
        } else if battery.is_discharging() {
            metrics.discharging_count += 1;
            metrics.peak_load += battery.output.abs();
        }
    }

    metrics.consumption_total = DeviceKind::ALL
        .into_iter()
        .filter(|kind| !kind.is_generation())
        .flat_map(functional)
        .map(DeviceSample::draw)
        .sum();

    metrics.charge_percent = if metrics.total_capacity > MegawattHours::ZERO {
        metrics.total_stored / metrics.total_capacity
    } else {
        0.0
    };

    metrics
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::devices::types::{ChargeState, ConnectorStatus};

    fn battery(stored: f64, output: f64, state: ChargeState) -> DeviceSample {
        DeviceSample::battery(
            "Battery",
            MegawattHours(3.0),
            MegawattHours(stored),
            Megawatts(output),
            state,
        )
    }

    #[test]
    fn empty_snapshot_yields_zero_totals() {
        let metrics = aggregate(&Snapshot::default());
        assert_eq!(metrics, AggregateMetrics::default());
        assert_eq!(metrics.charge_percent, 0.0);
    }

    #[test]
    fn batteries_sum_storage_and_discharge() {
        let snapshot = Snapshot::from_samples([
            battery(1.5, 0.8, ChargeState::Discharging),
            battery(3.0, -0.2, ChargeState::Charging),
            battery(0.0, 0.0, ChargeState::Idle),
        ]);
        let m = aggregate(&snapshot);
        assert_eq!(m.battery_count, 3);
        assert_eq!(m.total_capacity, MegawattHours(9.0));
        assert_eq!(m.total_stored, MegawattHours(4.5));
        assert_abs_diff_eq!(m.charge_percent, 0.5);
        assert_eq!(m.peak_load, Megawatts(0.8));
        assert_eq!(m.charging_count, 1);
        assert_eq!(m.discharging_count, 1);
        assert_eq!(m.consumption_total, Megawatts(0.2));
    }

    #[test]
    fn non_functional_blocks_are_ignored() {
        let snapshot = Snapshot::from_samples([
            battery(3.0, 1.0, ChargeState::Discharging).with_functional(false),
            DeviceSample::generator(DeviceKind::Solar, "S", Megawatts(0.1)).with_functional(false),
            DeviceSample::generator(DeviceKind::Wind, "W", Megawatts(0.3)),
        ]);
        let m = aggregate(&snapshot);
        assert_eq!(m.battery_count, 1);
        assert_eq!(m.total_capacity, MegawattHours::ZERO);
        assert_eq!(m.charge_percent, 0.0);
        assert_eq!(m.peak_load, Megawatts::ZERO);
        assert_eq!(m.solar_count, 1);
        assert_eq!(m.solar_production, Megawatts::ZERO);
        assert_eq!(m.production_total, Megawatts(0.3));
    }

    #[test]
    fn production_and_consumption_are_independent() {
        let snapshot = Snapshot::from_samples([
            DeviceSample::generator(DeviceKind::Solar, "S", Megawatts(1.0)),
            DeviceSample::generator(DeviceKind::Reactor, "R", Megawatts(4.0)),
            DeviceSample::connector("Import", Megawatts(-0.5), ConnectorStatus::Connected),
            DeviceSample::connector("Export", Megawatts(0.7), ConnectorStatus::Connected),
        ]);
        let m = aggregate(&snapshot);
        assert_eq!(m.production_total, Megawatts(5.0));
        assert_eq!(m.reactor_production, Megawatts(4.0));
        assert_eq!(m.active_reactor_count, 1);
        assert_eq!(m.consumption_total, Megawatts(0.5));
    }

    #[test]
    fn stored_energy_never_counts_as_consumption() {
        let snapshot = Snapshot::from_samples([battery(3.0, 0.0, ChargeState::Idle)]);
        let m = aggregate(&snapshot);
        assert_eq!(m.total_stored, MegawattHours(3.0));
        assert_eq!(m.consumption_total, Megawatts::ZERO);
    }

    #[test]
    fn capture_skips_missing_handles() {
        struct Missing;
        impl PowerBlock for Missing {
            fn sample(&self) -> Option<DeviceSample> {
                None
            }
        }

        let solar = DeviceSample::generator(DeviceKind::Solar, "S", Megawatts(0.1));
        let blocks: Vec<&dyn PowerBlock> = vec![&Missing, &solar, &Missing];
        let snapshot = Snapshot::capture(blocks);
        assert_eq!(snapshot.count(DeviceKind::Solar), 1);
        assert_eq!(snapshot.count(DeviceKind::Connector), 0);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn aggregate_does_not_consume_snapshot() {
        let snapshot = Snapshot::from_samples([battery(1.0, 0.5, ChargeState::Discharging)]);
        let first = aggregate(&snapshot);
        let second = aggregate(&snapshot);
        assert_eq!(first, second);
    }
}
