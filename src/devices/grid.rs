//! A simulated structure that serves as the monitor's telemetry source.

use tracing::debug;

use crate::config::MonitorConfig;
use crate::devices::baseload::BaseLoad;
use crate::devices::battery::BatteryBank;
use crate::devices::connector::Connector;
use crate::devices::reactor::Reactor;
use crate::devices::solar::SolarPanel;
use crate::devices::types::{ConnectorStatus, Device, DeviceContext, PowerBlock};
use crate::devices::wind::WindTurbine;
use crate::monitor::collaborator::{Actuator, CollaboratorError, Grid};
use crate::monitor::power_mode::ActuationIntent;
use crate::quantity::{MegawattHours, Megawatts};

/// Power balance of one simulated step.
///
/// `connector_flow` is the summed connector output, negative while the docks
/// draw. `net_demand` is what remained after renewables; dispatchable sources
/// split it, and whatever they could not cover ends up in `unserved`
/// (negative when surplus could not be stored).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepBalance {
    pub timestep: usize,
    pub demand: Megawatts,
    pub connector_flow: Megawatts,
    pub renewable: Megawatts,
    pub net_demand: Megawatts,
    pub reactor: Megawatts,
    pub battery: Megawatts,
    pub unserved: Megawatts,
}

/// Coarse energy-balance model of a structure with batteries, renewables,
/// reactors and docking connectors.
///
/// The machinery load is carried by the docked ships, so it is split evenly
/// over the connected connectors and the monitor sees it as connector draw.
/// Without a docked connector the load is still served but nothing reports it.
///
/// Each [`advance`](SimulatedGrid::advance) covers the load in priority
/// order: solar and wind first, then enabled reactors and batteries sharing
/// the rest in proportion to what each can deliver. Surplus charges the
/// batteries. Not a circuit simulation.
#[derive(Debug, Clone)]
pub struct SimulatedGrid {
    name: String,
    dt_hours: f64,
    load: BaseLoad,
    pub batteries: Vec<BatteryBank>,
    pub solars: Vec<SolarPanel>,
    pub winds: Vec<WindTurbine>,
    pub reactors: Vec<Reactor>,
    pub connectors: Vec<Connector>,
    timestep: usize,
    /// Discovery fails while set.
    offline: bool,
    /// Actuation fails while set.
    actuation_locked: bool,
}

impl SimulatedGrid {
    /// Builds the grid described by the configuration.
    ///
    /// Each device gets its own seed derived from the master seed, so a
    /// configuration always produces the same telemetry.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let sim = &config.simulation;
        let steps_per_day = sim.steps_per_day.max(1);
        let dt_hours = 24.0 / steps_per_day as f64;
        let seed = sim.seed;

        let load = BaseLoad::new(
            Megawatts(config.load.base_mw),
            Megawatts(config.load.amp_mw),
            config.load.phase_rad,
            config.load.noise_std,
            steps_per_day,
            seed,
        );

        let b = &config.battery;
        let batteries = (0..b.count)
            .map(|i| {
                BatteryBank::new(
                    format!("Battery {}", i + 1),
                    MegawattHours(b.capacity_mwh),
                    b.initial_charge,
                    Megawatts(b.max_rate_mw),
                    b.efficiency,
                    dt_hours,
                )
            })
            .collect();

        let s = &config.solar;
        let solars = (0..s.count)
            .map(|i| {
                SolarPanel::new(
                    format!("Solar Panel {}", i + 1),
                    Megawatts(s.panel_peak_mw),
                    steps_per_day,
                    s.sunrise_idx,
                    s.sunset_idx,
                    s.noise_std,
                    seed.wrapping_add(1_000 + i as u64),
                )
            })
            .collect();

        let w = &config.wind;
        let winds = (0..w.count)
            .map(|i| {
                WindTurbine::new(
                    format!("Wind Turbine {}", i + 1),
                    Megawatts(w.rated_mw),
                    w.mean_wind,
                    w.alpha,
                    w.noise_std,
                    seed.wrapping_add(2_000 + i as u64),
                )
            })
            .collect();

        let reactors = (0..config.reactor.count)
            .map(|i| {
                Reactor::new(
                    format!("Reactor {}", i + 1),
                    Megawatts(config.reactor.rating_mw),
                )
            })
            .collect();

        let c = &config.connector;
        let connectors = (0..c.count)
            .map(|i| {
                // every other dock has a ship attached
                let status = if i % 2 == 0 {
                    ConnectorStatus::Connected
                } else {
                    ConnectorStatus::Connectable
                };
                Connector::new(
                    format!("Connector {}", i + 1),
                    status,
                    Megawatts(c.ship_draw_mw),
                    c.noise_std,
                    seed.wrapping_add(3_000 + i as u64),
                )
            })
            .collect();

        Self {
            name: config.monitor.grid_name.clone(),
            dt_hours,
            load,
            batteries,
            solars,
            winds,
            reactors,
            connectors,
            timestep: 0,
            offline: false,
            actuation_locked: false,
        }
    }

    /// Steps advanced so far.
    pub fn timestep(&self) -> usize {
        self.timestep
    }

    pub fn dt_hours(&self) -> f64 {
        self.dt_hours
    }

    /// Makes block discovery fail until cleared.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Makes actuation fail until cleared.
    pub fn set_actuation_locked(&mut self, locked: bool) {
        self.actuation_locked = locked;
    }

    /// Advances every device by one step and settles the power balance.
    pub fn advance(&mut self) -> StepBalance {
        let t = self.timestep;
        let context = DeviceContext::new(t);

        let demand = self.load.demand(t);
        let docked = self.connectors.iter().filter(|c| c.is_docked()).count();
        let (routed, unrouted) = if docked > 0 {
            (demand / docked as f64, Megawatts::ZERO)
        } else {
            (Megawatts::ZERO, demand)
        };
        let connector_flow: Megawatts = self
            .connectors
            .iter_mut()
            .map(|c| c.step(&DeviceContext::with_setpoint(t, routed)))
            .sum();
        let renewable: Megawatts = self
            .solars
            .iter_mut()
            .map(|s| s.step(&context))
            .chain(self.winds.iter_mut().map(|w| w.step(&context)))
            .sum();
        let net_demand = unrouted - connector_flow - renewable;

        let (reactor, battery) = if net_demand > Megawatts::ZERO {
            self.share_deficit(t, net_demand)
        } else {
            self.store_surplus(t, net_demand)
        };

        let balance = StepBalance {
            timestep: t,
            demand,
            connector_flow,
            renewable,
            net_demand,
            reactor,
            battery,
            unserved: net_demand - reactor - battery,
        };
        debug!(?balance, "grid step");

        self.timestep += 1;
        balance
    }

    /// Splits a deficit between reactors and batteries in proportion to what
    /// each can deliver this step.
    fn share_deficit(&mut self, t: usize, deficit: Megawatts) -> (Megawatts, Megawatts) {
        let dt = self.dt_hours;
        let reactor_avail: Vec<Megawatts> = self
            .reactors
            .iter()
            .map(|r| if r.is_active() { r.rating } else { Megawatts::ZERO })
            .collect();
        let battery_avail: Vec<Megawatts> = self
            .batteries
            .iter()
            .map(|b| {
                if b.enabled && b.functional {
                    b.max_rate.min(b.stored.per_hours(dt))
                } else {
                    Megawatts::ZERO
                }
            })
            .collect();

        let total: Megawatts = reactor_avail.iter().chain(&battery_avail).copied().sum();
        let fraction = if total > Megawatts::ZERO {
            (deficit / total).min(1.0)
        } else {
            0.0
        };

        let reactor: Megawatts = self
            .reactors
            .iter_mut()
            .zip(&reactor_avail)
            .map(|(r, avail)| r.step(&DeviceContext::with_setpoint(t, *avail * fraction)))
            .sum();
        let battery: Megawatts = self
            .batteries
            .iter_mut()
            .zip(&battery_avail)
            .map(|(b, avail)| b.step(&DeviceContext::with_setpoint(t, *avail * fraction)))
            .sum();
        (reactor, battery)
    }

    /// Spreads a surplus (negative net demand) evenly over the batteries as
    /// charging setpoints. Reactors idle.
    fn store_surplus(&mut self, t: usize, net_demand: Megawatts) -> (Megawatts, Megawatts) {
        let reactor: Megawatts = self
            .reactors
            .iter_mut()
            .map(|r| r.step(&DeviceContext::with_setpoint(t, Megawatts::ZERO)))
            .sum();
        let banks = self.batteries.len().max(1) as f64;
        let battery: Megawatts = self
            .batteries
            .iter_mut()
            .map(|b| b.step(&DeviceContext::with_setpoint(t, net_demand / banks)))
            .sum();
        (reactor, battery)
    }
}

impl Grid for SimulatedGrid {
    fn name(&self) -> &str {
        &self.name
    }

    fn blocks(&self) -> Result<Vec<&dyn PowerBlock>, CollaboratorError> {
        if self.offline {
            return Err(CollaboratorError::Unavailable(format!(
                "block list of {}",
                self.name
            )));
        }

        let mut blocks: Vec<&dyn PowerBlock> = Vec::new();
        blocks.extend(self.batteries.iter().map(|b| b as &dyn PowerBlock));
        blocks.extend(self.solars.iter().map(|s| s as &dyn PowerBlock));
        blocks.extend(self.winds.iter().map(|w| w as &dyn PowerBlock));
        blocks.extend(self.reactors.iter().map(|r| r as &dyn PowerBlock));
        blocks.extend(self.connectors.iter().map(|c| c as &dyn PowerBlock));
        Ok(blocks)
    }
}

impl Actuator for SimulatedGrid {
    fn apply(&mut self, intent: ActuationIntent) -> Result<(), CollaboratorError> {
        if self.actuation_locked {
            return Err(CollaboratorError::Unavailable(format!(
                "power controls of {}",
                self.name
            )));
        }

        for battery in &mut self.batteries {
            battery.enabled = intent.batteries_enabled;
        }
        for reactor in &mut self.reactors {
            reactor.enabled = intent.reactors_enabled;
        }
        Ok(())
    }
}
