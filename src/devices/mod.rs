//! Simulated power blocks and the grid that hosts them.

/// Hidden machinery load of the simulated grid.
pub mod baseload;
/// Battery bank model.
pub mod battery;
/// Docking connector model.
pub mod connector;
/// Simulated structure implementing the monitor's collaborators.
pub mod grid;
/// Dispatchable reactor model.
pub mod reactor;
/// Solar panel generation model.
pub mod solar;
pub mod types;
/// AR(1) wind turbine model.
pub mod wind;

// Re-export the main types for convenience
pub use baseload::BaseLoad;
pub use battery::BatteryBank;
pub use connector::Connector;
pub use grid::SimulatedGrid;
pub use reactor::Reactor;
pub use solar::SolarPanel;
pub use types::{Device, DeviceContext, DeviceKind, DeviceSample, PowerBlock};
pub use wind::WindTurbine;
