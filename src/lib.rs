//! Grid power monitor: telemetry aggregation, capacity recommendations and
//! power mode control for a structure's batteries, generators and connectors.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
/// Simulated power blocks and the grid that hosts them.
pub mod devices;
pub mod io;
pub mod monitor;
pub mod quantity;
pub mod runner;
