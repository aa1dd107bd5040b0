use std::path::PathBuf;

use clap::Parser;
use power_monitor::monitor::cycle::MonitorMode;

/// Grid power monitor: aggregates block telemetry, recommends generation
/// additions and switches reactors on a simulated structure.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[must_use]
pub struct Args {
    /// Load the configuration from a TOML file.
    #[clap(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, solar_heavy, reactor_dependent).
    #[clap(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Override the number of evaluation cycles.
    #[clap(long)]
    pub cycles: Option<usize>,

    /// Override the random seed of the simulated grid.
    #[clap(long, env = "POWER_MONITOR_SEED")]
    pub seed: Option<u64>,

    /// Override the monitor mode.
    #[clap(long, value_enum)]
    pub mode: Option<MonitorMode>,

    /// Export the cycle history to a CSV file.
    #[clap(long, value_name = "PATH")]
    pub history_out: Option<PathBuf>,

    /// Do not print reports, only the run summary.
    #[clap(long, short)]
    pub quiet: bool,

    /// Serve the results over HTTP after the run.
    #[cfg(feature = "api")]
    #[clap(long)]
    pub serve: bool,

    /// API server port.
    #[cfg(feature = "api")]
    #[clap(long, default_value = "3000")]
    pub port: u16,
}
