//! Power monitor entry point: CLI wiring and config-driven run.

mod cli;

use std::io;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use power_monitor::config::MonitorConfig;
use power_monitor::devices::grid::SimulatedGrid;
use power_monitor::io::display::{NullSink, TextSink};
use power_monitor::io::export::export_csv;
use power_monitor::monitor::collaborator::ReportSink;
use power_monitor::runner::{RunOutput, run};

use crate::cli::Args;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        grid = %config.monitor.grid_name,
        mode = ?config.monitor.mode,
        cycles = config.monitor.cycles,
        seed = config.simulation.seed,
        "starting…"
    );

    let mut grid = SimulatedGrid::from_config(&config);
    let output = {
        let stdout = io::stdout();
        let mut text = TextSink::new(stdout.lock());
        let mut null = NullSink;
        let sink: &mut dyn ReportSink = if args.quiet { &mut null } else { &mut text };
        run(&config, &mut grid, sink, Utc::now())
    };

    println!("\n{}", output.summary);

    if let Some(path) = &args.history_out {
        export_csv(&output.records, path)
            .with_context(|| format!("failed to write history to {}", path.display()))?;
        info!(path = %path.display(), "history written");
    }

    serve(&args, &config, output)
}

/// Loads the configuration: `--scenario` first, then `--preset`, then the
/// baseline; CLI overrides are applied before validation.
fn load_config(args: &Args) -> anyhow::Result<MonitorConfig> {
    let mut config = if let Some(path) = &args.scenario {
        MonitorConfig::from_toml_file(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?
    } else if let Some(name) = &args.preset {
        MonitorConfig::from_preset(name)?
    } else {
        MonitorConfig::baseline()
    };

    if let Some(cycles) = args.cycles {
        config.monitor.cycles = cycles;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(mode) = args.mode {
        config.monitor.mode = mode;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            warn!("{e}");
        }
        bail!("configuration has {} error(s)", errors.len());
    }
    Ok(config)
}

#[cfg(feature = "api")]
fn serve(args: &Args, config: &MonitorConfig, output: RunOutput) -> anyhow::Result<()> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use power_monitor::api::AppState;

    if !args.serve {
        return Ok(());
    }

    let state = Arc::new(AppState {
        grid_name: config.monitor.grid_name.clone(),
        power_mode: output.power_mode,
        summary: output.summary,
        last_report: output.last_report,
        records: output.records,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    rt.block_on(power_monitor::api::serve(state, addr))
        .with_context(|| format!("API server on {addr} failed"))
}

#[cfg(not(feature = "api"))]
fn serve(_args: &Args, _config: &MonitorConfig, _output: RunOutput) -> anyhow::Result<()> {
    Ok(())
}
