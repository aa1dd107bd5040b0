//! CSV export for cycle history.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::monitor::record::CycleRecord;

/// Column header for CSV history export.
const HEADER: &str = "cycle,host_tick,timestamp,status,power_mode,charge_pct,\
                       stored_mwh,peak_load_mw,production_mw,consumption_mw,\
                       solar_mw,wind_mw,reactor_mw,active_reactors,\
                       solar_to_add,wind_to_add,error";

/// Exports cycle history to a CSV file at the given path.
///
/// Writes a header row followed by one data row per cycle. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[CycleRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes cycle history as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[CycleRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.cycle.to_string(),
            r.host_tick.to_string(),
            r.timestamp.to_rfc3339(),
            if r.degraded { "degraded" } else { "ok" }.to_string(),
            r.power_mode.map(|m| m.to_string()).unwrap_or_default(),
            format!("{:.2}", r.charge_percent * 100.0),
            format!("{:.4}", r.stored_mwh),
            format!("{:.4}", r.peak_load_mw),
            format!("{:.4}", r.production_mw),
            format!("{:.4}", r.consumption_mw),
            format!("{:.4}", r.solar_mw),
            format!("{:.4}", r.wind_mw),
            format!("{:.4}", r.reactor_mw),
            r.active_reactors.to_string(),
            r.solar_units_to_add.to_string(),
            r.wind_units_to_add.to_string(),
            r.error.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
