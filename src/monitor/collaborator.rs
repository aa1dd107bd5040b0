//! Interfaces to the outside world: block discovery, actuation, display.
//!
//! The core never depends on a concrete collaborator. Implementations live in
//! [`crate::devices::grid`] and [`crate::io::display`].

use thiserror::Error;

use crate::devices::types::PowerBlock;
use crate::monitor::power_mode::ActuationIntent;
use crate::monitor::report::Report;

/// Failure reported by a collaborator.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{0} is unavailable")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Discovery of the power blocks belonging to one structure.
pub trait Grid {
    /// Display name of the structure.
    fn name(&self) -> &str;

    /// Handles of every power block on the structure, already filtered.
    ///
    /// # Errors
    ///
    /// Returns a `CollaboratorError` if the block list cannot be obtained.
    fn blocks(&self) -> Result<Vec<&dyn PowerBlock>, CollaboratorError>;
}

/// Device-side application of a power mode decision.
pub trait Actuator {
    /// # Errors
    ///
    /// Returns a `CollaboratorError` if the intent could not be applied.
    fn apply(&mut self, intent: ActuationIntent) -> Result<(), CollaboratorError>;
}

/// Display surface for reports.
pub trait ReportSink {
    /// # Errors
    ///
    /// Returns a `CollaboratorError` if the surface cannot be written.
    fn write(&mut self, report: &Report) -> Result<(), CollaboratorError>;

    /// Writes a one-line status in place of a report.
    ///
    /// # Errors
    ///
    /// Returns a `CollaboratorError` if the surface cannot be written.
    fn write_status(&mut self, line: &str) -> Result<(), CollaboratorError>;
}
