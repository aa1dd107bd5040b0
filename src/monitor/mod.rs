//! The monitoring core: snapshot, aggregation, recommendation, mode control.
//!
//! Collaborators are reached only through the traits in [`collaborator`].

pub mod clock;
pub mod collaborator;
pub mod cycle;
pub mod metrics;
pub mod power_mode;
pub mod recommendation;
pub mod record;
pub mod report;
pub mod summary;
