//! Reference display surface and history export.

pub mod display;
pub mod export;
