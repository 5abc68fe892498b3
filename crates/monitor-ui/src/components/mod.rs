//! Small widgets composed by the dashboard views.

pub mod header;
pub mod indicators;
