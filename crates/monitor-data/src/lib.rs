//! Data layer for Price Monitor.
//!
//! Fetches the CSV price feed over HTTP or from disk, parses it into a typed
//! series, runs the load pipeline and re-serializes the series for export.

pub mod analysis;
pub mod export;
pub mod fetch;
pub mod reader;

pub use monitor_core as core;
