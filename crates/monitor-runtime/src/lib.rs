//! Runtime layer for Price Monitor.
//!
//! Loads the feed through the data layer and owns the dashboard state the UI
//! renders from.

pub mod data_manager;
pub mod session;

pub use monitor_core as core;
pub use monitor_data as data;
