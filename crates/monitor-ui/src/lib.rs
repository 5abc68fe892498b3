//! Terminal UI layer for Price Monitor.
//!
//! Provides themes, header and stat-card components, the price chart and
//! table views, and the main application event loop built on top of
//! [`ratatui`] for rendering the price-history dashboard in the terminal.

pub mod app;
pub mod chart_view;
pub mod components;
pub mod dashboard_view;
pub mod table_view;
pub mod themes;

pub use monitor_core as core;
