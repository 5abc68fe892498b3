//! Core domain layer for Price Monitor.
//!
//! Holds the typed price model, statistics and range-window calculations,
//! chart/table projections, display formatting, alert detection, CLI
//! settings and the shared error type.

pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod notifications;
pub mod projection;
pub mod range;
pub mod settings;
pub mod time_utils;

pub use error::{MonitorError, Result};
pub use models::{Price, PriceObservation, PriceSeries, StatisticsSnapshot};
