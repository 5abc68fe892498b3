//! Re-serialization of the loaded series back to CSV.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use monitor_core::models::PriceSeries;
use monitor_core::{MonitorError, Result};
use tracing::info;

/// Header line followed by each observation's raw fields, joined by `\n`
/// with no trailing newline.
pub fn to_csv(series: &PriceSeries) -> String {
    std::iter::once(series.header().join(","))
        .chain(series.iter().map(|obs| obs.fields.join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `price_history_<YYYY-MM-DD>.csv`.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("price_history_{}.csv", today.format("%Y-%m-%d"))
}

/// Write the series to `<dir>/price_history_<today>.csv`, creating `dir`.
pub fn write_export(series: &PriceSeries, dir: &Path, today: NaiveDate) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| MonitorError::FileWrite {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(export_file_name(today));
    std::fs::write(&path, to_csv(series)).map_err(|source| MonitorError::FileWrite {
        path: path.clone(),
        source,
    })?;

    info!(
        "Exported {} observations to {}",
        series.len(),
        path.display()
    );
    Ok(path)
}
