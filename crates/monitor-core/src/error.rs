use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Price Monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// The feed could not be fetched (network failure or non-success status).
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The feed parsed but yielded zero usable observations.
    #[error("Feed contains no usable price observations")]
    EmptyDataset,

    /// The feed text is empty or has no header line.
    #[error("Failed to parse feed: {0}")]
    Parse(String),

    /// A single data row could not be turned into an observation.
    ///
    /// Only used for diagnostics; ingestion drops the row and carries on.
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written to disk.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A display range string is not a positive day count or `"all"`.
    #[error("Invalid display range: {0}")]
    InvalidRange(String),

    /// The dashboard could not set up, draw to or restore the terminal.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// `true` for errors that abort a whole load cycle and are shown on the
    /// failure screen with a retry prompt.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            MonitorError::Fetch { .. }
                | MonitorError::EmptyDataset
                | MonitorError::Parse(_)
                | MonitorError::FileRead { .. }
        )
    }
}

/// Convenience alias used throughout the monitor crates.
pub type Result<T> = std::result::Result<T, MonitorError>;
