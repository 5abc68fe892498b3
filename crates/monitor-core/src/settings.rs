use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::range::DisplayRange;
use crate::time_utils::{get_system_timezone, validate_timezone, AUTO_TIMEZONE};

/// Directory name under the home directory holding config, logs and exports.
pub const APP_DIR_NAME: &str = ".price-monitor";

/// `~/.price-monitor`, or `./.price-monitor` when there is no home directory.
pub fn app_dir() -> PathBuf {
    app_dir_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
}

/// The application directory rooted at `base_dir` (used for testing).
pub fn app_dir_in(base_dir: &Path) -> PathBuf {
    base_dir.join(APP_DIR_NAME)
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Price history dashboard for a CSV price feed
#[derive(Parser, Debug, Clone)]
#[command(
    name = "price-monitor",
    about = "Price history dashboard for a CSV price feed",
    version
)]
pub struct Settings {
    /// URL of the CSV price history feed
    #[arg(long, env = "PRICE_MONITOR_FEED_URL")]
    pub feed_url: Option<String>,

    /// Read the feed from a local CSV file instead of a URL
    #[arg(long)]
    pub feed_file: Option<PathBuf>,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "summary", "export", "notify"])]
    pub view: String,

    /// Display range in days, or "all"
    #[arg(long, default_value = "30")]
    pub range: DisplayRange,

    /// Number of most recent observations used for the trend (2-365)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(2..=365))]
    pub trend_window: u32,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Timezone used to determine "today" (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Show prices with thousand-scale precision only
    #[arg(long, overrides_with = "no_mask_prices")]
    pub mask_prices: bool,

    /// Show full prices, overriding a saved --mask-prices
    #[arg(long, overrides_with = "mask_prices")]
    pub no_mask_prices: bool,

    /// Directory for CSV exports [default: ~/.price-monitor/exports]
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds (1-300)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout_secs: u64,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.price-monitor/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DisplayRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_window: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_prices: Option<bool>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        app_dir().join("last_used.json")
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        app_dir_in(base_dir).join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %path.display(), "ignoring unreadable last-used params");
            Self::default()
        })
    }

    /// Atomically write params to the default path, creating parent directories
    /// if needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the default config file if it exists.
    pub fn clear() -> Result<()> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "failed to clear last-used params");
            }
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // clap stores the arg id using the field name, not the flag spelling.
        if !is_arg_explicitly_set(&matches, "feed_url") && settings.feed_url.is_none() {
            settings.feed_url = last.feed_url;
        }
        if !is_arg_explicitly_set(&matches, "range") {
            if let Some(v) = last.range {
                settings.range = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "trend_window") {
            if let Some(v) = last.trend_window.filter(|w| (2..=365).contains(w)) {
                settings.trend_window = v;
            }
        }
        if settings.no_mask_prices {
            settings.mask_prices = false;
        } else if !is_arg_explicitly_set(&matches, "mask_prices") {
            if let Some(v) = last.mask_prices {
                settings.mask_prices = v;
            }
        }

        // Persist before resolving so "auto" keeps following the system.
        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "failed to persist last-used params");
        }

        Self::resolve_auto_values(settings)
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    ///
    /// Unknown timezone names fall back to UTC.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone.eq_ignore_ascii_case(AUTO_TIMEZONE) {
            settings.timezone = get_system_timezone();
        } else if !validate_timezone(&settings.timezone) {
            tracing::warn!(timezone = %settings.timezone, "unknown timezone, using UTC");
            settings.timezone = "UTC".to_string();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// Configured export directory, defaulting to `~/.price-monitor/exports`.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| app_dir().join("exports"))
    }

    pub fn trend_window(&self) -> usize {
        self.trend_window as usize
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            feed_url: s.feed_url.clone(),
            range: Some(s.range),
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
            trend_window: Some(s.trend_window),
            mask_prices: Some(s.mask_prices),
        }
    }
}

// ── Helper: check if an arg was explicitly given ──────────────────────────────

/// Returns `true` when `name` was supplied on the command line or through its
/// environment variable (not via default value).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    use clap::parser::ValueSource;
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
