mod bootstrap;
mod report;

use std::time::Duration;

use anyhow::{Context, Result};
use monitor_core::formatting::price_formatter;
use monitor_core::notifications::{detect_price_change, AlertStateStore};
use monitor_core::projection::TableSort;
use monitor_core::settings::Settings;
use monitor_core::time_utils::resolve_timezone;
use monitor_data::analysis::FeedLoad;
use monitor_data::fetch::FeedSource;
use monitor_runtime::data_manager::DataManager;
use monitor_runtime::session::DashboardSession;
use monitor_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    // The dashboard owns the terminal, so it always logs to a file.
    let log_file = match (&settings.log_file, settings.view.as_str()) {
        (Some(path), _) => Some(path.clone()),
        (None, "dashboard") => Some(bootstrap::default_log_file()),
        (None, _) => None,
    };
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Price Monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Range: {}, Theme: {}, Timezone: {}",
        settings.view,
        settings.range,
        settings.theme,
        settings.timezone
    );

    let source = FeedSource::from_options(settings.feed_url.as_deref(), settings.feed_file.clone())
        .context("no feed configured; pass --feed-url or --feed-file")?;
    let data_manager = DataManager::new(source, Duration::from_secs(settings.timeout_secs))?;

    let mut session = DashboardSession::new(
        settings.range,
        settings.trend_window(),
        resolve_timezone(&settings.timezone),
    );

    match settings.view.as_str() {
        "dashboard" => {
            let app = App::new(
                &settings.theme,
                session,
                data_manager,
                settings.timezone.clone(),
                settings.export_dir(),
                settings.mask_prices,
            );
            app.run().await?;
        }

        "summary" => {
            session.replace_series(load_once(data_manager).await?);
            let formatter = price_formatter(settings.mask_prices);
            let view = session.view(TableSort::default());
            print!("{}", report::summary_text(&view, formatter.as_ref()));
        }

        "export" => {
            session.replace_series(load_once(data_manager).await?);
            let path = session.export(&settings.export_dir())?;
            println!("{}", path.display());
        }

        "notify" => {
            let feed = load_once(data_manager).await?;
            let Some(alert) = detect_price_change(&feed.series) else {
                println!("No price change detected.");
                return Ok(());
            };

            let mut store = AlertStateStore::with_default_path();
            if !store.should_alert(&alert) {
                tracing::info!(date = %alert.latest_date, "price change already reported");
                println!("Price change on {} already reported.", alert.latest_date);
                return Ok(());
            }

            let formatter = price_formatter(settings.mask_prices);
            println!("{}", alert.text_body(formatter.as_ref()));
            store.mark_alerted(&alert);
        }

        unknown => {
            eprintln!("Unknown view: {}", unknown);
        }
    }

    Ok(())
}

/// Single load for the one-shot views.
async fn load_once(data_manager: DataManager) -> Result<FeedLoad> {
    let source = data_manager.source().to_string();
    data_manager
        .load()
        .await
        .with_context(|| format!("failed to load price history from {}", source))
}
