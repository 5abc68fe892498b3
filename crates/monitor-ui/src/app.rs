//! Main application state and TUI event loop for Price Monitor.
//!
//! [`App`] owns the dashboard session, the feed loader, the theme and the
//! interactive view settings (table sort, scroll, masking).  It drives the
//! dashboard event loop.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use monitor_core::error::MonitorError;
use monitor_core::formatting::{price_formatter, PriceFormatter};
use monitor_core::projection::TableSort;
use monitor_core::range::DisplayRange;
use monitor_runtime::data::analysis::FeedLoad;
use monitor_runtime::data_manager::DataManager;
use monitor_runtime::session::DashboardSession;

use crate::dashboard_view::{self, DashboardScreen};
use crate::table_view;
use crate::themes::Theme;

// ── LoadState ─────────────────────────────────────────────────────────────────

/// Outcome of the most recent feed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// A load is in flight.
    Loading,
    /// The feed parsed but held no usable observations.
    Empty,
    /// The fetch or parse failed; carries the message to show.
    Failed(String),
    Ready,
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Reload,
    Quit,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the Price Monitor TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Single owner of the current series and display range.
    pub session: DashboardSession,
    pub data_manager: DataManager,
    /// Timezone name shown in the header.
    pub timezone: String,
    /// Directory export files are written to.
    pub export_dir: PathBuf,
    /// Render prices with [`monitor_core::formatting::MaskedPrice`].
    pub masked: bool,
    pub sort: TableSort,
    /// First visible table row.
    pub scroll: usize,
    pub state: LoadState,
    /// Message from the last export, cleared on the next load.
    pub status: Option<String>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Height of the table region in the last rendered frame.
    table_height: u16,
}

impl App {
    pub fn new(
        theme_name: &str,
        session: DashboardSession,
        data_manager: DataManager,
        timezone: String,
        export_dir: PathBuf,
        masked: bool,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            session,
            data_manager,
            timezone,
            export_dir,
            masked,
            sort: TableSort::default(),
            scroll: 0,
            state: LoadState::Loading,
            status: None,
            should_quit: false,
            table_height: 0,
        }
    }

    pub fn formatter(&self) -> Box<dyn PriceFormatter> {
        price_formatter(self.masked)
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until the user quits.
    ///
    /// The first load happens before any key is read; `r` triggers another.
    /// Uses `crossterm::event::poll` with a 250 ms timeout.  The loop exits on
    /// `q`, `Q`, or `Ctrl+C`.  Terminal I/O failures surface as
    /// [`MonitorError::Terminal`].
    pub async fn run(mut self) -> monitor_core::Result<()> {
        enable_raw_mode().map_err(terminal_error)?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(terminal_error)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(terminal_error)?;

        let result = self.event_loop(&mut terminal).await.map_err(terminal_error);

        // Restore terminal state unconditionally.
        disable_raw_mode().map_err(terminal_error)?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen).map_err(terminal_error)?;
        terminal.show_cursor().map_err(terminal_error)?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);
        let mut pending_reload = true;

        loop {
            if pending_reload {
                self.state = LoadState::Loading;
                terminal.draw(|frame| self.render(frame))?;
                self.reload().await;
                pending_reload = false;
            }

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    match self.handle_key(key) {
                        KeyAction::Reload => pending_reload = true,
                        KeyAction::Quit => self.should_quit = true,
                        KeyAction::None => {}
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    // ── State transitions ─────────────────────────────────────────────────────

    /// Load the feed once and apply the outcome.
    pub async fn reload(&mut self) {
        let outcome = self.data_manager.load().await;
        self.apply_load(outcome);
    }

    /// Replace the session's series on success, or switch to a failure
    /// screen.  A failed reload discards nothing but is shown as a failure.
    pub fn apply_load(&mut self, outcome: monitor_core::Result<FeedLoad>) {
        self.status = None;
        match outcome {
            Ok(feed) => {
                tracing::info!(
                    observations = feed.series.len(),
                    dropped = feed.metadata.rows_dropped(),
                    "dashboard data loaded"
                );
                self.session.replace_series(feed);
                self.scroll = 0;
                self.state = LoadState::Ready;
            }
            Err(MonitorError::EmptyDataset) => {
                tracing::warn!("feed has no usable observations");
                self.state = LoadState::Empty;
            }
            Err(e) => {
                tracing::warn!(error = %e, "dashboard load failed");
                self.state = LoadState::Failed(e.to_string());
            }
        }
    }

    /// Apply a key press.  Ignores key releases and repeats reported by
    /// terminals with enhanced keyboard support.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        if key.kind != KeyEventKind::Press {
            return KeyAction::None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyAction::Quit
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Reload,
            KeyCode::Char(c @ '1'..='4') => {
                if let Some(range) = DisplayRange::from_key(c) {
                    self.session.set_range(range);
                }
                KeyAction::None
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.sort = self.sort.next();
                self.scroll = 0;
                KeyAction::None
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.masked = !self.masked;
                KeyAction::None
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.export();
                KeyAction::None
            }
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                KeyAction::None
            }
            KeyCode::Down => {
                let limit = table_view::max_scroll(self.session.series().len(), self.table_height);
                self.scroll = (self.scroll + 1).min(limit);
                KeyAction::None
            }
            _ => KeyAction::None,
        }
    }

    /// Write the current series to the export directory.
    pub fn export(&mut self) {
        if self.state != LoadState::Ready {
            self.status = Some("Nothing to export".to_string());
            return;
        }
        self.status = Some(match self.session.export(&self.export_dir) {
            Ok(path) => format!("Exported to {}", path.display()),
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                format!("Export failed: {}", e)
            }
        });
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let source = self.data_manager.source().to_string();

        match &self.state {
            LoadState::Loading => dashboard_view::render_loading(frame, area, &source, &self.theme),
            LoadState::Empty => table_view::render_no_data(frame, area, &self.theme),
            LoadState::Failed(message) => {
                dashboard_view::render_load_failed(frame, area, message, &self.theme)
            }
            LoadState::Ready => {
                self.table_height = dashboard_view::dashboard_layout(area).table.height;
                let view = self.session.view(self.sort);
                let screen = DashboardScreen {
                    view: &view,
                    source: &source,
                    timezone: &self.timezone,
                    scroll: self.scroll,
                    status: self.status.as_deref(),
                };
                let formatter = self.formatter();
                dashboard_view::render_dashboard(frame, area, &screen, formatter.as_ref(), &self.theme);
            }
        }
    }
}

fn terminal_error(e: io::Error) -> MonitorError {
    MonitorError::Terminal(e.to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
