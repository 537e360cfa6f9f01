//! Application state and TUI event loop.
//!
//! [`App`] owns the theme, the display timezone and the last received
//! [`StatusSnapshot`]. Key presses become lifecycle commands on the
//! [`MonitorHandle`].

use std::io;
use std::time::Duration;

use blocker_core::time_utils::TimezoneHandler;
use blocker_runtime::monitor::{MonitorHandle, StatusSnapshot};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::sync::{mpsc, oneshot};

use crate::status_view::{self, StatusViewData};
use crate::themes::Theme;

/// How long the redirect banner stays up.
const BANNER_SECS: i64 = 3;

// ── UiAction ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Start,
    Pause,
    Resume,
    Quit,
}

/// Map a key press to an action. `None` for unbound keys.
pub fn action_for_key(key: &KeyEvent) -> Option<UiAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UiAction::Quit)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(UiAction::Quit),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Enter => Some(UiAction::Start),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(UiAction::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(UiAction::Resume),
        _ => None,
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    pub timezone: String,
    tz: TimezoneHandler,
    /// Monitored identifiers, sorted.
    pub apps: Vec<String>,
    pub should_quit: bool,
    /// Most recent snapshot, `None` until the monitor task reports.
    pub last_snapshot: Option<StatusSnapshot>,
}

impl App {
    pub fn new(theme_name: &str, timezone: String, apps: Vec<String>) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            tz: TimezoneHandler::new(&timezone),
            timezone,
            apps,
            should_quit: false,
            last_snapshot: None,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────

    /// Run the status TUI until `q`, `Ctrl+C`, a message on `shutdown`, or
    /// the monitor task ends. Every exit path restores the terminal.
    ///
    /// Keyboard input is polled synchronously with a 250 ms timeout; snapshots
    /// are drained from `rx` with `try_recv` between polls.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<StatusSnapshot>,
        handle: &MonitorHandle,
        mut shutdown: oneshot::Receiver<()>,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => {
                        if let Some(action) = action_for_key(&key) {
                            self.dispatch(action, handle);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            loop {
                match rx.try_recv() {
                    Ok(snapshot) => self.update_from_snapshot(snapshot),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        tracing::info!("monitor task ended; leaving UI");
                        self.should_quit = true;
                        break;
                    }
                }
            }

            self.check_shutdown(&mut shutdown);
            if self.should_quit {
                break Ok(());
            }

            // Let the monitor task run on single-threaded runtimes.
            tokio::task::yield_now().await;
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    pub fn dispatch(&mut self, action: UiAction, handle: &MonitorHandle) {
        tracing::debug!(?action, "key action");
        match action {
            UiAction::Start => handle.start_monitoring(),
            UiAction::Pause => handle.pause(),
            UiAction::Resume => handle.resume(),
            UiAction::Quit => self.should_quit = true,
        }
    }

    /// Quit once an external shutdown request has arrived. A dropped sender
    /// is not a request.
    pub fn check_shutdown(&mut self, shutdown: &mut oneshot::Receiver<()>) {
        if shutdown.try_recv().is_ok() {
            tracing::info!("shutdown requested; leaving UI");
            self.should_quit = true;
        }
    }

    pub fn update_from_snapshot(&mut self, snapshot: StatusSnapshot) {
        self.last_snapshot = Some(snapshot);
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        match self.view_data(chrono::Utc::now()) {
            None => status_view::render_waiting(frame, area, &self.theme),
            Some(data) => match data.snapshot.permission_required {
                Some(permission) if !data.snapshot.monitoring => {
                    status_view::render_permission_required(frame, area, permission, &self.theme)
                }
                _ => status_view::render_status_view(frame, area, &data, &self.theme),
            },
        }
    }

    /// Build the view data for the current snapshot as of `now`.
    pub fn view_data(&self, now: chrono::DateTime<chrono::Utc>) -> Option<StatusViewData> {
        let snapshot = self.last_snapshot.clone()?;
        let recently_redirected = snapshot
            .last_redirect_at
            .is_some_and(|at| (now - at).num_seconds() < BANNER_SECS);
        let last_redirect = snapshot
            .last_redirect_at
            .map(|at| self.tz.format_clock(&at, true));

        Some(StatusViewData {
            snapshot,
            apps: self.apps.clone(),
            timezone: self.timezone.clone(),
            current_time: self.tz.format_clock(&now, true),
            last_redirect,
            recently_redirected,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
