//! X11 backend: active-window sampling, permission probing and redirect.

use std::collections::VecDeque;

use blocker_core::capabilities::Redirector;
use blocker_core::error::{BlockerError, Result};
use blocker_core::models::UsageRecord;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ClientMessageEvent, ConnectionExt, EventMask, Window,
};
use x11rb::rust_connection::RustConnection;

use crate::usage::UsageSource;

const HISTORY_LEN: usize = 32;

fn source_err(e: impl std::fmt::Display) -> BlockerError {
    BlockerError::UsageSource(format!("X11: {}", e))
}

// ── X11Session ────────────────────────────────────────────────────────────────

/// Connection to the X server plus the atoms we need.
pub struct X11Session {
    conn: RustConnection,
    root: Window,
    net_active_window: Atom,
}

impl X11Session {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).map_err(source_err)?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|s| s.root)
            .ok_or_else(|| source_err("no such screen"))?;
        let net_active_window = conn
            .intern_atom(false, b"_NET_ACTIVE_WINDOW")
            .map_err(source_err)?
            .reply()
            .map_err(source_err)?
            .atom;

        Ok(Self {
            conn,
            root,
            net_active_window,
        })
    }

    /// Window id of the focused top-level window, if the WM publishes one.
    pub fn active_window(&self) -> Result<Option<Window>> {
        let reply = self
            .conn
            .get_property(
                false,
                self.root,
                self.net_active_window,
                AtomEnum::WINDOW,
                0,
                1,
            )
            .map_err(source_err)?
            .reply()
            .map_err(source_err)?;

        Ok(reply
            .value32()
            .and_then(|mut values| values.next())
            .filter(|&w| w != x11rb::NONE))
    }

    /// First `WM_CLASS` component (the instance name) of `window`.
    pub fn window_class(&self, window: Window) -> Result<Option<String>> {
        let reply = self
            .conn
            .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 1024)
            .map_err(source_err)?
            .reply()
            .map_err(source_err)?;

        Ok(reply
            .value
            .split(|&b| b == 0)
            .next()
            .filter(|part| !part.is_empty())
            .map(|part| String::from_utf8_lossy(part).into_owned()))
    }

    /// Whether the window manager publishes `_NET_ACTIVE_WINDOW` at all.
    pub fn supports_active_window(&self) -> bool {
        self.conn
            .get_property(
                false,
                self.root,
                self.net_active_window,
                AtomEnum::WINDOW,
                0,
                1,
            )
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| reply.type_ != u32::from(AtomEnum::NONE))
            .unwrap_or(false)
    }

    pub fn window_exists(&self, window: Window) -> bool {
        self.conn
            .get_window_attributes(window)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .is_some()
    }

    /// Ask the window manager to activate `window`.
    pub fn activate(&self, window: Window) -> Result<()> {
        // Source indication 2 = pager; timestamp 0 = CurrentTime.
        let event = ClientMessageEvent::new(32, window, self.net_active_window, [2u32, 0, 0, 0, 0]);
        self.conn
            .send_event(
                false,
                self.root,
                EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
                event,
            )
            .map_err(|e| BlockerError::Redirect(e.to_string()))?;
        self.conn.flush().map_err(|e| BlockerError::Redirect(e.to_string()))?;
        Ok(())
    }
}

/// Whether an X display is reachable and exposes the active window.
pub fn usage_access_available() -> bool {
    X11Session::connect()
        .map(|s| s.supports_active_window())
        .unwrap_or(false)
}

/// The terminal window named by `WINDOWID`, if set and parseable.
pub fn terminal_window_id() -> Option<Window> {
    std::env::var("WINDOWID").ok()?.trim().parse().ok()
}

/// Whether the `WINDOWID` terminal window exists on the display.
pub fn terminal_window_available() -> bool {
    let Some(window) = terminal_window_id() else {
        return false;
    };
    X11Session::connect()
        .map(|s| s.window_exists(window))
        .unwrap_or(false)
}

// ── X11UsageSource ────────────────────────────────────────────────────────────

/// Samples the active window on every query and keeps a short history of
/// `(class, sampled_at)` records.
///
/// The display connection is opened on first use and dropped after an
/// error, so a display that appears later is picked up.
pub struct X11UsageSource {
    session: Option<X11Session>,
    history: VecDeque<UsageRecord>,
}

impl Default for X11UsageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl X11UsageSource {
    pub fn new() -> Self {
        Self {
            session: None,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    fn session(&mut self) -> Result<&X11Session> {
        if self.session.is_none() {
            let session = X11Session::connect()?;
            info!("Connected to X display for foreground sampling");
            self.session = Some(session);
        }
        self.session
            .as_ref()
            .ok_or_else(|| source_err("not connected"))
    }

    fn sample(&mut self, at: DateTime<Utc>) -> Result<()> {
        let session = self.session()?;
        let Some(window) = session.active_window()? else {
            return Ok(());
        };
        let Some(class) = session.window_class(window)? else {
            return Ok(());
        };
        debug!(window, class = %class, "sampled active window");

        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(UsageRecord::new(class, at));
        Ok(())
    }
}

impl UsageSource for X11UsageSource {
    fn query_usage(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>> {
        if let Err(e) = self.sample(end) {
            self.session = None;
            return Err(e);
        }
        Ok(self
            .history
            .iter()
            .filter(|r| r.last_time_used >= start && r.last_time_used <= end)
            .cloned()
            .collect())
    }
}

// ── X11Redirector ─────────────────────────────────────────────────────────────

/// Raises the blocker's terminal window via `_NET_ACTIVE_WINDOW`.
pub struct X11Redirector {
    session: X11Session,
    target: Window,
}

impl X11Redirector {
    /// Connect and target the terminal window from `WINDOWID`.
    pub fn for_terminal() -> Result<Self> {
        let target = terminal_window_id()
            .ok_or_else(|| BlockerError::Redirect("WINDOWID is not set".to_string()))?;
        let session = X11Session::connect()?;
        if !session.window_exists(target) {
            return Err(BlockerError::Redirect(format!(
                "window 0x{:x} does not exist",
                target
            )));
        }
        Ok(Self { session, target })
    }
}

impl Redirector for X11Redirector {
    fn redirect(&mut self) -> Result<()> {
        info!(window = self.target, "raising blocker window");
        self.session.activate(self.target)
    }
}
