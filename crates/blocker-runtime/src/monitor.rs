//! Async monitor service.
//!
//! Owns the [`MonitorState`] and every host capability inside one tokio
//! task. The monitor timer, the cooldown countdown and lifecycle commands
//! are multiplexed with `select!`, so ticks run strictly one after another
//! and nothing is shared. A [`StatusSnapshot`] is sent to the UI after every
//! event.

use blocker_core::capabilities::{
    check_permissions, Clock, ForegroundAppProbe, Notifier, PermissionChecker, Redirector,
};
use blocker_core::error::BlockerError;
use blocker_core::models::{MonitoredApps, Permission, Phase, TICK_INTERVAL};
use blocker_core::notifications::{paused_text, StatusNotification};
use blocker_core::state::{Effect, MonitorConfig, MonitorState};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::scheduler::PeriodicTimer;

// ── Public types ──────────────────────────────────────────────────────────────

/// Host capabilities the service drives.
pub struct Capabilities {
    pub probe: Box<dyn ForegroundAppProbe>,
    pub permissions: Box<dyn PermissionChecker>,
    pub notifier: Box<dyn Notifier>,
    pub redirector: Box<dyn Redirector>,
    pub clock: Box<dyn Clock>,
}

/// Lifecycle requests from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// Check permissions and, if granted, begin monitoring.
    Start,
    /// Host pause: stop both timers, keep the counter.
    Pause,
    /// Host resume: re-arm timers if monitoring had been started.
    Resume,
    Shutdown,
}

/// Everything the status view renders, sent after every state change.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub phase: Phase,
    pub elapsed: u32,
    pub paused_time: u32,
    pub threshold_secs: u32,
    pub cooldown_secs: u32,
    /// Remaining cooldown seconds; `None` hides the countdown label.
    pub cooldown_remaining: Option<u32>,
    pub notification: StatusNotification,
    pub foreground: Option<String>,
    pub redirects: u64,
    pub monitor_ticks: u64,
    pub monitoring: bool,
    pub paused: bool,
    /// Set when the last start attempt stopped on a missing permission.
    pub permission_required: Option<Permission>,
    pub last_redirect_at: Option<DateTime<Utc>>,
}

// ── MonitorService ────────────────────────────────────────────────────────────

/// Background monitor. Call [`MonitorService::start`] to spawn it.
pub struct MonitorService {
    caps: Capabilities,
    apps: MonitoredApps,
    config: MonitorConfig,
    state: MonitorState,
    notification: StatusNotification,
    foreground: Option<String>,
    redirects: u64,
    monitor_ticks: u64,
    monitoring: bool,
    paused: bool,
    permission_required: Option<Permission>,
    last_redirect_at: Option<DateTime<Utc>>,
}

struct Timers {
    monitor: PeriodicTimer,
    countdown: PeriodicTimer,
}

impl MonitorService {
    pub fn new(caps: Capabilities, apps: MonitoredApps, config: MonitorConfig) -> Self {
        Self {
            caps,
            apps,
            config,
            state: MonitorState::new(),
            notification: StatusNotification::monitoring(),
            foreground: None,
            redirects: 0,
            monitor_ticks: 0,
            monitoring: false,
            paused: false,
            permission_required: None,
            last_redirect_at: None,
        }
    }

    /// Spawn the service task.
    ///
    /// Returns the snapshot receiver and a [`MonitorHandle`] for lifecycle
    /// commands. The task exits on [`MonitorCommand::Shutdown`], when the
    /// handle is dropped, or when the receiver is dropped.
    pub fn start(self) -> (mpsc::Receiver<StatusSnapshot>, MonitorHandle) {
        let (tx, rx) = mpsc::channel(16);
        let (cmd_tx, cmd_rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.run(tx, cmd_rx).await;
        });

        (
            rx,
            MonitorHandle {
                commands: cmd_tx,
                handle,
            },
        )
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            phase: self.state.phase,
            elapsed: self.state.elapsed,
            paused_time: self.state.paused_time,
            threshold_secs: self.config.threshold_secs,
            cooldown_secs: self.config.cooldown_secs,
            cooldown_remaining: self.state.cooldown_remaining,
            notification: self.notification.clone(),
            foreground: self.foreground.clone(),
            redirects: self.redirects,
            monitor_ticks: self.monitor_ticks,
            monitoring: self.monitoring,
            paused: self.paused,
            permission_required: self.permission_required,
            last_redirect_at: self.last_redirect_at,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────

    async fn run(
        mut self,
        tx: mpsc::Sender<StatusSnapshot>,
        mut commands: mpsc::Receiver<MonitorCommand>,
    ) {
        let mut timers = Timers {
            monitor: PeriodicTimer::new(TICK_INTERVAL),
            countdown: PeriodicTimer::new(TICK_INTERVAL),
        };

        if tx.send(self.snapshot()).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                biased;

                cmd = commands.recv() => match cmd {
                    Some(MonitorCommand::Shutdown) | None => {
                        info!("monitor service shutting down");
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd, &mut timers),
                },
                _ = timers.monitor.tick() => self.on_monitor_tick(&mut timers),
                _ = timers.countdown.tick() => self.on_countdown_tick(&mut timers),
            }

            if tx.send(self.snapshot()).await.is_err() {
                debug!("snapshot channel closed; exiting monitor loop");
                break;
            }
        }
    }

    fn handle_command(&mut self, cmd: MonitorCommand, timers: &mut Timers) {
        match cmd {
            MonitorCommand::Start => self.start_monitoring(timers),
            MonitorCommand::Pause => self.pause(timers),
            MonitorCommand::Resume => self.resume(timers),
            MonitorCommand::Shutdown => {}
        }
    }

    fn start_monitoring(&mut self, timers: &mut Timers) {
        if let Err(permission) = self.check_with_recheck() {
            info!(%permission, "monitoring not started; permission missing");
            self.permission_required = Some(permission);
            return;
        }

        self.permission_required = None;
        self.state.restart();
        self.monitoring = true;
        self.paused = false;
        self.post(StatusNotification::monitoring());
        timers.monitor.arm();
        if self.state.is_cooldown_active() && !timers.countdown.is_armed() {
            timers.countdown.arm_delayed();
        }
        info!(
            apps = self.apps.len(),
            threshold = self.config.threshold_secs,
            cooldown = self.config.cooldown_secs,
            "monitoring started"
        );
    }

    /// One check plus one immediate re-check; no further retries.
    fn check_with_recheck(&mut self) -> Result<(), Permission> {
        let mut last = None;
        for _ in 0..2 {
            match check_permissions(self.caps.permissions.as_mut()) {
                Ok(()) => return Ok(()),
                Err(BlockerError::PermissionDenied(p)) => last = Some(p),
                Err(e) => {
                    warn!(error = %e, "permission check failed");
                    last = Some(Permission::UsageAccess);
                }
            }
        }
        Err(last.unwrap_or(Permission::UsageAccess))
    }

    fn pause(&mut self, timers: &mut Timers) {
        if !self.monitoring || self.paused {
            return;
        }
        let was_active = self.state.phase == Phase::Active;
        self.state.pause();
        timers.monitor.cancel();
        timers.countdown.cancel();
        self.paused = true;
        if was_active {
            self.post(StatusNotification::with_text(paused_text(
                self.state.paused_time,
            )));
        }
        info!(paused_time = self.state.paused_time, "monitoring paused");
    }

    fn resume(&mut self, timers: &mut Timers) {
        if !self.monitoring || !self.paused {
            return;
        }
        self.state.resume();
        self.paused = false;
        timers.monitor.arm();
        if self.state.is_cooldown_active() {
            timers.countdown.arm_delayed();
        }
        info!(elapsed = self.state.elapsed, "monitoring resumed");
    }

    fn on_monitor_tick(&mut self, timers: &mut Timers) {
        self.monitor_ticks += 1;
        let foreground = match self.caps.probe.foreground_app() {
            Ok(fg) => fg,
            Err(e) => {
                warn!(error = %e, "usage query failed; treating foreground as absent");
                None
            }
        };

        let effects = self
            .state
            .tick(foreground.as_deref(), &self.apps, &self.config);
        debug!(
            tick = self.monitor_ticks,
            foreground = foreground.as_deref().unwrap_or("-"),
            phase = %self.state.phase,
            elapsed = self.state.elapsed,
            "monitor tick"
        );
        self.foreground = foreground;
        self.apply(effects, timers);
    }

    fn on_countdown_tick(&mut self, timers: &mut Timers) {
        let effects = self.state.countdown_tick();
        self.apply(effects, timers);
    }

    fn apply(&mut self, effects: Vec<Effect>, timers: &mut Timers) {
        for effect in effects {
            match effect {
                Effect::Notify(text) => self.post(StatusNotification::with_text(text)),
                Effect::Redirect => self.redirect(),
                Effect::ShowCountdown(remaining) => {
                    if !timers.countdown.is_armed() {
                        info!(seconds = remaining, "cooldown started");
                        timers.countdown.arm_delayed();
                    }
                }
                Effect::HideCountdown => {
                    info!("cooldown finished");
                    timers.countdown.cancel();
                }
            }
        }
    }

    fn redirect(&mut self) {
        self.redirects += 1;
        self.last_redirect_at = Some(self.caps.clock.now());
        info!(
            count = self.redirects,
            foreground = self.foreground.as_deref().unwrap_or("-"),
            "redirecting away from monitored app"
        );
        if let Err(e) = self.caps.redirector.redirect() {
            warn!(error = %e, "redirect failed");
        }
    }

    fn post(&mut self, notification: StatusNotification) {
        if let Err(e) = self.caps.notifier.notify(&notification) {
            warn!(error = %e, "failed to post status notification");
        }
        self.notification = notification;
    }
}

// ── MonitorHandle ─────────────────────────────────────────────────────────────

/// Handle to the background monitor task.
pub struct MonitorHandle {
    commands: mpsc::Sender<MonitorCommand>,
    handle: tokio::task::JoinHandle<()>,
}

impl MonitorHandle {
    pub fn start_monitoring(&self) {
        self.send(MonitorCommand::Start);
    }

    pub fn pause(&self) {
        self.send(MonitorCommand::Pause);
    }

    pub fn resume(&self) {
        self.send(MonitorCommand::Resume);
    }

    pub fn shutdown(&self) {
        self.send(MonitorCommand::Shutdown);
    }

    /// Immediately abort the monitor task.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    fn send(&self, cmd: MonitorCommand) {
        if let Err(e) = self.commands.try_send(cmd) {
            warn!(?cmd, error = %e, "failed to deliver monitor command");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
