//! Per-tick state machine for the usage monitor.
//!
//! [`MonitorState`] is a plain value object. The runtime feeds it one
//! foreground observation per monitor tick ([`MonitorState::tick`]) and one
//! call per cooldown countdown tick ([`MonitorState::countdown_tick`]); both
//! return the [`Effect`]s the host must perform. Nothing in here touches a
//! timer or a platform API, so every transition is testable in isolation.

use serde::{Deserialize, Serialize};

use crate::models::{MonitoredApps, Phase, DEFAULT_COOLDOWN_SECS, DEFAULT_THRESHOLD_SECS};
use crate::notifications::{elapsed_text, paused_text, MONITORING_TEXT};

// ── MonitorConfig ─────────────────────────────────────────────────────────────

/// Limits applied by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Consecutive seconds in a monitored app that trigger a redirect.
    pub threshold_secs: u32,
    /// Length of the cooldown started after a threshold breach.
    pub cooldown_secs: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold_secs: DEFAULT_THRESHOLD_SECS,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
        }
    }
}

// ── Effect ────────────────────────────────────────────────────────────────────

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the text of the status notification.
    Notify(String),
    /// Bring the blocker window back to the foreground.
    Redirect,
    /// Show (or refresh) the cooldown label with the remaining seconds.
    ShowCountdown(u32),
    /// Hide the cooldown label.
    HideCountdown,
}

// ── MonitorState ──────────────────────────────────────────────────────────────

/// Process-lifetime monitor state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorState {
    /// Which of the three states the loop is in.
    pub phase: Phase,
    /// Consecutive seconds the foreground app has been monitored.
    pub elapsed: u32,
    /// Counter value captured when monitoring was last interrupted.
    pub paused_time: u32,
    /// Seconds left in the cooldown, `None` when no cooldown is in effect.
    pub cooldown_remaining: Option<u32>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cooldown_active(&self) -> bool {
        self.cooldown_remaining.is_some()
    }

    /// Apply one monitor tick given the current foreground application.
    ///
    /// `foreground` is `None` when the usage query returned no data.
    pub fn tick(
        &mut self,
        foreground: Option<&str>,
        apps: &MonitoredApps,
        config: &MonitorConfig,
    ) -> Vec<Effect> {
        let monitored = foreground.is_some_and(|app| apps.contains(app));

        if self.is_cooldown_active() {
            if monitored {
                // Redirecting re-arms the cooldown; the countdown keeps its value.
                return vec![Effect::Redirect];
            }
            self.elapsed = 0;
            return Vec::new();
        }

        if monitored {
            self.phase = Phase::Active;
            self.elapsed = self.elapsed.saturating_add(1);

            if self.elapsed >= config.threshold_secs {
                self.elapsed = 0;
                self.paused_time = 0;
                self.phase = Phase::Cooldown;
                self.cooldown_remaining = Some(config.cooldown_secs);
                return vec![
                    Effect::Redirect,
                    Effect::Notify(MONITORING_TEXT.to_string()),
                    Effect::ShowCountdown(config.cooldown_secs),
                ];
            }

            return vec![Effect::Notify(elapsed_text(self.elapsed))];
        }

        let mut effects = Vec::new();
        if self.phase == Phase::Active {
            self.paused_time = self.elapsed;
            effects.push(Effect::Notify(paused_text(self.paused_time)));
        }
        self.elapsed = 0;
        self.phase = Phase::Idle;
        effects
    }

    /// Apply one tick of the cooldown countdown.
    ///
    /// Does nothing when no cooldown is active. Reaching zero clears the
    /// cooldown and leaves the Idle/Active decision to the next monitor tick.
    pub fn countdown_tick(&mut self) -> Vec<Effect> {
        let Some(remaining) = self.cooldown_remaining else {
            return Vec::new();
        };

        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.cooldown_remaining = None;
            self.phase = Phase::Idle;
            vec![Effect::HideCountdown]
        } else {
            self.cooldown_remaining = Some(remaining);
            vec![Effect::ShowCountdown(remaining)]
        }
    }

    /// Reset the counter for a fresh "start monitoring" request.
    ///
    /// A running cooldown survives a restart.
    pub fn restart(&mut self) {
        self.elapsed = 0;
        self.paused_time = 0;
        self.phase = if self.is_cooldown_active() {
            Phase::Cooldown
        } else {
            Phase::Idle
        };
    }

    /// Host pause: capture the running counter so a resume can pick it up.
    pub fn pause(&mut self) {
        if self.phase == Phase::Active {
            self.paused_time = self.elapsed;
            self.elapsed = 0;
            self.phase = Phase::Idle;
        }
    }

    /// Host resume: continue counting from the last paused value.
    pub fn resume(&mut self) {
        if !self.is_cooldown_active() {
            self.elapsed = self.paused_time;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTAGRAM: &str = "com.instagram.android";
    const LAUNCHER: &str = "com.android.launcher3";

    fn apps() -> MonitoredApps {
        MonitoredApps::default()
    }

    fn run(state: &mut MonitorState, foreground: Option<&str>, n: usize) -> Vec<Effect> {
        let config = MonitorConfig::default();
        let mut all = Vec::new();
        for _ in 0..n {
            all.extend(state.tick(foreground, &apps(), &config));
        }
        all
    }

    fn redirects(effects: &[Effect]) -> usize {
        effects.iter().filter(|e| **e == Effect::Redirect).count()
    }

    // ── Idle ──────────────────────────────────────────────────────────────

    #[test]
    fn test_unmonitored_ticks_never_increment() {
        let mut state = MonitorState::new();
        let effects = run(&mut state, Some(LAUNCHER), 50);
        assert!(effects.is_empty());
        assert_eq!(state.elapsed, 0);
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn test_absent_foreground_takes_idle_path() {
        let mut state = MonitorState::new();
        run(&mut state, Some(INSTAGRAM), 3);
        let effects = run(&mut state, None, 1);
        assert_eq!(state.elapsed, 0);
        assert_eq!(state.paused_time, 3);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(effects, vec![Effect::Notify(paused_text(3))]);
    }

    // ── Active ────────────────────────────────────────────────────────────

    #[test]
    fn test_monitored_ticks_increment_by_one() {
        let mut state = MonitorState::new();
        for expected in 1..20 {
            let effects = run(&mut state, Some(INSTAGRAM), 1);
            assert_eq!(state.elapsed, expected);
            assert_eq!(state.phase, Phase::Active);
            assert_eq!(effects, vec![Effect::Notify(elapsed_text(expected))]);
        }
    }

    #[test]
    fn test_leaving_monitored_app_captures_paused_time() {
        let mut state = MonitorState::new();
        run(&mut state, Some(INSTAGRAM), 7);
        run(&mut state, Some(LAUNCHER), 1);
        assert_eq!(state.paused_time, 7);
        assert_eq!(state.elapsed, 0);

        // Further idle ticks keep the paused value and emit nothing.
        let effects = run(&mut state, Some(LAUNCHER), 4);
        assert!(effects.is_empty());
        assert_eq!(state.paused_time, 7);
    }

    #[test]
    fn test_returning_after_switch_starts_from_zero() {
        let mut state = MonitorState::new();
        run(&mut state, Some(INSTAGRAM), 5);
        run(&mut state, Some(LAUNCHER), 1);
        run(&mut state, Some(INSTAGRAM), 1);
        assert_eq!(state.elapsed, 1);
    }

    // ── Threshold ─────────────────────────────────────────────────────────

    #[test]
    fn test_threshold_breach_scenario() {
        let mut state = MonitorState::new();
        let mut effects = run(&mut state, Some(LAUNCHER), 5);
        effects.extend(run(&mut state, Some(INSTAGRAM), 19));
        assert_eq!(redirects(&effects), 0);

        let breach = run(&mut state, Some(INSTAGRAM), 1);
        assert_eq!(redirects(&breach), 1);
        assert!(breach.contains(&Effect::ShowCountdown(30)));
        assert!(breach.contains(&Effect::Notify(MONITORING_TEXT.to_string())));
        assert_eq!(state.elapsed, 0);
        assert_eq!(state.cooldown_remaining, Some(30));
        assert_eq!(state.phase, Phase::Cooldown);
    }

    #[test]
    fn test_custom_threshold() {
        let mut state = MonitorState::new();
        let config = MonitorConfig {
            threshold_secs: 3,
            cooldown_secs: 5,
        };
        state.tick(Some("steam"), &MonitoredApps::new(["steam"]).unwrap(), &config);
        state.tick(Some("steam"), &MonitoredApps::new(["steam"]).unwrap(), &config);
        let effects = state.tick(Some("steam"), &MonitoredApps::new(["steam"]).unwrap(), &config);
        assert_eq!(redirects(&effects), 1);
        assert_eq!(state.cooldown_remaining, Some(5));
    }

    // ── Cooldown ──────────────────────────────────────────────────────────

    fn in_cooldown() -> MonitorState {
        let mut state = MonitorState::new();
        run(&mut state, Some(INSTAGRAM), 20);
        assert!(state.is_cooldown_active());
        state
    }

    #[test]
    fn test_cooldown_redirects_immediately_without_counting() {
        let mut state = in_cooldown();
        for _ in 0..5 {
            let effects = run(&mut state, Some(INSTAGRAM), 1);
            assert_eq!(effects, vec![Effect::Redirect]);
            assert_eq!(state.elapsed, 0);
        }
        assert_eq!(state.cooldown_remaining, Some(30));
    }

    #[test]
    fn test_cooldown_redirect_on_third_countdown_tick() {
        let mut state = in_cooldown();
        for _ in 0..3 {
            state.countdown_tick();
        }
        assert_eq!(state.cooldown_remaining, Some(27));

        let effects = run(&mut state, Some(INSTAGRAM), 1);
        assert_eq!(effects, vec![Effect::Redirect]);
        assert_eq!(state.cooldown_remaining, Some(27));

        assert_eq!(state.countdown_tick(), vec![Effect::ShowCountdown(26)]);
    }

    #[test]
    fn test_cooldown_unmonitored_does_not_redirect() {
        let mut state = in_cooldown();
        let effects = run(&mut state, Some(LAUNCHER), 3);
        assert!(effects.is_empty());
        assert_eq!(state.phase, Phase::Cooldown);
    }

    #[test]
    fn test_countdown_decrements_and_clears() {
        let mut state = in_cooldown();
        for expected in (1..30).rev() {
            assert_eq!(state.countdown_tick(), vec![Effect::ShowCountdown(expected)]);
        }
        assert_eq!(state.countdown_tick(), vec![Effect::HideCountdown]);
        assert!(!state.is_cooldown_active());
        assert_eq!(state.phase, Phase::Idle);

        // No further countdown effects once cleared.
        assert!(state.countdown_tick().is_empty());
    }

    #[test]
    fn test_after_cooldown_next_tick_classifies() {
        let mut state = in_cooldown();
        for _ in 0..30 {
            state.countdown_tick();
        }
        let effects = run(&mut state, Some(INSTAGRAM), 1);
        assert_eq!(effects, vec![Effect::Notify(elapsed_text(1))]);
        assert_eq!(state.phase, Phase::Active);
    }

    #[test]
    fn test_countdown_tick_without_cooldown_is_noop() {
        let mut state = MonitorState::new();
        assert!(state.countdown_tick().is_empty());
        assert_eq!(state, MonitorState::new());
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn test_pause_and_resume_continue_counter() {
        let mut state = MonitorState::new();
        run(&mut state, Some(INSTAGRAM), 8);
        state.pause();
        assert_eq!(state.paused_time, 8);
        assert_eq!(state.phase, Phase::Idle);

        state.resume();
        assert_eq!(state.elapsed, 8);
        run(&mut state, Some(INSTAGRAM), 1);
        assert_eq!(state.elapsed, 9);
    }

    #[test]
    fn test_restart_keeps_running_cooldown() {
        let mut state = in_cooldown();
        state.countdown_tick();
        state.restart();
        assert_eq!(state.phase, Phase::Cooldown);
        assert_eq!(state.cooldown_remaining, Some(29));
        assert_eq!(state.elapsed, 0);
    }

    #[test]
    fn test_restart_clears_paused_time() {
        let mut state = MonitorState::new();
        run(&mut state, Some(INSTAGRAM), 4);
        run(&mut state, Some(LAUNCHER), 1);
        state.restart();
        assert_eq!(state.paused_time, 0);
        assert_eq!(state.phase, Phase::Idle);
    }
}
