//! Cancellable periodic timer on tokio's clock.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// A periodic timer that can be armed, re-armed and cancelled.
///
/// While disarmed, [`PeriodicTimer::tick`] never completes, so the timer can
/// sit in a `select!` arm unconditionally.
#[derive(Debug)]
pub struct PeriodicTimer {
    period: Duration,
    interval: Option<Interval>,
}

impl PeriodicTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    /// Arm with the first tick due immediately. Re-arming restarts the phase.
    pub fn arm(&mut self) {
        self.arm_at(Instant::now());
    }

    /// Arm with the first tick due one period from now.
    pub fn arm_delayed(&mut self) {
        self.arm_at(Instant::now() + self.period);
    }

    fn arm_at(&mut self, start: Instant) {
        let mut interval = time::interval_at(start, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub fn cancel(&mut self) {
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick. Cancel safe.
    pub async fn tick(&mut self) -> Instant {
        match self.interval.as_mut() {
            Some(interval) => interval.tick().await,
            None => std::future::pending().await,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
