use blocker_core::capabilities::{Clock, ForegroundAppProbe};
use blocker_core::error::Result;
use blocker_core::models::{UsageRecord, USAGE_WINDOW};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

// ── UsageSource ───────────────────────────────────────────────────────────────

/// Queryable history of "application X was last used at time T" records.
pub trait UsageSource: Send {
    /// Records whose `last_time_used` falls in `[start, end]`.
    fn query_usage(&mut self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> Result<Vec<UsageRecord>>;
}

/// Pick the foreground application from a batch of usage records.
///
/// The most recent `last_time_used` wins; equal timestamps go to the
/// lexicographically smallest package name so the choice is stable.
pub fn select_foreground(records: &[UsageRecord]) -> Option<&str> {
    records
        .iter()
        .max_by(|a, b| {
            a.last_time_used
                .cmp(&b.last_time_used)
                .then_with(|| b.package.cmp(&a.package))
        })
        .map(|r| r.package.as_str())
}

// ── UsageStatsProbe ───────────────────────────────────────────────────────────

/// [`ForegroundAppProbe`] that queries a usage source over the trailing
/// one-second window.
pub struct UsageStatsProbe<S, C> {
    source: S,
    clock: C,
    window: Duration,
}

impl<S: UsageSource, C: Clock> UsageStatsProbe<S, C> {
    pub fn new(source: S, clock: C) -> Self {
        let window = Duration::from_std(USAGE_WINDOW).unwrap_or_else(|_| Duration::seconds(1));
        Self {
            source,
            clock,
            window,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: UsageSource, C: Clock> ForegroundAppProbe for UsageStatsProbe<S, C> {
    fn foreground_app(&mut self) -> Result<Option<String>> {
        let end = self.clock.now();
        let start = end - self.window;
        let records = self.source.query_usage(start, end)?;
        let foreground = select_foreground(&records).map(str::to_string);
        debug!(
            records = records.len(),
            foreground = foreground.as_deref().unwrap_or("-"),
            "usage window queried"
        );
        Ok(foreground)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
