use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{BlockerError, Result};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Delay between two consecutive monitor ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Length of the trailing usage-history window queried on every tick.
pub const USAGE_WINDOW: Duration = Duration::from_secs(1);

/// Seconds inside a monitored app before the user is redirected.
pub const DEFAULT_THRESHOLD_SECS: u32 = 20;

/// Length of the cooldown started after a threshold breach.
pub const DEFAULT_COOLDOWN_SECS: u32 = 30;

/// The single slot the status notification occupies.
pub const NOTIFICATION_ID: u32 = 1;

/// Applications monitored when none are given on the command line.
pub const DEFAULT_MONITORED_APPS: &[&str] = &[
    "com.instagram.android",
    "com.facebook.katana",
    "com.android.settings",
    "com.android.mms",
];

// ── UsageRecord ───────────────────────────────────────────────────────────────

/// One row of usage history: an application and the last time it was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Application identifier (package name or window class).
    pub package: String,
    /// UTC timestamp of the most recent use.
    pub last_time_used: DateTime<Utc>,
}

impl UsageRecord {
    pub fn new(package: impl Into<String>, last_time_used: DateTime<Utc>) -> Self {
        Self {
            package: package.into(),
            last_time_used,
        }
    }
}

// ── MonitoredApps ─────────────────────────────────────────────────────────────

/// Fixed set of application identifiers subject to time-limiting.
///
/// Built once at startup; there is no way to mutate it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredApps {
    apps: BTreeSet<String>,
}

impl MonitoredApps {
    /// Build the set, rejecting identifiers that are not well formed.
    pub fn new<I, S>(apps: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for app in apps {
            let app = app.as_ref().trim();
            if !is_valid_identifier(app) {
                return Err(BlockerError::InvalidIdentifier(app.to_string()));
            }
            set.insert(app.to_string());
        }
        Ok(Self { apps: set })
    }

    /// Whether `package` is one of the monitored identifiers.
    pub fn contains(&self, package: &str) -> bool {
        self.apps.contains(package)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.apps.iter().map(String::as_str)
    }
}

impl Default for MonitoredApps {
    fn default() -> Self {
        Self {
            apps: DEFAULT_MONITORED_APPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Returns `true` for identifiers made of letters, digits, `.`, `_` and `-`.
///
/// Covers reverse-DNS package names as well as X11 `WM_CLASS` values.
pub fn is_valid_identifier(candidate: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._\-]*$").expect("identifier pattern is valid")
    });
    re.is_match(candidate)
}

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Which of the three monitor states the loop is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Foreground app is not monitored (or not yet classified).
    #[default]
    Idle,
    /// Foreground app is monitored and the elapsed counter is running.
    Active,
    /// Threshold was breached; returning to a monitored app redirects at once.
    Cooldown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "idle",
            Phase::Active => "active",
            Phase::Cooldown => "cooldown",
        };
        f.write_str(label)
    }
}

// ── Permission ────────────────────────────────────────────────────────────────

/// Host permissions that must be granted before monitoring can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read access to usage history (which app has focus).
    UsageAccess,
    /// Ability to bring the blocker window on top of other apps.
    Overlay,
}

impl Permission {
    /// Order in which permissions are checked.
    pub const ALL: [Permission; 2] = [Permission::UsageAccess, Permission::Overlay];

    /// Short guidance shown on the settings screen for this permission.
    pub fn guidance(&self) -> &'static str {
        match self {
            Permission::UsageAccess => {
                "Usage access is required to see which application has focus. \
                 Run inside an X11 session or point --usage-log at a readable usage log."
            }
            Permission::Overlay => {
                "Overlay access is required to bring the blocker back on top. \
                 Launch it from a terminal that exports WINDOWID."
            }
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Permission::UsageAccess => "usage access",
            Permission::Overlay => "overlay",
        };
        f.write_str(label)
    }
}
