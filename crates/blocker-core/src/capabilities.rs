//! Host capabilities injected into the monitor.
//!
//! Every platform interaction the monitor needs goes through one of these
//! traits, so the runtime can be driven entirely by fakes in tests.

use chrono::{DateTime, Utc};

use crate::error::{BlockerError, Result};
use crate::models::Permission;
use crate::notifications::StatusNotification;

/// Source of wall-clock time, used to bound usage-history queries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Answers "which application currently has focus?".
pub trait ForegroundAppProbe: Send {
    /// Identifier of the foreground application, or `None` when there is no
    /// usage data for the current window.
    fn foreground_app(&mut self) -> Result<Option<String>>;
}

/// Checks and requests the host permissions the monitor depends on.
pub trait PermissionChecker: Send {
    fn is_granted(&self, permission: Permission) -> bool;

    /// Send the user to wherever `permission` can be granted.
    fn request(&mut self, permission: Permission);
}

/// Posts the persistent status notification.
pub trait Notifier: Send {
    fn notify(&mut self, notification: &StatusNotification) -> Result<()>;
}

/// Brings the blocker's own window back to the foreground.
pub trait Redirector: Send {
    fn redirect(&mut self) -> Result<()>;
}

/// Verify every permission in [`Permission::ALL`] order.
///
/// The first missing permission is requested from the user and returned as
/// [`BlockerError::PermissionDenied`]; later permissions are not checked.
pub fn check_permissions(checker: &mut dyn PermissionChecker) -> Result<()> {
    for permission in Permission::ALL {
        if !checker.is_granted(permission) {
            tracing::info!(%permission, "permission missing; requesting from user");
            checker.request(permission);
            return Err(BlockerError::PermissionDenied(permission));
        }
    }
    Ok(())
}
