use std::path::PathBuf;

use blocker_core::capabilities::PermissionChecker;
use blocker_core::models::Permission;
use tracing::warn;

use crate::usage_log;

/// How usage access is verified for the configured source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageAccess {
    /// An X display is reachable and publishes the active window.
    X11,
    /// The usage log exists and is readable.
    UsageLog(PathBuf),
}

/// How the ability to raise the blocker window is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAccess {
    /// `WINDOWID` names a window on the X display.
    X11Window,
    /// In-terminal redirect; always available.
    Terminal,
}

/// [`PermissionChecker`] for desktop hosts.
///
/// There is no settings screen to open, so a request logs the guidance.
#[derive(Debug, Clone)]
pub struct DesktopPermissionChecker {
    usage: UsageAccess,
    overlay: OverlayAccess,
}

impl DesktopPermissionChecker {
    pub fn new(usage: UsageAccess, overlay: OverlayAccess) -> Self {
        Self { usage, overlay }
    }
}

impl PermissionChecker for DesktopPermissionChecker {
    fn is_granted(&self, permission: Permission) -> bool {
        match permission {
            Permission::UsageAccess => match &self.usage {
                UsageAccess::X11 => x11_usage_access(),
                UsageAccess::UsageLog(path) => usage_log::is_readable(path),
            },
            Permission::Overlay => match self.overlay {
                OverlayAccess::X11Window => x11_overlay(),
                OverlayAccess::Terminal => true,
            },
        }
    }

    fn request(&mut self, permission: Permission) {
        warn!(%permission, "{}", permission.guidance());
    }
}

#[cfg(target_os = "linux")]
fn x11_usage_access() -> bool {
    crate::x11::usage_access_available()
}

#[cfg(not(target_os = "linux"))]
fn x11_usage_access() -> bool {
    false
}

#[cfg(target_os = "linux")]
fn x11_overlay() -> bool {
    crate::x11::terminal_window_available()
}

#[cfg(not(target_os = "linux"))]
fn x11_overlay() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocker_core::capabilities::check_permissions;
    use blocker_core::error::BlockerError;
    use tempfile::TempDir;

    #[test]
    fn test_usage_log_access_requires_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("usage.jsonl");
        let checker =
            DesktopPermissionChecker::new(UsageAccess::UsageLog(path.clone()), OverlayAccess::Terminal);
        assert!(!checker.is_granted(Permission::UsageAccess));

        std::fs::write(&path, "").unwrap();
        assert!(checker.is_granted(Permission::UsageAccess));
    }

    #[test]
    fn test_terminal_overlay_always_granted() {
        let checker = DesktopPermissionChecker::new(
            UsageAccess::UsageLog(PathBuf::from("/nonexistent/usage.jsonl")),
            OverlayAccess::Terminal,
        );
        assert!(checker.is_granted(Permission::Overlay));
    }

    #[test]
    fn test_missing_usage_log_denied() {
        let tmp = TempDir::new().unwrap();
        let mut checker = DesktopPermissionChecker::new(
            UsageAccess::UsageLog(tmp.path().join("missing.jsonl")),
            OverlayAccess::Terminal,
        );
        let err = check_permissions(&mut checker).unwrap_err();
        assert!(matches!(
            err,
            BlockerError::PermissionDenied(Permission::UsageAccess)
        ));
    }
}
