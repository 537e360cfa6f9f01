//! Builds the monitor's capabilities from settings.

use std::path::PathBuf;

use blocker_core::capabilities::{ForegroundAppProbe, Redirector, SystemClock};
use blocker_core::notifications::LogNotifier;
use blocker_core::settings::Settings;
use blocker_core::time_utils::TimezoneHandler;
use blocker_probe::permissions::{DesktopPermissionChecker, OverlayAccess, UsageAccess};
use blocker_probe::redirect::TerminalRedirector;
use blocker_probe::usage::UsageStatsProbe;
use blocker_probe::usage_log::{default_usage_log_path, UsageLogSource};
use blocker_runtime::monitor::Capabilities;

/// Usage source after resolving `--source auto`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    X11,
    UsageLog(PathBuf),
}

/// Resolve `--source` against what the host offers.
///
/// `auto` prefers X11 when a display is reachable, otherwise the usage log.
pub fn resolve_source(
    requested: &str,
    usage_log: Option<&PathBuf>,
    x11_available: bool,
) -> SourceKind {
    let log = || SourceKind::UsageLog(usage_log.cloned().unwrap_or_else(default_usage_log_path));
    match requested {
        "x11" => SourceKind::X11,
        "log" => log(),
        _ if x11_available && usage_log.is_none() => SourceKind::X11,
        _ => log(),
    }
}

#[cfg(target_os = "linux")]
fn x11_available() -> bool {
    blocker_probe::x11::usage_access_available()
}

#[cfg(not(target_os = "linux"))]
fn x11_available() -> bool {
    false
}

#[cfg(target_os = "linux")]
fn x11_redirector() -> Option<Box<dyn Redirector>> {
    match blocker_probe::x11::X11Redirector::for_terminal() {
        Ok(r) => Some(Box::new(r) as Box<dyn Redirector>),
        Err(e) => {
            tracing::info!(error = %e, "X11 redirect unavailable");
            None
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn x11_redirector() -> Option<Box<dyn Redirector>> {
    None
}

/// Pick the window-raising redirector, falling back to the terminal bell.
fn redirector(source: &SourceKind) -> (Box<dyn Redirector>, OverlayAccess) {
    if let Some(r) = x11_redirector() {
        return (r, OverlayAccess::X11Window);
    }
    let fallback: Box<dyn Redirector> = Box::new(TerminalRedirector::new());
    match source {
        // The X11 source needs a raisable window; leave the permission unmet.
        SourceKind::X11 => (fallback, OverlayAccess::X11Window),
        SourceKind::UsageLog(_) => (fallback, OverlayAccess::Terminal),
    }
}

pub fn build_capabilities(settings: &Settings) -> anyhow::Result<(Capabilities, SourceKind)> {
    let source = resolve_source(&settings.source, settings.usage_log.as_ref(), x11_available());
    tracing::info!(?source, "usage source selected");

    let (redirector, overlay) = redirector(&source);

    let (probe, usage_access) = match &source {
        #[cfg(target_os = "linux")]
        SourceKind::X11 => {
            let probe: Box<dyn ForegroundAppProbe> = Box::new(UsageStatsProbe::new(
                blocker_probe::x11::X11UsageSource::new(),
                SystemClock,
            ));
            (probe, UsageAccess::X11)
        }
        #[cfg(not(target_os = "linux"))]
        SourceKind::X11 => anyhow::bail!("the x11 source is only available on Linux"),
        SourceKind::UsageLog(path) => {
            let probe: Box<dyn ForegroundAppProbe> = Box::new(UsageStatsProbe::new(
                UsageLogSource::new(path.clone(), TimezoneHandler::new(&settings.timezone)),
                SystemClock,
            ));
            (probe, UsageAccess::UsageLog(path.clone()))
        }
    };

    let caps = Capabilities {
        probe,
        permissions: Box::new(DesktopPermissionChecker::new(usage_access, overlay)),
        notifier: Box::new(LogNotifier::new()),
        redirector,
        clock: Box::new(SystemClock),
    };
    Ok((caps, source))
}
