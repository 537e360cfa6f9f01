//! Foreground-app detection and host integration for the app blocker.
//!
//! Usage history comes from a [`usage::UsageSource`] (an X11 sampler or a
//! JSONL usage log); [`usage::UsageStatsProbe`] turns the most recent window
//! of history into a single foreground application. Permission checks and
//! redirectors for the desktop live alongside.

pub mod permissions;
pub mod redirect;
pub mod usage;
pub mod usage_log;
#[cfg(target_os = "linux")]
pub mod x11;

pub use blocker_core as core;
