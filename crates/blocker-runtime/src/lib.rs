//! Runtime layer for the app blocker.
//!
//! Drives the monitor state machine on tokio timers and forwards status
//! snapshots to the UI.

pub mod monitor;
pub mod scheduler;

pub use blocker_core as core;
