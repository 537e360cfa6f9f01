//! Terminal UI layer for the app blocker.
//!
//! Provides themes, header/progress/indicator components, the status view,
//! and the main event loop built on [`ratatui`].

pub mod app;
pub mod components;
pub mod status_view;
pub mod themes;

pub use blocker_core as core;
