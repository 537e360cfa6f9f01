//! Domain layer for the app blocker.
//!
//! Holds the monitor state machine, the capability traits the runtime is
//! wired with, and the shared error, settings and formatting helpers.

pub mod capabilities;
pub mod error;
pub mod formatting;
pub mod models;
pub mod notifications;
pub mod settings;
pub mod state;
pub mod time_utils;

pub use error::{BlockerError, Result};
