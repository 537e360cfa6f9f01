use std::path::PathBuf;
use thiserror::Error;

use crate::models::Permission;

/// All errors produced by the app blocker.
#[derive(Error, Debug)]
pub enum BlockerError {
    /// A host permission required to monitor or redirect is missing.
    #[error("Permission not granted: {0}")]
    PermissionDenied(Permission),

    /// The usage-history source could not be queried.
    #[error("Usage source error: {0}")]
    UsageSource(String),

    /// The JSONL usage log could not be opened or read.
    #[error("Failed to read usage log {path}: {source}")]
    UsageLogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A monitored application identifier is not well formed.
    #[error("Invalid application identifier: {0}")]
    InvalidIdentifier(String),

    /// The blocker window could not be brought to the foreground.
    #[error("Redirect failed: {0}")]
    Redirect(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the blocker crates.
pub type Result<T> = std::result::Result<T, BlockerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_permission_denied() {
        let err = BlockerError::PermissionDenied(Permission::Overlay);
        assert_eq!(err.to_string(), "Permission not granted: overlay");
    }

    #[test]
    fn test_error_display_usage_log_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = BlockerError::UsageLogRead {
            path: PathBuf::from("/tmp/usage.jsonl"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read usage log"));
        assert!(msg.contains("/tmp/usage.jsonl"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_usage_source() {
        let err = BlockerError::UsageSource("display closed".to_string());
        assert_eq!(err.to_string(), "Usage source error: display closed");
    }

    #[test]
    fn test_error_display_invalid_identifier() {
        let err = BlockerError::InvalidIdentifier("bad app".to_string());
        assert_eq!(err.to_string(), "Invalid application identifier: bad app");
    }

    #[test]
    fn test_error_display_redirect() {
        let err = BlockerError::Redirect("window 0x1 gone".to_string());
        assert_eq!(err.to_string(), "Redirect failed: window 0x1 gone");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BlockerError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
