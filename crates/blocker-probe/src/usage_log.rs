//! JSONL usage-log source.
//!
//! Each line of the log is one object:
//!
//! ```text
//! {"package": "org.mozilla.firefox", "last_time_used": "2024-03-01T12:00:05Z"}
//! ```
//!
//! The file is read incrementally; only lines appended since the previous
//! query are parsed. Malformed lines are skipped.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use blocker_core::error::{BlockerError, Result};
use blocker_core::models::{is_valid_identifier, UsageRecord};
use blocker_core::time_utils::TimezoneHandler;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::usage::UsageSource;

#[derive(Debug, Deserialize)]
struct LogLine {
    package: String,
    last_time_used: String,
}

/// [`UsageSource`] backed by an append-only JSONL file.
pub struct UsageLogSource {
    path: PathBuf,
    tz: TimezoneHandler,
    offset: u64,
    latest: HashMap<String, DateTime<Utc>>,
}

impl UsageLogSource {
    /// `tz` is used for timestamps written without an offset.
    pub fn new(path: impl Into<PathBuf>, tz: TimezoneHandler) -> Self {
        Self {
            path: path.into(),
            tz,
            offset: 0,
            latest: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse any lines appended since the last call.
    fn refresh(&mut self) -> Result<()> {
        let read_err = |source| BlockerError::UsageLogRead {
            path: self.path.clone(),
            source,
        };

        let mut file = std::fs::File::open(&self.path).map_err(read_err)?;
        let len = file.metadata().map_err(read_err)?.len();

        if len < self.offset {
            debug!(path = %self.path.display(), "usage log truncated; rereading");
            self.offset = 0;
            self.latest.clear();
        }
        if len == self.offset {
            return Ok(());
        }

        file.seek(SeekFrom::Start(self.offset)).map_err(read_err)?;
        let mut reader = BufReader::new(file);
        let mut line = String::new();
        let mut parsed = 0usize;
        let mut skipped = 0usize;

        loop {
            line.clear();
            let n = reader.read_line(&mut line).map_err(read_err)?;
            if n == 0 {
                break;
            }
            // A partial trailing line is left for the next refresh.
            if !line.ends_with('\n') {
                break;
            }
            self.offset += n as u64;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match self.parse_line(trimmed) {
                Some(record) => {
                    parsed += 1;
                    let slot = self
                        .latest
                        .entry(record.package)
                        .or_insert(record.last_time_used);
                    if record.last_time_used > *slot {
                        *slot = record.last_time_used;
                    }
                }
                None => skipped += 1,
            }
        }

        debug!(
            path = %self.path.display(),
            parsed,
            skipped,
            "usage log refreshed"
        );
        Ok(())
    }

    fn parse_line(&self, line: &str) -> Option<UsageRecord> {
        let raw: LogLine = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                debug!("Skipping malformed usage log line: {}", e);
                return None;
            }
        };
        let package = raw.package.trim();
        if !is_valid_identifier(package) {
            debug!("Skipping usage log line with bad package {:?}", raw.package);
            return None;
        }
        let ts = self.tz.parse_timestamp(&raw.last_time_used)?;
        Some(UsageRecord::new(package, ts))
    }
}

impl UsageSource for UsageLogSource {
    fn query_usage(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>> {
        self.refresh()?;
        Ok(self
            .latest
            .iter()
            .filter(|(_, ts)| **ts >= start && **ts <= end)
            .map(|(pkg, ts)| UsageRecord::new(pkg.clone(), *ts))
            .collect())
    }
}

/// Whether `path` exists and can be opened for reading.
pub fn is_readable(path: &Path) -> bool {
    path.is_file() && std::fs::File::open(path).is_ok()
}

/// Default usage-log location: `~/.app-blocker/usage.jsonl`.
pub fn default_usage_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".app-blocker")
        .join("usage.jsonl")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
