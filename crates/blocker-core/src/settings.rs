use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::models::{is_valid_identifier, MonitoredApps};
use crate::state::MonitorConfig;
use crate::time_utils::TimezoneHandler;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Redirects you away from distracting apps after a fixed time limit
#[derive(Parser, Debug, Clone)]
#[command(
    name = "app-blocker",
    about = "Redirects you away from distracting apps after a fixed time limit",
    version
)]
pub struct Settings {
    /// Application identifier to monitor (repeatable; defaults to the built-in set)
    #[arg(long = "monitored-app", value_name = "ID", value_parser = parse_identifier)]
    pub monitored_apps: Vec<String>,

    /// Seconds in a monitored app before redirecting (1-3600)
    #[arg(long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..=3600))]
    pub threshold_secs: u32,

    /// Cooldown length in seconds after a redirect (1-3600)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..=3600))]
    pub cooldown_secs: u32,

    /// Where foreground-app usage is read from
    #[arg(long, default_value = "auto", value_parser = ["auto", "x11", "log"])]
    pub source: String,

    /// JSONL usage log read by the `log` source
    #[arg(long, env = "APP_BLOCKER_USAGE_LOG")]
    pub usage_log: Option<PathBuf>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Timezone for the status clock (auto-detected if not specified)
    #[arg(long, default_value = "auto", value_parser = parse_timezone)]
    pub timezone: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

fn parse_identifier(raw: &str) -> std::result::Result<String, String> {
    let trimmed = raw.trim();
    if is_valid_identifier(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(format!(
            "'{raw}' is not a valid application identifier (letters, digits, '.', '_', '-')"
        ))
    }
}

fn parse_timezone(raw: &str) -> std::result::Result<String, String> {
    if raw == "auto" || TimezoneHandler::validate_timezone(raw) {
        Ok(raw.to_string())
    } else {
        Err(format!("'{raw}' is not a known IANA timezone"))
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used preferences saved to `~/.app-blocker/last_used.json`.
///
/// Only display and source preferences are kept; the monitored set and the
/// limits always come from the command line.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_log: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".app-blocker").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation: accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "failed to clear saved configuration");
            }
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins; clap keys args by field name.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "source") {
            if let Some(v) = last.source {
                settings.source = v;
            }
        }
        if settings.usage_log.is_none() {
            settings.usage_log = last.usage_log;
        }

        settings = Self::resolve_auto_values(settings);

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::warn!(error = %e, "failed to persist last-used settings");
        }

        settings
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// The monitored set, falling back to the built-in defaults.
    pub fn monitored_apps(&self) -> Result<MonitoredApps> {
        if self.monitored_apps.is_empty() {
            Ok(MonitoredApps::default())
        } else {
            MonitoredApps::new(&self.monitored_apps)
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            threshold_secs: self.threshold_secs,
            cooldown_secs: self.cooldown_secs,
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
            source: Some(s.source.clone()),
            usage_log: s.usage_log.clone(),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            theme: Some("dark".to_string()),
            timezone: Some("Europe/Berlin".to_string()),
            source: Some("log".to_string()),
            usage_log: Some(PathBuf::from("/tmp/usage.jsonl")),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.theme.as_deref(), Some("dark"));
        assert_eq!(loaded.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(loaded.source.as_deref(), Some("log"));
        assert_eq!(loaded.usage_log, Some(PathBuf::from("/tmp/usage.jsonl")));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.theme.is_none());
        assert!(loaded.source.is_none());
        assert!(loaded.usage_log.is_none());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["app-blocker"]);
        assert!(settings.monitored_apps.is_empty());
        assert_eq!(settings.threshold_secs, 20);
        assert_eq!(settings.cooldown_secs, 30);
        assert_eq!(settings.source, "auto");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.timezone, "auto");
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_repeatable_monitored_app() {
        let settings = Settings::parse_from([
            "app-blocker",
            "--monitored-app",
            "firefox",
            "--monitored-app",
            "Slack",
        ]);
        let apps = settings.monitored_apps().unwrap();
        assert_eq!(apps.len(), 2);
        assert!(apps.contains("firefox"));
        assert!(!apps.contains("com.instagram.android"));
    }

    #[test]
    fn test_settings_default_monitored_set() {
        let settings = Settings::parse_from(["app-blocker"]);
        assert_eq!(settings.monitored_apps().unwrap(), MonitoredApps::default());
    }

    #[test]
    fn test_settings_rejects_invalid_identifier() {
        let result = Settings::try_parse_from(["app-blocker", "--monitored-app", "bad app"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_threshold_range() {
        assert!(Settings::try_parse_from(["app-blocker", "--threshold-secs", "0"]).is_err());
        let settings = Settings::parse_from(["app-blocker", "--threshold-secs", "45"]);
        assert_eq!(settings.monitor_config().threshold_secs, 45);
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_theme() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            timezone: Some("UTC".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["app-blocker".into()], &config_path);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.timezone, "UTC");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            source: Some("log".to_string()),
            timezone: Some("UTC".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["app-blocker".into(), "--source".into(), "x11".into()],
            &config_path,
        );
        assert_eq!(settings.source, "x11");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        Settings::load_with_last_used_impl(
            vec!["app-blocker".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["app-blocker".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec![
                "app-blocker".into(),
                "--theme".into(),
                "light".into(),
                "--threshold-secs".into(),
                "5".into(),
            ],
            &config_path,
        );

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.theme.as_deref(), Some("light"));
        let raw = std::fs::read_to_string(&config_path).unwrap();
        assert!(!raw.contains("threshold"), "limits must not be persisted");
    }

    #[test]
    fn test_timezone_argument_validated() {
        let ok = Settings::try_parse_from(["app-blocker", "--timezone", "Asia/Tokyo"]).unwrap();
        assert_eq!(ok.timezone, "Asia/Tokyo");

        let auto = Settings::try_parse_from(["app-blocker"]).unwrap();
        assert_eq!(auto.timezone, "auto");

        assert!(Settings::try_parse_from(["app-blocker", "--timezone", "Mars/Olympus"]).is_err());
    }
}
