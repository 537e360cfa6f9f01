use blocker_core::formatting::{format_countdown, format_seconds, percentage};
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// Configuration controlling visual appearance of a progress bar.
pub struct ProgressBarConfig {
    /// Width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

fn bar_strings(pct: f64, config: &ProgressBarConfig) -> (String, String) {
    let filled = ((pct / 100.0) * config.width as f64) as u16;
    let filled = filled.min(config.width);
    let empty = config.width - filled;
    (
        std::iter::repeat_n(config.filled_char, filled as usize).collect(),
        std::iter::repeat_n(config.empty_char, empty as usize).collect(),
    )
}

// ── ElapsedProgressBar ───────────────────────────────────────────────────────

/// Time spent in a monitored app relative to the redirect threshold.
pub struct ElapsedProgressBar<'a> {
    pub elapsed: u32,
    pub threshold: u32,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> ElapsedProgressBar<'a> {
    pub fn new(elapsed: u32, threshold: u32, theme: &'a Theme) -> Self {
        Self {
            elapsed,
            threshold,
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    pub fn percentage(&self) -> f64 {
        percentage(self.elapsed, self.threshold)
    }

    /// Format: `"[████░░░░] 12s / 20s"`
    pub fn to_line(&self) -> Line<'a> {
        let pct = self.percentage();
        let (filled, empty) = bar_strings(pct, &self.config);
        let label = format!(
            " {} / {}",
            format_seconds(self.elapsed),
            format_seconds(self.threshold)
        );

        Line::from(vec![
            Span::styled("[", self.theme.dim),
            Span::styled(filled, self.theme.progress_style(pct)),
            Span::styled(empty, self.theme.progress_empty),
            Span::styled("]", self.theme.dim),
            Span::styled(label, self.theme.progress_label),
        ])
    }
}

// ── CooldownProgressBar ──────────────────────────────────────────────────────

/// Remaining cooldown; the bar drains as the countdown runs.
pub struct CooldownProgressBar<'a> {
    pub remaining: u32,
    pub total: u32,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> CooldownProgressBar<'a> {
    pub fn new(remaining: u32, total: u32, theme: &'a Theme) -> Self {
        Self {
            remaining,
            total,
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    /// Format: `"[████░░░░] 0:27 left"`
    pub fn to_line(&self) -> Line<'a> {
        let pct = percentage(self.remaining, self.total);
        let (filled, empty) = bar_strings(pct, &self.config);

        Line::from(vec![
            Span::styled("[", self.theme.dim),
            Span::styled(filled, self.theme.countdown),
            Span::styled(empty, self.theme.progress_empty),
            Span::styled("]", self.theme.dim),
            Span::styled(
                format!(" {} left", format_countdown(self.remaining)),
                self.theme.progress_label,
            ),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
