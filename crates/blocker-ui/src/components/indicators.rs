use blocker_core::formatting::format_countdown;
use blocker_core::models::Phase;
use blocker_core::notifications::StatusNotification;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::themes::Theme;

/// Display width of the label column.
pub const LABEL_WIDTH: usize = 22;

/// Pad an emoji + label to [`LABEL_WIDTH`] display columns.
pub fn pad_label(emoji: &str, label: &str) -> String {
    let content = format!("{} {}", emoji, label);
    let width = UnicodeWidthStr::width(content.as_str());
    let padding = LABEL_WIDTH.saturating_sub(width).max(1);
    format!("{}{}", content, " ".repeat(padding))
}

// ── PhaseIndicator ───────────────────────────────────────────────────────────

/// Current monitor phase with a tier emoji and colour.
///
/// | Phase    | Emoji |
/// |----------|-------|
/// | idle     | 🟢    |
/// | active   | 🟡    |
/// | cooldown | 🔴    |
pub struct PhaseIndicator<'a> {
    pub phase: Phase,
    pub paused: bool,
    pub theme: &'a Theme,
}

impl<'a> PhaseIndicator<'a> {
    pub fn new(phase: Phase, paused: bool, theme: &'a Theme) -> Self {
        Self {
            phase,
            paused,
            theme,
        }
    }

    pub fn emoji(&self) -> &'static str {
        if self.paused {
            return "⏸️";
        }
        match self.phase {
            Phase::Idle => "🟢",
            Phase::Active => "🟡",
            Phase::Cooldown => "🔴",
        }
    }

    /// Format: `"🚦 Status:           🟡 active"`
    pub fn to_line(&self) -> Line<'a> {
        let label = if self.paused {
            format!("{} (paused)", self.phase)
        } else {
            self.phase.to_string()
        };
        Line::from(vec![
            Span::styled(pad_label("🚦", "Status:"), self.theme.label),
            Span::raw(self.emoji()),
            Span::raw(" "),
            Span::styled(label, self.theme.phase_style(self.phase)),
        ])
    }
}

// ── CountdownLabel ───────────────────────────────────────────────────────────

/// Cooldown countdown; only rendered while a cooldown is active.
pub struct CountdownLabel<'a> {
    pub remaining: u32,
    pub theme: &'a Theme,
}

impl<'a> CountdownLabel<'a> {
    pub fn new(remaining: u32, theme: &'a Theme) -> Self {
        Self { remaining, theme }
    }

    /// Format: `"⏳ Cooldown:         0:27"`
    pub fn to_line(&self) -> Line<'a> {
        Line::from(vec![
            Span::styled(pad_label("⏳", "Cooldown:"), self.theme.label),
            Span::styled(format_countdown(self.remaining), self.theme.countdown),
        ])
    }
}

// ── NotificationSlot ─────────────────────────────────────────────────────────

/// The single status notification rendered as a title line and a text line.
pub struct NotificationSlot<'a> {
    pub notification: &'a StatusNotification,
    pub theme: &'a Theme,
}

impl<'a> NotificationSlot<'a> {
    pub fn new(notification: &'a StatusNotification, theme: &'a Theme) -> Self {
        Self {
            notification,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(vec![
                Span::raw("🔔 "),
                Span::styled(
                    self.notification.title.clone(),
                    self.theme.notification_title,
                ),
                Span::styled(format!("  #{}", self.notification.id), self.theme.dim),
            ]),
            Line::from(vec![
                Span::raw("   "),
                Span::styled(
                    self.notification.text.clone(),
                    self.theme.notification_text,
                ),
            ]),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
