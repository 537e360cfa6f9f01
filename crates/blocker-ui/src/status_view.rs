//! Status screen for the app blocker.
//!
//! Everything is drawn as a single [`Paragraph`]; the line builders are
//! public so tests can inspect the text without a terminal.

use blocker_core::formatting::format_seconds;
use blocker_core::models::Permission;
use blocker_runtime::monitor::StatusSnapshot;
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::components::header::Header;
use crate::components::indicators::{
    pad_label, CountdownLabel, NotificationSlot, PhaseIndicator, LABEL_WIDTH,
};
use crate::components::progress_bar::{CooldownProgressBar, ElapsedProgressBar};
use crate::themes::Theme;

pub const KEY_HINTS: &str = "[s] start  [p] pause  [r] resume  [q] quit";

/// All data required to render the status view.
pub struct StatusViewData {
    pub snapshot: StatusSnapshot,
    /// Monitored identifiers, sorted.
    pub apps: Vec<String>,
    pub timezone: String,
    /// Formatted wall-clock time.
    pub current_time: String,
    /// Formatted time of the last redirect, if any.
    pub last_redirect: Option<String>,
    /// Whether the last redirect happened moments ago.
    pub recently_redirected: bool,
}

// ── Main render ───────────────────────────────────────────────────────────────

pub fn render_status_view(frame: &mut Frame, area: Rect, data: &StatusViewData, theme: &Theme) {
    let lines = build_status_lines(data, theme);
    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.separator)
            .title(" App Blocker "),
    );
    frame.render_widget(paragraph, area);
}

pub fn build_status_lines<'a>(data: &'a StatusViewData, theme: &'a Theme) -> Vec<Line<'a>> {
    let snap = &data.snapshot;
    let mut lines =
        Header::new(data.apps.len(), &data.timezone, &data.current_time, theme).to_lines();

    lines.push(PhaseIndicator::new(snap.phase, snap.paused, theme).to_line());

    let monitored = snap
        .foreground
        .as_deref()
        .is_some_and(|fg| data.apps.iter().any(|a| a == fg));
    let (fg_text, fg_style) = match snap.foreground.as_deref() {
        Some(fg) if monitored => (fg.to_string(), theme.warning),
        Some(fg) => (fg.to_string(), theme.value),
        None => ("—".to_string(), theme.dim),
    };
    lines.push(Line::from(vec![
        Span::styled(pad_label("📱", "Foreground:"), theme.label),
        Span::styled(fg_text, fg_style),
    ]));

    let mut elapsed_row = vec![Span::styled(pad_label("⏱️", "Time in app:"), theme.label)];
    elapsed_row.extend(
        ElapsedProgressBar::new(snap.elapsed, snap.threshold_secs, theme)
            .to_line()
            .spans,
    );
    lines.push(Line::from(elapsed_row));

    if snap.paused_time > 0 {
        lines.push(Line::from(vec![
            Span::styled(pad_label("💾", "Paused at:"), theme.label),
            Span::styled(format_seconds(snap.paused_time), theme.value),
        ]));
    }

    // Countdown label only exists while a cooldown is running.
    if let Some(remaining) = snap.cooldown_remaining {
        lines.push(CountdownLabel::new(remaining, theme).to_line());
        let mut bar_row = vec![Span::raw(" ".repeat(LABEL_WIDTH))];
        bar_row.extend(
            CooldownProgressBar::new(remaining, snap.cooldown_secs, theme)
                .to_line()
                .spans,
        );
        lines.push(Line::from(bar_row));
    }

    let mut redirect_row = vec![
        Span::styled(pad_label("🔁", "Redirects:"), theme.label),
        Span::styled(snap.redirects.to_string(), theme.value),
    ];
    if let Some(at) = &data.last_redirect {
        redirect_row.push(Span::styled(format!("  (last at {})", at), theme.dim));
    }
    lines.push(Line::from(redirect_row));
    lines.push(Line::from(""));

    lines.extend(NotificationSlot::new(&snap.notification, theme).to_lines());
    lines.push(Line::from(""));

    if data.recently_redirected {
        lines.push(Line::from(Span::styled(
            "⛔ Time limit reached. Take a break from that app.",
            theme.error,
        )));
        lines.push(Line::from(""));
    }

    if !snap.monitoring {
        lines.push(Line::from(Span::styled(
            "Press 's' to start monitoring",
            theme.info,
        )));
    } else if snap.paused {
        lines.push(Line::from(Span::styled(
            "Monitoring paused. Press 'r' to resume",
            theme.warning,
        )));
    }

    lines.push(Line::from(vec![
        Span::styled("Monitored: ", theme.label),
        Span::styled(data.apps.join(", "), theme.dim),
    ]));
    lines.push(Line::from(Span::styled(KEY_HINTS, theme.key_hint)));

    lines
}

// ── Other screens ─────────────────────────────────────────────────────────────

/// Guidance shown after a start attempt stopped on a missing permission.
pub fn build_permission_lines(permission: Permission, theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Permission required: {}", permission),
            theme.error,
        )),
        Line::from(""),
        Line::from(Span::styled(permission.guidance(), theme.text)),
        Line::from(""),
        Line::from(Span::styled(
            "Press 's' to check again, or 'q' to exit",
            theme.info,
        )),
    ]
}

pub fn render_permission_required(
    frame: &mut Frame,
    area: Rect,
    permission: Permission,
    theme: &Theme,
) {
    let paragraph = Paragraph::new(Text::from(build_permission_lines(permission, theme)))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.error)
                .title(" Permission Required "),
        );
    frame.render_widget(paragraph, area);
}

/// Shown until the monitor task delivers its first snapshot.
pub fn render_waiting(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Starting monitor...", theme.dim)),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    let paragraph = Paragraph::new(Text::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" App Blocker "),
    );
    frame.render_widget(paragraph, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
