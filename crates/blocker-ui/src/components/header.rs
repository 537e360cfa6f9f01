use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative sparkle string placed either side of the application title.
pub const SPARKLES: &str = "✦ ✧ ✦ ✧";

/// Status screen header rendering four lines:
///
/// 1. Application title with sparkle decorations.
/// 2. A 60-column `=` separator.
/// 3. Monitored-app count, timezone and clock as `[ 4 apps | UTC | 12:00:05 ]`.
/// 4. An empty line.
pub struct Header<'a> {
    pub app_count: usize,
    pub timezone: &'a str,
    pub clock: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(app_count: usize, timezone: &'a str, clock: &'a str, theme: &'a Theme) -> Self {
        Self {
            app_count,
            timezone,
            clock,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);
        let apps = if self.app_count == 1 {
            "1 app".to_string()
        } else {
            format!("{} apps", self.app_count)
        };

        vec![
            Line::from(vec![
                Span::styled(SPARKLES, self.theme.header_sparkle),
                Span::styled(" APP BLOCKER ", self.theme.header),
                Span::styled(SPARKLES, self.theme.header_sparkle),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(apps, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.timezone.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.clock.to_string(), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let lines = Header::new(4, "UTC", "12:00:00", &theme).to_lines();
        assert_eq!(lines.len(), 4, "header must produce exactly 4 lines");
    }

    #[test]
    fn test_header_title_line_content() {
        let theme = Theme::dark();
        let lines = Header::new(4, "UTC", "12:00:00", &theme).to_lines();
        let title = text(&lines[0]);
        assert!(title.contains("APP BLOCKER"), "got: {title}");
        assert!(title.contains(SPARKLES), "got: {title}");
    }

    #[test]
    fn test_header_separator_line() {
        let theme = Theme::dark();
        let lines = Header::new(4, "UTC", "12:00:00", &theme).to_lines();
        let sep = text(&lines[1]);
        assert_eq!(sep.chars().count(), 60);
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_header_info_line() {
        let theme = Theme::dark();
        let lines = Header::new(4, "Europe/Berlin", "09:30:15", &theme).to_lines();
        assert_eq!(text(&lines[2]), "[ 4 apps | Europe/Berlin | 09:30:15 ]");
    }

    #[test]
    fn test_header_singular_app() {
        let theme = Theme::dark();
        let lines = Header::new(1, "UTC", "00:00:00", &theme).to_lines();
        assert!(text(&lines[2]).starts_with("[ 1 app |"));
    }
}
