use blocker_core::models::Phase;
use ratatui::style::{Color, Modifier, Style};

/// The handful of colours a theme is derived from.
#[derive(Debug, Clone, Copy)]
struct Palette {
    accent: Color,
    sparkle: Color,
    fg: Color,
    muted: Color,
    soft: Color,
    bold: bool,
}

const DARK: Palette = Palette {
    accent: Color::Cyan,
    sparkle: Color::Yellow,
    fg: Color::White,
    muted: Color::DarkGray,
    soft: Color::Gray,
    bold: true,
};

const LIGHT: Palette = Palette {
    accent: Color::Blue,
    sparkle: Color::Magenta,
    fg: Color::Black,
    muted: Color::Gray,
    soft: Color::DarkGray,
    bold: true,
};

const CLASSIC: Palette = Palette {
    accent: Color::Cyan,
    sparkle: Color::White,
    fg: Color::White,
    muted: Color::DarkGray,
    soft: Color::Gray,
    bold: false,
};

/// Styles used by the status screen.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub header_sparkle: Style,
    pub separator: Style,

    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    pub progress_empty: Style,
    pub progress_label: Style,

    pub countdown: Style,
    pub notification_title: Style,
    pub notification_text: Style,
    pub key_hint: Style,
}

impl Theme {
    fn from_palette(p: Palette) -> Self {
        let emphasis = |style: Style| {
            if p.bold {
                style.add_modifier(Modifier::BOLD)
            } else {
                style
            }
        };
        let fg = |color: Color| Style::default().fg(color);

        Self {
            header: emphasis(fg(p.accent)),
            header_sparkle: fg(p.sparkle),
            separator: fg(p.muted),

            text: fg(p.fg),
            dim: fg(p.muted),
            label: fg(p.soft),
            value: emphasis(fg(p.fg)),

            info: fg(p.accent),
            success: fg(Color::Green),
            warning: fg(Color::Yellow),
            error: fg(Color::Red),

            progress_empty: fg(p.muted),
            progress_label: fg(p.soft),

            countdown: emphasis(fg(Color::Magenta)),
            notification_title: emphasis(fg(p.accent)),
            notification_text: fg(p.fg),
            key_hint: fg(p.muted),
        }
    }

    pub fn dark() -> Self {
        Self::from_palette(DARK)
    }

    pub fn light() -> Self {
        Self::from_palette(LIGHT)
    }

    /// 8-colour palette, no bold.
    pub fn classic() -> Self {
        Self::from_palette(CLASSIC)
    }

    /// Light theme when `COLORFGBG` reports a light background (7-15),
    /// dark otherwise.
    pub fn auto_detect() -> Self {
        let light = std::env::var("COLORFGBG")
            .ok()
            .and_then(|v| v.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
            .is_some_and(|bg| bg > 6);
        if light {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    /// Bar fill colour: green under half the limit, yellow under 80 %, red after.
    pub fn progress_style(&self, percentage: f64) -> Style {
        if percentage >= 80.0 {
            self.error
        } else if percentage >= 50.0 {
            self.warning
        } else {
            self.success
        }
    }

    pub fn phase_style(&self, phase: Phase) -> Style {
        match phase {
            Phase::Idle => self.success,
            Phase::Active => self.warning,
            Phase::Cooldown => self.error,
        }
    }
}
