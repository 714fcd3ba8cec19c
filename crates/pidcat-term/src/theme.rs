use crossterm::style::{Color, ContentStyle};

use pidcat_types::Severity;

/// Color theme for rendered log lines
pub struct Theme;

impl Theme {
    // Base colors
    pub const BG: Color = Color::Black;
    pub const FG: Color = Color::White;

    // Badge text sits on a colored background
    pub const BADGE_FG: Color = Color::Black;

    // Level badge backgrounds
    pub const LEVEL_VERBOSE: Color = Color::Black;
    pub const LEVEL_DEBUG: Color = Color::Blue;
    pub const LEVEL_INFO: Color = Color::Green;
    pub const LEVEL_WARN: Color = Color::Yellow;
    pub const LEVEL_ERROR: Color = Color::Red;

    /// Tag colors, handed out in this order and then recycled
    pub const TAG_PALETTE: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
    ];

    fn style(fg: Color, bg: Color) -> ContentStyle {
        ContentStyle {
            foreground_color: Some(fg),
            background_color: Some(bg),
            ..ContentStyle::default()
        }
    }

    pub fn tag(color: Color) -> ContentStyle {
        Self::style(color, Self::BG)
    }

    pub fn message() -> ContentStyle {
        Self::style(Self::FG, Self::BG)
    }

    /// Badge style for a level; unknown codes look like verbose
    pub fn badge(severity: Severity) -> ContentStyle {
        match severity {
            Severity::Debug => Self::style(Self::BADGE_FG, Self::LEVEL_DEBUG),
            Severity::Info => Self::style(Self::BADGE_FG, Self::LEVEL_INFO),
            Severity::Warning => Self::style(Self::BADGE_FG, Self::LEVEL_WARN),
            Severity::Error | Severity::Fatal => Self::style(Self::BADGE_FG, Self::LEVEL_ERROR),
            Severity::Verbose | Severity::Unranked | Severity::Silent => {
                Self::style(Self::FG, Self::LEVEL_VERBOSE)
            }
        }
    }
}
