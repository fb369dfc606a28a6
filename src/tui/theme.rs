//! Colors of the editor for dark and light terminals.
//!
//! [`Theme::from_mode`] resolves the configured `ui.theme_mode`; `auto` asks
//! the OS through `dark-light`.

use ratatui::style::Color;

use crate::config::ThemeMode;
use crate::designer::{BadgeTone, StatusAccent};
use crate::models::BalloonColor;
use crate::services::NoticeLevel;

/// Semantic colors used by every widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Borders, titles, selected stage
    pub primary: Color,
    /// Focus, drag target and key hints
    pub accent: Color,
    /// Confirmed operations
    pub success: Color,
    /// Validation and transport failures
    pub error: Color,
    /// Pending operations and unsaved markers
    pub warning: Color,

    /// Body text
    pub text: Color,
    /// Labels
    pub text_secondary: Color,
    /// Help lines and placeholders
    pub text_muted: Color,

    /// Screen background
    pub background: Color,

    /// Border of completed stages
    pub emerald: Color,
    /// Border of stages in progress
    pub indigo: Color,
    /// Border of pending stages
    pub neutral: Color,
}

impl Theme {
    /// Theme matching the OS appearance; dark when it cannot be detected.
    #[must_use]
    pub fn detect() -> Self {
        match dark_light::detect() {
            Ok(dark_light::Mode::Light) => Self::light(),
            Ok(dark_light::Mode::Dark | dark_light::Mode::Unspecified) | Err(_) => Self::dark(),
        }
    }

    /// Resolves the configured theme mode.
    #[must_use]
    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Auto => Self::detect(),
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Palette for dark terminals.
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            primary: Color::Cyan,
            accent: Color::Yellow,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,

            text: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,

            background: Color::Black,

            emerald: Color::Rgb(52, 211, 153),
            indigo: Color::Rgb(129, 140, 248),
            neutral: Color::Gray,
        }
    }

    /// Palette for light terminals.
    ///
    /// Accent and status colors are darkened for contrast on white.
    #[must_use]
    pub const fn light() -> Self {
        Self {
            primary: Color::Blue,
            accent: Color::Rgb(180, 100, 0),
            success: Color::Rgb(0, 128, 0),
            error: Color::Red,
            warning: Color::Rgb(200, 100, 0),

            text: Color::Black,
            text_secondary: Color::Rgb(60, 60, 60),
            text_muted: Color::Gray,

            background: Color::White,

            emerald: Color::Rgb(4, 120, 87),
            indigo: Color::Rgb(67, 56, 202),
            neutral: Color::Rgb(120, 120, 120),
        }
    }

    /// Border color for a stage status accent.
    #[must_use]
    pub const fn status_color(&self, accent: StatusAccent) -> Color {
        match accent {
            StatusAccent::Emerald => self.emerald,
            StatusAccent::Indigo => self.indigo,
            StatusAccent::Neutral => self.neutral,
        }
    }

    /// Text color of a tool badge.
    #[must_use]
    pub const fn badge_color(&self, tone: BadgeTone) -> Color {
        match tone {
            BadgeTone::Neutral => self.text_secondary,
            BadgeTone::Success => self.success,
            BadgeTone::Warning => self.warning,
        }
    }

    /// Color of a notice in the status bar.
    #[must_use]
    pub const fn notice_color(&self, level: NoticeLevel) -> Color {
        match level {
            NoticeLevel::Success => self.success,
            NoticeLevel::Info => self.text,
            NoticeLevel::Error => self.error,
        }
    }

    /// Terminal color of a balloon.
    #[must_use]
    pub const fn balloon_color(color: BalloonColor) -> Color {
        let (r, g, b) = color.rgb();
        Color::Rgb(r, g, b)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_accent_is_readable() {
        let theme = Theme::light();
        assert_eq!(theme.background, Color::White);
        // Yellow is unreadable on white
        assert_ne!(theme.accent, Color::Yellow);
    }

    #[test]
    fn test_theme_from_mode() {
        assert_eq!(Theme::from_mode(ThemeMode::Dark), Theme::dark());
        assert_eq!(Theme::from_mode(ThemeMode::Light), Theme::light());
        let auto = Theme::from_mode(ThemeMode::Auto);
        assert!(auto == Theme::dark() || auto == Theme::light());
    }

    #[test]
    fn test_status_colors_are_distinct() {
        for theme in [Theme::dark(), Theme::light()] {
            let colors = [
                theme.status_color(StatusAccent::Emerald),
                theme.status_color(StatusAccent::Indigo),
                theme.status_color(StatusAccent::Neutral),
            ];
            assert_ne!(colors[0], colors[1]);
            assert_ne!(colors[1], colors[2]);
            assert_ne!(colors[0], colors[2]);
        }
    }

    #[test]
    fn test_error_notices_use_error_color() {
        let theme = Theme::dark();
        assert_eq!(theme.notice_color(NoticeLevel::Error), theme.error);
        assert_eq!(theme.notice_color(NoticeLevel::Success), theme.success);
    }

    #[test]
    fn test_balloon_color_uses_palette_rgb() {
        let (r, g, b) = BalloonColor::Amber.rgb();
        assert_eq!(Theme::balloon_color(BalloonColor::Amber), Color::Rgb(r, g, b));
    }
}
