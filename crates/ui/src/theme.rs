use dispatch_core::Priority;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::state::FeedStatus;

/// Iceberg color theme for the dispatch console
///
/// Based on iceberg.vim color scheme (https://github.com/cocopon/iceberg.vim)
#[derive(Debug, Clone, Copy)]
pub struct Theme;

impl Theme {
    /// Primary background: deep blue-black (fills terminal)
    pub const BG: Color = Color::Rgb(22, 24, 33);

    /// Foreground: light blue-gray (primary text)
    pub const FG: Color = Color::Rgb(198, 200, 209);

    /// Secondary background: lighter blue-black (drawer, cards)
    pub const PANEL_BG: Color = Color::Rgb(30, 33, 50);

    /// Selected row
    pub const ACTIVE: Color = Color::Rgb(39, 44, 66);

    /// Primary accent: blue
    pub const BLUE: Color = Color::Rgb(132, 160, 198);

    /// Secondary accent: cyan
    pub const CYAN: Color = Color::Rgb(137, 184, 194);

    /// Tertiary accent: purple
    pub const PURPLE: Color = Color::Rgb(160, 147, 199);

    pub const GREEN: Color = Color::Rgb(180, 190, 130);

    pub const YELLOW: Color = Color::Rgb(226, 164, 120);

    pub const RED: Color = Color::Rgb(226, 120, 120);

    /// Muted text: dimmed foreground
    pub const MUTED: Color = Color::Rgb(107, 112, 137);

    pub const BORDER: Color = Color::Rgb(60, 65, 90);

    /// Base style for all text
    pub fn base() -> Style {
        Style::default().fg(Self::FG).bg(Self::BG)
    }

    pub fn primary() -> Style {
        Style::default().fg(Self::BLUE).bg(Self::BG)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::RED).bg(Self::BG)
    }

    /// Muted style (for secondary text)
    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED).bg(Self::BG)
    }

    pub fn panel() -> Style {
        Style::default().fg(Self::FG).bg(Self::PANEL_BG)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    /// Active (selected) style
    pub fn active() -> Style {
        Style::default().fg(Self::FG).bg(Self::ACTIVE).add_modifier(Modifier::BOLD)
    }

    /// Severity color, P1 hottest
    pub fn priority_color(priority: Priority) -> Color {
        match priority {
            Priority::P1 => Self::RED,
            Priority::P2 => Self::YELLOW,
            Priority::P3 => Self::BLUE,
            Priority::P4 => Self::MUTED,
        }
    }

    /// Get span with priority styling
    pub fn priority_span(priority: Priority) -> Span<'static> {
        Span::styled(
            priority.as_str(),
            Style::default().fg(Self::priority_color(priority)).add_modifier(Modifier::BOLD),
        )
    }

    /// Get feed status color
    pub fn feed_status_color(status: &FeedStatus) -> Color {
        match status {
            FeedStatus::Live => Self::GREEN,
            FeedStatus::Loading | FeedStatus::Connecting => Self::CYAN,
            FeedStatus::Closed => Self::MUTED,
            FeedStatus::Offline(_) => Self::YELLOW,
            FeedStatus::Failed(_) => Self::RED,
        }
    }

    /// Get span with feed status styling
    pub fn feed_status_span(status: &FeedStatus) -> Span<'static> {
        Span::styled(status.label(), Style::default().fg(Self::feed_status_color(status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_values() {
        assert!(matches!(Theme::BG, Color::Rgb(_, _, _)));
        assert!(matches!(Theme::FG, Color::Rgb(_, _, _)));
        assert!(matches!(Theme::PANEL_BG, Color::Rgb(_, _, _)));
    }

    #[test]
    fn test_priority_colors() {
        assert_eq!(Theme::priority_color(Priority::P1), Theme::RED);
        assert_eq!(Theme::priority_color(Priority::P2), Theme::YELLOW);
        assert_eq!(Theme::priority_color(Priority::P3), Theme::BLUE);
        assert_eq!(Theme::priority_color(Priority::P4), Theme::MUTED);
        assert_eq!(Theme::priority_span(Priority::P1).content, "P1");
    }

    #[test]
    fn test_feed_status_colors() {
        assert_eq!(Theme::feed_status_color(&FeedStatus::Live), Theme::GREEN);
        assert_eq!(Theme::feed_status_color(&FeedStatus::Offline("reset".to_string())), Theme::YELLOW);
        assert_eq!(Theme::feed_status_color(&FeedStatus::Failed("bad".to_string())), Theme::RED);
    }

    #[test]
    fn test_styles() {
        let base = Theme::base();
        assert_eq!(base.fg, Some(Theme::FG));
        assert_eq!(base.bg, Some(Theme::BG));

        let panel = Theme::panel();
        assert_eq!(panel.fg, Some(Theme::FG));
        assert_eq!(panel.bg, Some(Theme::PANEL_BG));
    }
}
