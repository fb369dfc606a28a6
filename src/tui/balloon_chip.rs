//! Balloon chips: a balloon drawn as a colored label.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::models::BalloonItem;
use crate::tui::Theme;

/// Text of a chip: icon glyph (if any) followed by the label.
#[must_use]
pub fn chip_text(item: &BalloonItem) -> String {
    match item.icon {
        Some(icon) => format!(" {} {} ", icon.glyph(), item.label),
        None => format!(" {} ", item.label),
    }
}

/// One balloon as a span on its palette color.
#[must_use]
pub fn balloon_span(item: &BalloonItem, theme: &Theme, selected: bool) -> Span<'static> {
    let mut style = Style::default()
        .fg(theme.background)
        .bg(Theme::balloon_color(item.color));
    if selected {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    Span::styled(chip_text(item), style)
}

/// A row of chips separated by single spaces.
#[must_use]
pub fn balloon_line(items: &[BalloonItem], theme: &Theme) -> Line<'static> {
    if items.is_empty() {
        return Line::from(Span::styled(
            "(no balloons)",
            Style::default().fg(theme.text_muted),
        ));
    }
    let mut spans = Vec::with_capacity(items.len() * 2);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(balloon_span(item, theme, false));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BalloonColor, BalloonIcon};

    #[test]
    fn test_chip_text_with_and_without_icon() {
        let plain = BalloonItem::new("Urgente");
        assert_eq!(chip_text(&plain), " Urgente ");

        let flagged = BalloonItem::new("Urgente").with_icon(Some(BalloonIcon::Flag));
        assert_eq!(chip_text(&flagged), format!(" {} Urgente ", BalloonIcon::Flag.glyph()));
    }

    #[test]
    fn test_span_uses_balloon_color() {
        let theme = Theme::dark();
        let item = BalloonItem::new("Rotineiro").with_color(BalloonColor::Sky);
        let span = balloon_span(&item, &theme, false);
        assert_eq!(span.style.bg, Some(Theme::balloon_color(BalloonColor::Sky)));
    }

    #[test]
    fn test_line_joins_chips() {
        let theme = Theme::dark();
        let items = vec![BalloonItem::new("A1"), BalloonItem::new("B2")];
        let line = balloon_line(&items, &theme);
        assert_eq!(line.spans.len(), 3);

        let empty = balloon_line(&[], &theme);
        assert_eq!(empty.spans.len(), 1);
    }
}
