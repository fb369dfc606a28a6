//! Tool block chrome: title, description, badges and remove/configure hints.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::designer::{ChromeAction, ToolBlock};
use crate::tui::Theme;

/// How a block is highlighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockHighlight {
    /// Cursor is on this block
    pub selected: bool,
    /// This block is being dragged
    pub dragging: bool,
    /// The drag is hovering over this block
    pub drop_target: bool,
}

fn chrome_hint(action: ChromeAction) -> (&'static str, &'static str) {
    match action {
        ChromeAction::Configure => ("e", " configure"),
        ChromeAction::Remove => ("x", " remove"),
    }
}

fn badge_spans(block: &ToolBlock, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(block.badges.len() * 2);
    for (i, badge) in block.badges.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("[{}]", badge.label),
            Style::default().fg(theme.badge_color(badge.tone)),
        ));
    }
    spans
}

/// Renders one tool block inside `area`.
pub fn render_tool_block(
    f: &mut Frame,
    area: Rect,
    block: &ToolBlock,
    highlight: BlockHighlight,
    theme: &Theme,
) {
    let border_color = if highlight.drop_target {
        theme.accent
    } else if highlight.selected {
        theme.primary
    } else {
        theme.text_muted
    };
    let border_type = if highlight.dragging {
        BorderType::Double
    } else {
        BorderType::Rounded
    };

    let mut title = vec![Span::styled(
        format!(" {} {} ", block.meta.icon, block.meta.title),
        Style::default()
            .fg(theme.text)
            .add_modifier(Modifier::BOLD),
    )];
    if highlight.selected {
        for action in ToolBlock::ACTIONS {
            let (key, label) = chrome_hint(action);
            title.push(Span::styled(
                format!("[{key}]"),
                Style::default().fg(theme.primary),
            ));
            title.push(Span::styled(
                format!("{label} "),
                Style::default().fg(theme.text_muted),
            ));
        }
    }

    let frame = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color))
        .title(Line::from(title));

    let mut lines = vec![Line::from(badge_spans(block, theme))];
    if area.height > 3 {
        lines.push(Line::from(Span::styled(
            block.meta.description,
            Style::default().fg(theme.text_secondary),
        )));
    }

    let body = Paragraph::new(lines).block(frame);
    f.render_widget(body, area);
}
