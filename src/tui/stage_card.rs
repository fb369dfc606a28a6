//! Stage card preview.
//!
//! Draws the card as it would appear in the workflow: status-colored border,
//! one or two columns sized by the layout mode, and a tool block per placed
//! tool. Density and scale change block height; guides outline the columns.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::designer::{status_visual, DragState, DropTarget, ToolBlock};
use crate::models::{Column, Density, ModelStage, StageLayout, ToolKind};
use crate::tui::tool_block::{render_tool_block, BlockHighlight};
use crate::tui::Theme;

/// Everything the preview needs.
#[derive(Debug, Clone, Copy)]
pub struct StageCardView<'a> {
    /// Stage draft
    pub stage: &'a ModelStage,
    /// Layout draft
    pub layout: &'a StageLayout,
    /// Current drag, if any
    pub drag: &'a DragState,
    /// Tool under the cursor
    pub selected: Option<ToolKind>,
}

/// Height of one tool block in rows.
#[must_use]
pub fn block_height(density: Density, scale: f32) -> u16 {
    let base = match density {
        Density::Cozy => 5.0,
        Density::Compact => 3.0,
    };
    // scale is clamped to [0.5, 2.0] so the product fits comfortably in u16
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rows = (base * scale).round() as u16;
    rows.max(3)
}

/// Rows between blocks.
#[must_use]
pub const fn block_gap(density: Density) -> u16 {
    match density {
        Density::Cozy => 1,
        Density::Compact => 0,
    }
}

/// Splits the card body into its active columns.
#[must_use]
pub fn column_areas(area: Rect, layout: &StageLayout) -> Vec<(Column, Rect)> {
    let (left, right) = layout.mode.column_percentages();
    if right == 0 {
        return vec![(Column::Stack, area)];
    }
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(left), Constraint::Percentage(right)])
        .split(area);
    vec![(Column::Left, chunks[0]), (Column::Right, chunks[1])]
}

fn column_label(column: Column) -> &'static str {
    match column {
        Column::Stack => "stack",
        Column::Left => "left",
        Column::Right => "right",
    }
}

/// Renders the whole card.
pub fn render_stage_card(f: &mut Frame, area: Rect, view: StageCardView<'_>, theme: &Theme) {
    let visual = status_visual(view.stage.status);
    let border_color = theme.status_color(visual.accent);

    let mut glyph_style = Style::default().fg(border_color).add_modifier(Modifier::BOLD);
    if visual.pulsing {
        glyph_style = glyph_style.add_modifier(Modifier::SLOW_BLINK);
    }

    let title = Line::from(vec![
        Span::raw(" "),
        Span::styled(visual.glyph, glyph_style),
        Span::styled(
            format!(" {} ", view.stage.title),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ]);

    let card = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(border_color))
        .title(title);
    let inner = card.inner(area);
    f.render_widget(card, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let subtitle = Line::from(vec![Span::styled(
        format!(
            "{} · {} days · {} · {} · {:.0}%",
            if view.stage.department.is_empty() {
                "no department"
            } else {
                view.stage.department.as_str()
            },
            view.stage.days,
            view.stage.status,
            view.layout.mode,
            view.layout.scale * 100.0
        ),
        Style::default().fg(theme.text_muted),
    )]);
    f.render_widget(Paragraph::new(subtitle), rows[0]);

    for (column, column_area) in column_areas(rows[1], view.layout) {
        render_column(f, column_area, column, view, theme);
    }
}

fn render_column(
    f: &mut Frame,
    area: Rect,
    column: Column,
    view: StageCardView<'_>,
    theme: &Theme,
) {
    let layout = view.layout;
    let body = if layout.show_guides {
        let (left, right) = layout.mode.column_percentages();
        let share = if column == Column::Right { right } else { left };
        let guide = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Plain)
            .border_style(Style::default().fg(theme.text_muted))
            .title(Span::styled(
                format!(" {} {}% ", column_label(column), share),
                Style::default().fg(theme.text_muted),
            ));
        let inner = guide.inner(area);
        f.render_widget(guide, area);
        inner
    } else {
        area
    };

    let tools = layout.column(column);
    if tools.is_empty() {
        let hovered = view.drag.over == Some(DropTarget::EmptyColumn(column));
        let style = if hovered {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_muted)
        };
        let placeholder = Paragraph::new(Line::from(Span::styled("Drop tools here", style)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(style),
            );
        let height = block_height(layout.density, layout.scale).min(body.height);
        f.render_widget(placeholder, Rect { height, ..body });
        return;
    }

    let height = block_height(layout.density, layout.scale);
    let gap = block_gap(layout.density);
    let mut y = body.y;
    let bottom = body.y + body.height;
    for tool in tools {
        if y >= bottom {
            break;
        }
        let rect = Rect {
            x: body.x,
            y,
            width: body.width,
            height: height.min(bottom - y),
        };
        let highlight = BlockHighlight {
            selected: view.selected == Some(*tool),
            dragging: view.drag.active == Some(*tool),
            drop_target: view.drag.over == Some(DropTarget::Tool(*tool)),
        };
        render_tool_block(f, rect, &ToolBlock::describe(*tool, view.stage), highlight, theme);
        y = y.saturating_add(height + gap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LayoutMode, StageStatus};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn stage() -> ModelStage {
        let mut stage = ModelStage::new("dfd", "Elaboração do DFD", 0);
        stage.department = "Planejamento".to_string();
        stage.days = 5;
        stage.status = StageStatus::InProgress;
        stage.enable_tool(ToolKind::MainForm);
        stage.enable_tool(ToolKind::Comments);
        stage
    }

    fn render(view: StageCardView<'_>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|f| render_stage_card(f, f.area(), view, &theme))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_block_height_follows_density_and_scale() {
        assert_eq!(block_height(Density::Cozy, 1.0), 5);
        assert_eq!(block_height(Density::Compact, 1.0), 3);
        assert_eq!(block_height(Density::Cozy, 2.0), 10);
        assert_eq!(block_height(Density::Compact, 0.5), 3);
    }

    #[test]
    fn test_column_areas_follow_mode() {
        let area = Rect::new(0, 0, 100, 20);
        let mut layout = StageLayout::default();
        assert_eq!(column_areas(area, &layout), vec![(Column::Stack, area)]);

        layout.set_mode(LayoutMode::Split60);
        let columns = column_areas(area, &layout);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].1.width, 60);
        assert_eq!(columns[1].1.width, 40);
    }

    #[test]
    fn test_card_renders_tools_and_placeholder() {
        let stage = stage();
        let mut layout = StageLayout::default_for(&stage.tools_order);
        layout.set_mode(LayoutMode::Split50);
        layout.show_guides = true;
        let drag = DragState::default();

        let text = render(StageCardView {
            stage: &stage,
            layout: &layout,
            drag: &drag,
            selected: Some(ToolKind::MainForm),
        });
        assert!(text.contains("Planejamento"));
        assert!(text.contains("Main form"));
        assert!(text.contains("Comments"));
        assert!(text.contains("Drop tools here"));
        assert!(text.contains("right 50%"));
    }
}
