//! Status bar widget for displaying status messages, sync state and help

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{AppState, Theme};

/// Status bar widget
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar with contextual help
    pub fn render(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let mut content_lines: Vec<Line> = Vec::new();

        // First line: error or status message
        if let Some(error) = &state.error_message {
            content_lines.push(Line::from(vec![
                Span::styled("ERROR: ", Style::default().fg(theme.error)),
                Span::raw(error.as_str()),
            ]));
        } else if !state.status_message.is_empty() {
            let style = state
                .status_color_override
                .map_or_else(Style::default, |color| Style::default().fg(color));
            content_lines.push(Line::from(Span::styled(
                state.status_message.as_str(),
                style,
            )));
        } else {
            content_lines.push(Line::from(""));
        }

        content_lines.push(Self::sync_line(state, theme));

        let user = state.current_user();
        content_lines.push(Line::from(vec![
            Span::styled("User: ", Style::default().fg(theme.primary)),
            Span::styled(
                format!("{} ({})", user.name, user.role),
                Style::default().fg(theme.text_secondary),
            ),
        ]));

        let mut status_text = content_lines;
        status_text.push(Self::help_line(state, theme));

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(theme.background))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Status ")
                    .style(Style::default().bg(theme.background)),
            );

        f.render_widget(status, area);
    }

    fn sync_line(state: &AppState, theme: &Theme) -> Line<'static> {
        let pending = state.queue.pending().len();
        let (backend, color) = if state.transport.is_failing() {
            ("offline (simulated)", theme.error)
        } else {
            ("online", theme.success)
        };
        let pending_span = if pending == 0 {
            Span::styled("all changes synced", Style::default().fg(theme.text_muted))
        } else {
            Span::styled(
                format!("{pending} pending"),
                Style::default().fg(theme.warning),
            )
        };
        Line::from(vec![
            Span::styled("Sync: ", Style::default().fg(theme.primary)),
            pending_span,
            Span::raw(" · backend "),
            Span::styled(backend, Style::default().fg(color)),
        ])
    }

    fn help_line(state: &AppState, theme: &Theme) -> Line<'static> {
        let hints: &[(&str, &str)] = if state.active_popup.is_some() {
            &[("Ctrl+S", "Save"), ("Esc", "Close")]
        } else if state.workspace.is_some() {
            &[
                ("Ctrl+S", "Save"),
                ("Space", "Tool"),
                ("m", "Mode"),
                ("b", "Balloons"),
                ("?", "Help"),
                ("Esc", "Back"),
            ]
        } else {
            &[("↑/↓", "Select"), ("Enter", "Edit stage"), ("q", "Quit")]
        };

        let mut spans: Vec<Span<'static>> = Vec::new();
        for (i, (key, action)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(
                *key,
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(*action, Style::default().fg(theme.text_muted)));
        }
        Line::from(spans)
    }
}
