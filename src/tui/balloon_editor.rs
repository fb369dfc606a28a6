//! Transactional balloon editor dialog.
//!
//! Wraps [`BalloonEditor`]: all edits land on the draft, Ctrl+S asks the
//! parent to commit, Esc asks before throwing unsaved edits away.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::editor::{BalloonEditor, CloseDecision, EditorMode};
use crate::models::BalloonItem;
use crate::tui::balloon_chip::balloon_span;
use crate::tui::component::Component;
use crate::tui::{centered_rect, Theme};

/// Events emitted by the balloon editor dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalloonEditorEvent {
    /// Commit the draft to the store
    SaveRequested,
    /// The dialog is done
    Closed,
}

/// Dialog state around a [`BalloonEditor`].
#[derive(Debug, Clone)]
pub struct BalloonEditorDialog {
    editor: BalloonEditor,
    confirming_discard: bool,
    closed: bool,
}

impl BalloonEditorDialog {
    /// Wraps an opened editor.
    #[must_use]
    pub const fn new(editor: BalloonEditor) -> Self {
        Self {
            editor,
            confirming_discard: false,
            closed: false,
        }
    }

    /// The wrapped editor.
    #[must_use]
    pub const fn editor(&self) -> &BalloonEditor {
        &self.editor
    }

    /// The wrapped editor, for committing.
    pub fn editor_mut(&mut self) -> &mut BalloonEditor {
        &mut self.editor
    }

    /// Whether the discard prompt is showing.
    #[must_use]
    pub const fn is_confirming_discard(&self) -> bool {
        self.confirming_discard
    }

    fn close(&mut self) -> Option<BalloonEditorEvent> {
        self.closed = true;
        Some(BalloonEditorEvent::Closed)
    }

    fn selected_id(&self) -> Option<String> {
        self.editor.selected_item().map(|item| item.id.clone())
    }

    fn handle_browsing_input(&mut self, key: KeyEvent) -> Option<BalloonEditorEvent> {
        // Ctrl+S, or Cmd+S where the terminal reports it
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER) {
            return match key.code {
                KeyCode::Char('s') => Some(BalloonEditorEvent::SaveRequested),
                _ => None,
            };
        }
        match key.code {
            KeyCode::Esc => match self.editor.request_close() {
                CloseDecision::Close => self.close(),
                CloseDecision::ConfirmDiscard => {
                    self.confirming_discard = true;
                    None
                }
            },
            KeyCode::Up | KeyCode::Char('k') => {
                self.editor.select_previous();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.editor.select_next();
                None
            }
            KeyCode::Char('n') => {
                self.editor.begin_add();
                None
            }
            KeyCode::Char('r') | KeyCode::F(2) => {
                self.editor.begin_rename();
                None
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.editor.request_remove(&id);
                }
                None
            }
            KeyCode::Char('c') => {
                if let Some(id) = self.selected_id() {
                    self.editor.duplicate(&id);
                }
                None
            }
            KeyCode::Char('i') => {
                self.editor.cycle_selected_icon();
                None
            }
            KeyCode::Char('o') => {
                self.editor.cycle_selected_color();
                None
            }
            KeyCode::Char(' ') => {
                self.editor.grab();
                None
            }
            _ => None,
        }
    }

    fn handle_text_input(&mut self, key: KeyEvent) -> Option<BalloonEditorEvent> {
        match key.code {
            KeyCode::Esc => self.editor.cancel_input(),
            KeyCode::Enter => {
                // A rejected label stays visible as the inline error
                let _ = self.editor.submit_input();
            }
            KeyCode::Backspace => {
                if let Some(input) = self.editor.input_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER) =>
            {
                if let Some(input) = self.editor.input_mut() {
                    input.push(c);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_remove_confirmation(&mut self, key: KeyEvent) -> Option<BalloonEditorEvent> {
        match key.code {
            KeyCode::Char('y') => {
                self.editor.confirm_remove();
            }
            KeyCode::Char('n') | KeyCode::Esc => self.editor.cancel_remove(),
            _ => {}
        }
        None
    }

    fn handle_drag_input(&mut self, key: KeyEvent) -> Option<BalloonEditorEvent> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.editor.drag_up(),
            KeyCode::Down | KeyCode::Char('j') => self.editor.drag_down(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.editor.drop_dragged();
            }
            KeyCode::Esc => self.editor.cancel_drag(),
            _ => {}
        }
        None
    }

    fn handle_discard_confirmation(&mut self, key: KeyEvent) -> Option<BalloonEditorEvent> {
        match key.code {
            KeyCode::Char('y') => {
                self.confirming_discard = false;
                self.editor.discard();
                self.close()
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.confirming_discard = false;
                None
            }
            _ => None,
        }
    }
}

impl Component for BalloonEditorDialog {
    type Event = BalloonEditorEvent;

    fn handle_input(&mut self, key: KeyEvent) -> Option<Self::Event> {
        if self.confirming_discard {
            return self.handle_discard_confirmation(key);
        }
        match self.editor.mode() {
            EditorMode::Browsing => self.handle_browsing_input(key),
            EditorMode::Adding { .. } | EditorMode::Renaming { .. } => self.handle_text_input(key),
            EditorMode::ConfirmingRemove { .. } => self.handle_remove_confirmation(key),
            EditorMode::Dragging => self.handle_drag_input(key),
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let dialog_area = centered_rect(80, 80, area);
        f.render_widget(Clear, dialog_area);

        let dirty = if self.editor.is_dirty() { " *" } else { "" };
        let title = format!(
            " Balloons: {} / {}{} ",
            self.editor.stage_id(),
            self.editor.area().title(),
            dirty
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().bg(theme.background));
        f.render_widget(block, dialog_area);

        let inner_area = Rect {
            x: dialog_area.x + 2,
            y: dialog_area.y + 1,
            width: dialog_area.width.saturating_sub(4),
            height: dialog_area.height.saturating_sub(2),
        };

        if self.confirming_discard {
            render_confirmation(
                f,
                inner_area,
                "Discard unsaved balloon changes?",
                None,
                "y",
                ": Discard  ",
                theme,
            );
            return;
        }

        match self.editor.mode() {
            EditorMode::Browsing | EditorMode::Dragging => {
                render_balloon_list(
                    f,
                    inner_area,
                    self.editor.items(),
                    self.editor.selected(),
                    self.editor.drag_hover(),
                    self.editor.error().map(ToString::to_string).as_deref(),
                    &editor_help(matches!(self.editor.mode(), EditorMode::Dragging)),
                    theme,
                );
            }
            EditorMode::Adding { input } => render_label_input(
                f,
                inner_area,
                "New Balloon",
                input,
                self.editor.error().map(ToString::to_string).as_deref(),
                theme,
            ),
            EditorMode::Renaming { input, .. } => render_label_input(
                f,
                inner_area,
                "Rename Balloon",
                input,
                self.editor.error().map(ToString::to_string).as_deref(),
                theme,
            ),
            EditorMode::ConfirmingRemove { id } => {
                let item = self.editor.items().iter().find(|item| &item.id == id);
                render_confirmation(
                    f,
                    inner_area,
                    "Remove this balloon from the draft?",
                    item,
                    "y",
                    ": Yes, remove  ",
                    theme,
                );
            }
        }
    }

    fn should_close(&self) -> bool {
        self.closed
    }
}

fn editor_help(dragging: bool) -> Vec<(&'static str, &'static str)> {
    if dragging {
        vec![
            ("↑/↓", ": Move  "),
            ("Enter", ": Drop  "),
            ("Esc", ": Put back"),
        ]
    } else {
        vec![
            ("n", ": New  "),
            ("r", ": Rename  "),
            ("c", ": Duplicate  "),
            ("d", ": Remove  "),
            ("i", ": Icon  "),
            ("o", ": Color  "),
            ("Space", ": Drag  "),
            ("Ctrl+S", ": Save  "),
            ("Esc", ": Close"),
        ]
    }
}

/// Help line from `(key, label)` pairs.
pub(crate) fn help_line(entries: &[(&str, &str)], theme: &Theme) -> Line<'static> {
    let spans: Vec<Span<'static>> = entries
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled((*key).to_string(), Style::default().fg(theme.primary)),
                Span::raw((*label).to_string()),
            ]
        })
        .collect();
    Line::from(spans)
}

/// Balloon list with an optional inline error and a help box.
pub(crate) fn render_balloon_list(
    f: &mut Frame,
    area: Rect,
    items: &[BalloonItem],
    selected: usize,
    drag_hover: Option<usize>,
    error: Option<&str>,
    help: &[(&str, &str)],
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Balloon list
            Constraint::Length(1), // Inline error
            Constraint::Length(4), // Help text
        ])
        .split(area);

    let rows: Vec<ListItem> = if items.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No balloons yet. Press n to add one.",
            Style::default().fg(theme.text_muted),
        )))]
    } else {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let marker = if drag_hover == Some(i) {
                    Span::styled("▶ ", Style::default().fg(theme.accent))
                } else if i == selected {
                    Span::styled("› ", Style::default().fg(theme.accent))
                } else {
                    Span::raw("  ")
                };
                let detail = format!(
                    "  {} · {}",
                    item.icon.map_or("no icon", |icon| icon.name()),
                    item.color.name()
                );
                ListItem::new(Line::from(vec![
                    marker,
                    balloon_span(item, theme, i == selected),
                    Span::styled(detail, Style::default().fg(theme.text_muted)),
                ]))
            })
            .collect()
    };

    let list = List::new(rows).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Balloons ({})", items.len())),
    );
    f.render_widget(list, chunks[0]);

    if let Some(message) = error {
        let error_line = Paragraph::new(message.to_string())
            .style(Style::default().fg(theme.error).add_modifier(Modifier::BOLD));
        f.render_widget(error_line, chunks[1]);
    }

    let help = Paragraph::new(vec![help_line(help, theme)])
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .alignment(Alignment::Left)
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(help, chunks[2]);
}

/// Label entry box with the validation message under it.
pub(crate) fn render_label_input(
    f: &mut Frame,
    area: Rect,
    title: &str,
    input: &str,
    error: Option<&str>,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Prompt
            Constraint::Length(3), // Input
            Constraint::Length(2), // Error
            Constraint::Min(1),    // Spacer
            Constraint::Length(3), // Help
        ])
        .split(area);

    let prompt = Paragraph::new("Enter balloon label:")
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.text));
    f.render_widget(prompt, chunks[0]);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .style(Style::default().fg(theme.primary));
    let input_text = Paragraph::new(format!("{input}_"))
        .block(input_block)
        .style(Style::default().fg(theme.text));
    f.render_widget(input_text, chunks[1]);

    if let Some(message) = error {
        let error_line = Paragraph::new(message.to_string())
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.error));
        f.render_widget(error_line, chunks[2]);
    }

    let help = Paragraph::new(vec![help_line(
        &[("Enter", ": Confirm  "), ("Esc", ": Cancel")],
        theme,
    )])
    .alignment(Alignment::Center)
    .style(Style::default().fg(theme.text_muted));
    f.render_widget(help, chunks[4]);
}

/// Yes/no prompt, optionally naming a balloon.
pub(crate) fn render_confirmation(
    f: &mut Frame,
    area: Rect,
    question: &str,
    item: Option<&BalloonItem>,
    yes_key: &str,
    yes_label: &str,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Warning
            Constraint::Length(3), // Balloon
            Constraint::Min(1),    // Spacer
            Constraint::Length(3), // Help
        ])
        .split(area);

    let warning = Paragraph::new(question.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.error).add_modifier(Modifier::BOLD));
    f.render_widget(warning, chunks[0]);

    if let Some(item) = item {
        let info = Paragraph::new(Line::from(vec![
            Span::raw("Balloon: "),
            balloon_span(item, theme, false),
        ]))
        .alignment(Alignment::Center);
        f.render_widget(info, chunks[1]);
    }

    let help = Paragraph::new(vec![help_line(
        &[(yes_key, yes_label), ("n/Esc", ": No, keep")],
        theme,
    )])
    .alignment(Alignment::Center)
    .style(Style::default().fg(theme.text_muted));
    f.render_widget(help, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BalloonArea;
    use crate::services::BalloonStore;

    fn press(dialog: &mut BalloonEditorDialog, code: KeyCode) -> Option<BalloonEditorEvent> {
        dialog.handle_input(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(dialog: &mut BalloonEditorDialog, text: &str) {
        for c in text.chars() {
            press(dialog, KeyCode::Char(c));
        }
    }

    fn dialog() -> (BalloonStore, BalloonEditorDialog) {
        let mut store = BalloonStore::new();
        store.register_stage("dfd");
        store
            .add_balloon("dfd", BalloonArea::RequiredFields, BalloonItem::new("Urgente"))
            .unwrap();
        let editor = BalloonEditor::open(&store, "dfd", BalloonArea::RequiredFields).unwrap();
        (store, BalloonEditorDialog::new(editor))
    }

    #[test]
    fn test_add_through_keys() {
        let (_, mut dialog) = dialog();
        press(&mut dialog, KeyCode::Char('n'));
        type_text(&mut dialog, "Rotineiro");
        press(&mut dialog, KeyCode::Enter);

        assert_eq!(dialog.editor().mode(), &EditorMode::Browsing);
        assert_eq!(dialog.editor().items().len(), 2);
        assert!(dialog.editor().is_dirty());
    }

    #[test]
    fn test_duplicate_label_keeps_form_open() {
        let (_, mut dialog) = dialog();
        press(&mut dialog, KeyCode::Char('n'));
        type_text(&mut dialog, "urgente");
        press(&mut dialog, KeyCode::Enter);

        assert!(matches!(dialog.editor().mode(), EditorMode::Adding { .. }));
        assert!(dialog.editor().error().is_some());
        assert!(!dialog.should_close());
    }

    #[test]
    fn test_escape_with_changes_asks_first() {
        let (_, mut dialog) = dialog();
        press(&mut dialog, KeyCode::Char('o'));
        assert_eq!(press(&mut dialog, KeyCode::Esc), None);
        assert!(dialog.is_confirming_discard());

        press(&mut dialog, KeyCode::Char('n'));
        assert!(!dialog.is_confirming_discard());
        assert!(dialog.editor().is_dirty());

        press(&mut dialog, KeyCode::Esc);
        assert_eq!(press(&mut dialog, KeyCode::Char('y')), Some(BalloonEditorEvent::Closed));
        assert!(dialog.should_close());
        assert!(!dialog.editor().is_dirty());
    }

    #[test]
    fn test_ctrl_s_requests_save_and_parent_commits() {
        let (mut store, mut dialog) = dialog();
        press(&mut dialog, KeyCode::Char('c'));
        let event = dialog.handle_input(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(event, Some(BalloonEditorEvent::SaveRequested));

        let changes = dialog.editor_mut().save(&mut store).unwrap();
        assert_eq!(changes.added.len(), 1);
        assert_eq!(
            store.catalog("dfd", BalloonArea::RequiredFields).unwrap().len(),
            2
        );
        assert_eq!(press(&mut dialog, KeyCode::Esc), Some(BalloonEditorEvent::Closed));
    }

    #[test]
    fn test_cmd_s_requests_save() {
        let (_, mut dialog) = dialog();
        let event = dialog.handle_input(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::SUPER));
        assert_eq!(event, Some(BalloonEditorEvent::SaveRequested));

        // Cmd+S in the add form does not type an 's'
        press(&mut dialog, KeyCode::Char('n'));
        dialog.handle_input(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::SUPER));
        assert!(matches!(
            dialog.editor().mode(),
            EditorMode::Adding { input } if input.is_empty()
        ));
    }

    #[test]
    fn test_remove_needs_confirmation() {
        let (_, mut dialog) = dialog();
        press(&mut dialog, KeyCode::Char('d'));
        assert!(matches!(
            dialog.editor().mode(),
            EditorMode::ConfirmingRemove { .. }
        ));
        press(&mut dialog, KeyCode::Char('y'));
        assert!(dialog.editor().items().is_empty());
    }
}
