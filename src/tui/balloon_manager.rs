//! Inline balloon manager panel.
//!
//! Every confirmed keystroke is written to the [`BalloonStore`] immediately,
//! so the panel reports [`BalloonManagerEvent::Changed`] after each write.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Clear},
    Frame,
};

use crate::editor::{BalloonManager, ManagerMode};
use crate::services::BalloonStore;
use crate::tui::balloon_editor::{render_balloon_list, render_confirmation, render_label_input};
use crate::tui::component::ContextualComponent;
use crate::tui::{centered_rect, Theme};

/// Events emitted by the manager panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalloonManagerEvent {
    /// The store was written
    Changed,
    /// The panel is done
    Closed,
}

/// Key handling and rendering around a [`BalloonManager`].
#[derive(Debug, Clone)]
pub struct BalloonManagerPanel {
    manager: BalloonManager,
    closed: bool,
}

impl BalloonManagerPanel {
    /// Wraps a manager.
    #[must_use]
    pub const fn new(manager: BalloonManager) -> Self {
        Self {
            manager,
            closed: false,
        }
    }

    /// The wrapped manager.
    #[must_use]
    pub const fn manager(&self) -> &BalloonManager {
        &self.manager
    }

    fn selected_id(&self, store: &BalloonStore) -> Option<String> {
        self.manager
            .items(store)
            .get(self.manager.selected)
            .map(|item| item.id.clone())
    }

    fn changed_if<T, E>(result: Result<T, E>) -> Option<BalloonManagerEvent> {
        result.ok().map(|_| BalloonManagerEvent::Changed)
    }

    fn handle_browsing_input(
        &mut self,
        key: KeyEvent,
        store: &mut BalloonStore,
    ) -> Option<BalloonManagerEvent> {
        let count = self.manager.items(store).len();
        match key.code {
            KeyCode::Esc => {
                self.closed = true;
                Some(BalloonManagerEvent::Closed)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.manager.select_previous(count);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.manager.select_next(count);
                None
            }
            KeyCode::Char('n') => {
                self.manager.begin_add();
                None
            }
            KeyCode::Char('r') | KeyCode::F(2) => {
                self.manager.begin_rename(store);
                None
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id(store) {
                    self.manager.request_delete(&id);
                }
                None
            }
            KeyCode::Char('c') => {
                let id = self.selected_id(store)?;
                Self::changed_if(self.manager.duplicate(store, &id))
            }
            KeyCode::Char('i') => {
                let id = self.selected_id(store)?;
                Self::changed_if(self.manager.cycle_icon(store, &id))
            }
            KeyCode::Char('o') => {
                let id = self.selected_id(store)?;
                Self::changed_if(self.manager.cycle_color(store, &id))
            }
            KeyCode::Char(' ') => {
                self.manager.grab(store);
                None
            }
            _ => None,
        }
    }

    fn handle_text_input(
        &mut self,
        key: KeyEvent,
        store: &mut BalloonStore,
    ) -> Option<BalloonManagerEvent> {
        match key.code {
            KeyCode::Esc => {
                self.manager.cancel();
                None
            }
            KeyCode::Enter => Self::changed_if(self.manager.submit_input(store)),
            KeyCode::Backspace => {
                if let Some(input) = self.manager.input_mut() {
                    input.pop();
                }
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(input) = self.manager.input_mut() {
                    input.push(c);
                }
                None
            }
            _ => None,
        }
    }
}

impl ContextualComponent for BalloonManagerPanel {
    type Context = BalloonStore;
    type Event = BalloonManagerEvent;

    fn handle_input(
        &mut self,
        key: KeyEvent,
        store: &mut BalloonStore,
    ) -> Option<BalloonManagerEvent> {
        match self.manager.mode() {
            ManagerMode::Browsing => self.handle_browsing_input(key, store),
            ManagerMode::Adding { .. } | ManagerMode::Renaming { .. } => {
                self.handle_text_input(key, store)
            }
            ManagerMode::ConfirmingDelete { .. } => match key.code {
                KeyCode::Char('y') => match self.manager.confirm_delete(store) {
                    Ok(Some(_)) => Some(BalloonManagerEvent::Changed),
                    Ok(None) | Err(_) => None,
                },
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.manager.cancel();
                    None
                }
                _ => None,
            },
            ManagerMode::Dragging => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.manager.drag_up();
                    None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.manager.drag_down(store);
                    None
                }
                KeyCode::Enter | KeyCode::Char(' ') => match self.manager.drop_dragged(store) {
                    Ok(true) => Some(BalloonManagerEvent::Changed),
                    Ok(false) | Err(_) => None,
                },
                KeyCode::Esc => {
                    self.manager.cancel();
                    None
                }
                _ => None,
            },
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, theme: &Theme, store: &BalloonStore) {
        let dialog_area = centered_rect(70, 70, area);
        f.render_widget(Clear, dialog_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(
                " Manage {} (saved instantly) ",
                self.manager.area().title()
            ))
            .style(Style::default().bg(theme.background));
        f.render_widget(block, dialog_area);

        let inner_area = Rect {
            x: dialog_area.x + 2,
            y: dialog_area.y + 1,
            width: dialog_area.width.saturating_sub(4),
            height: dialog_area.height.saturating_sub(2),
        };

        let items = self.manager.items(store);
        match self.manager.mode() {
            ManagerMode::Browsing | ManagerMode::Dragging => render_balloon_list(
                f,
                inner_area,
                items,
                self.manager.selected,
                self.manager.drag_hover(),
                self.manager.error(),
                &[
                    ("n", ": New  "),
                    ("r", ": Rename  "),
                    ("c", ": Duplicate  "),
                    ("d", ": Delete  "),
                    ("i/o", ": Icon/Color  "),
                    ("Space", ": Drag  "),
                    ("Esc", ": Close"),
                ],
                theme,
            ),
            ManagerMode::Adding { input } => render_label_input(
                f,
                inner_area,
                "New Balloon",
                input,
                self.manager.error(),
                theme,
            ),
            ManagerMode::Renaming { input, .. } => render_label_input(
                f,
                inner_area,
                "Rename Balloon",
                input,
                self.manager.error(),
                theme,
            ),
            ManagerMode::ConfirmingDelete { id } => render_confirmation(
                f,
                inner_area,
                "Delete this balloon? This is saved immediately.",
                items.iter().find(|item| &item.id == id),
                "y",
                ": Yes, delete  ",
                theme,
            ),
        }
    }

    fn should_close(&self) -> bool {
        self.closed
    }
}
