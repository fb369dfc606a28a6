//! Traits shared by the popups and panels of the editor.
//!
//! Each popup owns its own state and key handling, and reports back to
//! [`AppState`](crate::tui::AppState) through its own event enum.

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::tui::Theme;

/// A popup or panel that works on its own draft.
///
/// The balloon editor and the stage workspace implement this: nothing they
/// hold reaches the template until the parent handles their save event.
pub trait Component {
    /// What the parent is told about (save, close, status text, ...)
    type Event;

    /// Handles one key. `None` means the key was consumed internally.
    fn handle_input(&mut self, key: KeyEvent) -> Option<Self::Event>;

    /// Draws into `area`.
    fn render(&self, f: &mut Frame, area: Rect, theme: &Theme);

    /// Whether the parent should drop this component.
    fn should_close(&self) -> bool {
        false
    }
}

/// A popup that writes through to shared data on every key.
///
/// The inline balloon manager implements this with the catalog store as its
/// context, so each add, rename or delete is stored immediately.
pub trait ContextualComponent {
    /// Shared data the component edits
    type Context;

    /// What the parent is told about
    type Event;

    /// Handles one key, possibly mutating `context`.
    fn handle_input(&mut self, key: KeyEvent, context: &mut Self::Context)
        -> Option<Self::Event>;

    /// Draws into `area`, reading from `context`.
    fn render(&self, f: &mut Frame, area: Rect, theme: &Theme, context: &Self::Context);

    /// Whether the parent should drop this component.
    fn should_close(&self) -> bool {
        false
    }
}
