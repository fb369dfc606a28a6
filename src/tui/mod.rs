//! Terminal user interface components and state management.
//!
//! This module contains the main TUI loop, `AppState`, event handling,
//! and all UI widgets using Ratatui.

// Allow clone assignment patterns - common in UI state management
#![allow(clippy::assigning_clones)]
// Input handlers use Result<bool> for consistency even when they never fail
#![allow(clippy::unnecessary_wraps)]
// Allow intentional type casts for terminal coordinates
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]

pub mod balloon_chip;
pub mod balloon_editor;
pub mod balloon_manager;
pub mod component;
pub mod stage_card;
pub mod status_bar;
pub mod theme;
pub mod tool_block;
pub mod workspace;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout as RatatuiLayout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::Config;
use crate::editor::{BalloonEditor, BalloonManager, StageWorkspace};
use crate::models::{BalloonArea, WorkflowTemplate};
use crate::services::{
    open_document, ClipboardSink, CurrentUser, IdentityProvider, LayoutRepository, LinkOpener,
    NoticeLog, Notifier, OptimisticQueue, SimulatedTransport, StaticIdentity,
    SystemClipboard, SystemOpener, TemplateService,
};
use crate::shortcuts::{Action, ShortcutRegistry, STAGES_CONTEXT};

use balloon_editor::{BalloonEditorDialog, BalloonEditorEvent};
use balloon_manager::{BalloonManagerEvent, BalloonManagerPanel};
use component::{Component, ContextualComponent};
use status_bar::StatusBar;
use workspace::{WorkspaceEvent, WorkspacePanel};

pub use theme::Theme;

/// Popup components drawn over the workspace.
#[derive(Debug, Clone)]
pub enum ActiveComponent {
    /// Transactional balloon editor
    BalloonEditor(BalloonEditorDialog),
    /// Write-through balloon manager
    BalloonManager(BalloonManagerPanel),
}

/// Application state - single source of truth
///
/// All UI components read from this state immutably.
/// Only event handlers modify state explicitly.
pub struct AppState {
    // Core data
    /// Workflow template being edited
    pub template: WorkflowTemplate,
    /// File the template is written to on every save
    pub template_path: PathBuf,
    /// Persisted stage layouts
    pub layouts: LayoutRepository,
    /// Application configuration
    pub config: Config,

    // UI state
    /// Current UI theme
    pub theme: Theme,
    /// Key bindings
    pub shortcuts: ShortcutRegistry,
    /// Selected row of the stage list
    pub selected_stage: usize,
    /// Open stage workspace (if any)
    pub workspace: Option<WorkspacePanel>,
    /// Currently active popup (if any)
    pub active_popup: Option<ActiveComponent>,
    /// Whether the stage list help is shown
    pub show_help: bool,
    /// Status bar message
    pub status_message: String,
    /// Optional color override for status message
    pub status_color_override: Option<Color>,
    /// Current error message (if any)
    pub error_message: Option<String>,

    // Optimistic operations
    /// Operations waiting on the backend
    pub queue: OptimisticQueue,
    /// Simulated backend
    pub transport: SimulatedTransport,
    /// Toasts produced by the queue and the link opener
    pub notices: NoticeLog,

    // Collaborators
    /// Current user
    pub identity: Box<dyn IdentityProvider>,
    /// Clipboard for copied links
    pub clipboard: Box<dyn ClipboardSink>,
    /// Opens document links
    pub opener: Box<dyn LinkOpener>,

    // Control flags
    /// Whether application should exit
    pub should_quit: bool,
}

impl AppState {
    /// Creates the application state with system collaborators.
    #[must_use]
    pub fn new(
        template: WorkflowTemplate,
        template_path: PathBuf,
        layouts: LayoutRepository,
        config: Config,
    ) -> Self {
        let theme = Theme::from_mode(config.ui.theme_mode);
        let transport = SimulatedTransport::new(config.editor.latency());
        let identity = StaticIdentity(CurrentUser::from(&config.user));
        Self {
            template,
            template_path,
            layouts,
            config,
            theme,
            shortcuts: ShortcutRegistry::new(),
            selected_stage: 0,
            workspace: None,
            active_popup: None,
            show_help: false,
            status_message: "Select a stage and press Enter".to_string(),
            status_color_override: None,
            error_message: None,
            queue: OptimisticQueue::new(),
            transport,
            notices: NoticeLog::new(),
            identity: Box::new(identity),
            clipboard: Box::new(SystemClipboard),
            opener: Box::new(SystemOpener),
            should_quit: false,
        }
    }

    /// Current user from the identity provider.
    #[must_use]
    pub fn current_user(&self) -> CurrentUser {
        self.identity.current_user()
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.error_message = None;
        self.status_color_override = None;
    }

    /// Set status message with custom foreground color
    pub fn set_status_with_style(&mut self, message: impl Into<String>, color: Color) {
        self.status_message = message.into();
        self.error_message = None;
        self.status_color_override = Some(color);
    }

    /// Set error message
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error_message = Some(error.into());
    }

    /// Clear error message
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Writes the template file.
    pub fn save_template(&self) -> Result<()> {
        TemplateService::save(&self.template, &self.template_path)
    }

    /// Opens the workspace for the selected stage.
    pub fn open_workspace(&mut self) {
        let Some(stage) = self.template.stages.get(self.selected_stage) else {
            return;
        };
        let workspace =
            StageWorkspace::open(stage, &self.layouts, self.config.tool_dependencies());
        info!(stage_id = %stage.id, "workspace opened");
        let message = format!("Editing {}", stage.title);
        self.workspace = Some(WorkspacePanel::new(workspace));
        self.set_status(message);
    }

    /// Commits the open workspace to the template and writes the file.
    pub fn save_workspace(&mut self) -> Result<()> {
        if let Some(panel) = self.workspace.as_mut() {
            panel
                .workspace_mut()
                .save(&mut self.template, &mut self.layouts)?;
        }
        self.save_template()
    }

    fn workspace_stage_id(&self) -> Option<String> {
        self.workspace
            .as_ref()
            .map(|panel| panel.workspace().stage().id.clone())
    }

    /// Opens the transactional editor for `area` of the workspace stage.
    pub fn open_balloon_editor(&mut self, area: BalloonArea) {
        let Some(stage_id) = self.workspace_stage_id() else {
            return;
        };
        match BalloonEditor::open(&self.template.catalogs, &stage_id, area) {
            Ok(editor) => {
                self.active_popup =
                    Some(ActiveComponent::BalloonEditor(BalloonEditorDialog::new(editor)));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Opens the inline manager for `area` of the workspace stage.
    pub fn open_balloon_manager(&mut self, area: BalloonArea) {
        let Some(stage_id) = self.workspace_stage_id() else {
            return;
        };
        self.active_popup = Some(ActiveComponent::BalloonManager(BalloonManagerPanel::new(
            BalloonManager::new(stage_id, area),
        )));
    }

    /// Close the active popup
    pub fn close_component(&mut self) {
        self.active_popup = None;
    }

    fn handle_workspace_event(&mut self, event: WorkspaceEvent) -> Result<()> {
        let now = Instant::now();
        let user = self.current_user();
        let Some(panel) = self.workspace.as_mut() else {
            return Ok(());
        };
        match event {
            WorkspaceEvent::SaveRequested => match self.save_workspace() {
                Ok(()) => self.set_status("Stage saved"),
                Err(e) => self.set_error(format!("{e:#}")),
            },
            WorkspaceEvent::Closed => {
                self.workspace = None;
                self.set_status("Select a stage and press Enter");
            }
            WorkspaceEvent::OpenBalloonEditor(area) => self.open_balloon_editor(area),
            WorkspaceEvent::OpenBalloonManager(area) => self.open_balloon_manager(area),
            WorkspaceEvent::SubmitComment => {
                match panel.submit_comment(&mut self.queue, &user, &self.transport, now) {
                    Ok(_) => self.set_status("Comment sent"),
                    Err(e) => self.set_status_with_style(e.to_string(), self.theme.warning),
                }
            }
            WorkspaceEvent::CreateVersion => {
                panel.create_version(&mut self.queue, &user, &self.transport, now);
                self.set_status("Creating version...");
            }
            WorkspaceEvent::UploadAttachment(name) => {
                match panel.upload_attachment(&mut self.queue, &user, &name, &self.transport, now)
                {
                    Ok(_) => self.set_status(format!("Uploading {}...", name.trim())),
                    Err(e) => self.set_status_with_style(e.to_string(), self.theme.warning),
                }
            }
            WorkspaceEvent::DecideSignature(decision) => {
                match panel.decide_signature(&mut self.queue, &user, decision, &self.transport, now)
                {
                    Ok(_) => self.set_status(format!("Signature {decision}")),
                    Err(e) => self.set_status_with_style(e.to_string(), self.theme.warning),
                }
            }
            WorkspaceEvent::OpenDocument => {
                let title = panel.workspace().stage().title.clone();
                let url = panel.document_url().map(str::to_string);
                // Outcome is reported through the notice log
                let _ = open_document(
                    self.opener.as_ref(),
                    &self.notices,
                    &title,
                    url.as_deref(),
                );
            }
            WorkspaceEvent::CopyLink => match panel.document_url().map(str::to_string) {
                Some(url) => match self.clipboard.copy_text(&url) {
                    Ok(()) => self.set_status("Link copied"),
                    Err(e) => self.set_error(format!("{e:#}")),
                },
                None => self.set_status_with_style(
                    "No document link. Refresh or regenerate the link.",
                    self.theme.warning,
                ),
            },
            WorkspaceEvent::ToggleOffline => {
                let failing = !self.transport.is_failing();
                self.transport.set_failing(failing);
                if failing {
                    self.set_status_with_style("Backend offline (simulated)", self.theme.warning);
                } else {
                    self.set_status("Backend online");
                }
            }
            WorkspaceEvent::Status(message) => self.set_status(message),
        }
        Ok(())
    }

    /// Resolves due optimistic operations and surfaces their notices.
    pub fn tick(&mut self, now: Instant) {
        if let Some(panel) = self.workspace.as_mut() {
            let was_clean = !panel.workspace().has_changes();
            let resolved = panel.poll(&mut self.queue, &self.transport, &self.notices, now);
            // Keep the file in step when the only draft changes are resolutions
            if !resolved.is_empty() && was_clean {
                if let Err(e) = self.save_workspace() {
                    warn!("Failed to persist resolved operations: {e:#}");
                }
            }
        }

        let open_id = self.workspace_stage_id();
        let mut background: Vec<String> = self
            .queue
            .pending()
            .iter()
            .filter(|op| op.ready_at <= now && Some(&op.stage_id) != open_id.as_ref())
            .map(|op| op.stage_id.clone())
            .collect();
        background.sort();
        background.dedup();
        let mut touched = false;
        for stage_id in background {
            if let Some(stage) = self.template.stage_mut(&stage_id) {
                let resolved = self
                    .queue
                    .poll(stage, now, &self.transport, &self.notices);
                touched |= !resolved.is_empty();
            }
        }
        if touched {
            if let Err(e) = self.save_template() {
                warn!("Failed to persist resolved operations: {e:#}");
            }
        }

        for notice in self.notices.drain() {
            let color = self.theme.notice_color(notice.level);
            let message = match &notice.hint {
                Some(hint) => format!("{} ({hint})", notice.message),
                None => notice.message.clone(),
            };
            self.set_status_with_style(message, color);
        }
    }
}

/// Initialize terminal for TUI
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore terminal to normal state
pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main event loop
pub fn run_tui(
    state: &mut AppState,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        // Render current state
        terminal.draw(|f| render(f, state))?;

        // Poll for events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if handle_key_event(state, key)? {
                    break; // User quit
                }
            }
        }

        state.tick(Instant::now());

        // Check if should quit
        if state.should_quit {
            break;
        }
    }

    Ok(())
}

/// Render the UI from current state
pub fn render(f: &mut Frame, state: &AppState) {
    // Fill entire screen with theme background color first
    let full_bg = Block::default().style(Style::default().bg(state.theme.background));
    f.render_widget(full_bg, f.area());

    let chunks = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(6), // Status bar
        ])
        .split(f.area());

    render_title_bar(f, chunks[0], state);

    match &state.workspace {
        Some(panel) => panel.render(f, chunks[1], &state.theme),
        None => render_stage_list(f, chunks[1], state),
    }

    StatusBar::render(f, chunks[2], state, &state.theme);

    if let Some(popup) = &state.active_popup {
        let area = f.area();
        match popup {
            ActiveComponent::BalloonEditor(dialog) => dialog.render(f, area, &state.theme),
            ActiveComponent::BalloonManager(panel) => {
                panel.render(f, area, &state.theme, &state.template.catalogs);
            }
        }
    }

    if state.show_help {
        render_stage_list_help(f, &state.theme);
    }

    // Render error overlay on top of everything if error is present
    if let Some(ref error) = state.error_message {
        render_error_overlay(f, error, &state.theme);
    }
}

/// Render title bar with template name and dirty indicator
fn render_title_bar(f: &mut Frame, area: Rect, state: &AppState) {
    let title = match &state.workspace {
        Some(panel) => {
            let dirty_indicator = if panel.workspace().has_changes() {
                " *"
            } else {
                ""
            };
            format!(
                " {} - {}{}",
                state.template.name,
                panel.workspace().stage().title,
                dirty_indicator
            )
        }
        None => format!(
            " {} - {} stages ({})",
            state.template.name,
            state.template.stages.len(),
            state.template_path.display()
        ),
    };

    let title_widget = Paragraph::new(title)
        .style(
            Style::default()
                .fg(state.theme.primary)
                .bg(state.theme.background),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().bg(state.theme.background)),
        );

    f.render_widget(title_widget, area);
}

fn render_stage_list(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let items: Vec<ListItem> = state
        .template
        .stages
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            let visual = crate::designer::status_visual(stage.status);
            let selected = i == state.selected_stage;
            let marker = if selected { "▶ " } else { "  " };
            let title_style = if selected {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, title_style),
                Span::styled(
                    format!("{} ", visual.glyph),
                    Style::default().fg(theme.status_color(visual.accent)),
                ),
                Span::styled(format!("{:<36}", stage.title), title_style),
                Span::styled(
                    format!("{:<18}", stage.department),
                    Style::default().fg(theme.text_secondary),
                ),
                Span::styled(
                    format!("{} days  {} tools", stage.days, stage.tools.len()),
                    Style::default().fg(theme.text_muted),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Stages ")
            .style(Style::default().bg(theme.background)),
    );
    f.render_widget(list, area);
}

fn render_stage_list_help(f: &mut Frame, theme: &Theme) {
    let area = centered_rect(50, 40, f.area());
    f.render_widget(Clear, area);

    let rows = [
        ("↑/↓ j/k", "Select stage"),
        ("Enter", "Open stage workspace"),
        ("?", "Toggle help"),
        ("q / Ctrl+Q", "Quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(key, label)| {
            Line::from(vec![
                Span::styled(format!("{key:<14}"), Style::default().fg(theme.primary)),
                Span::styled(*label, Style::default().fg(theme.text)),
            ])
        })
        .collect();

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Keys ")
            .style(Style::default().bg(theme.background)),
    );
    f.render_widget(help, area);
}

/// Render unsaved changes prompt
pub fn render_unsaved_prompt(f: &mut Frame, theme: &Theme) {
    let area = centered_rect(60, 30, f.area());

    // Clear the background area first
    f.render_widget(Clear, area);

    // Render opaque background
    let background = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(background, area);

    let text = vec![
        Line::from(""),
        Line::from("You have unsaved changes."),
        Line::from(""),
        Line::from("  [y] Discard and close"),
        Line::from("  [n] Keep editing"),
    ];

    let prompt = Paragraph::new(text).block(
        Block::default()
            .title(" Unsaved Changes ")
            .borders(Borders::ALL)
            .style(Style::default().fg(theme.warning)),
    );

    f.render_widget(prompt, area);
}

/// Render error overlay on top of all other UI elements
fn render_error_overlay(f: &mut Frame, error: &str, theme: &Theme) {
    let area = centered_rect(70, 40, f.area());

    // Clear the background area first
    f.render_widget(Clear, area);

    let background = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(background, area);

    let chunks = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(3),    // Error message
            Constraint::Length(2), // Help text
        ])
        .split(area);

    let title = Paragraph::new("ERROR")
        .style(
            Style::default()
                .fg(theme.error)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(theme.error).bg(theme.background)),
        );
    f.render_widget(title, chunks[0]);

    let error_text = Paragraph::new(error)
        .style(Style::default().fg(theme.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Details ")
                .style(Style::default().bg(theme.background)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(error_text, chunks[1]);

    let help = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "Enter/Esc",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Dismiss"),
    ])])
    .style(Style::default().fg(theme.text).bg(theme.background))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(theme.background)),
    );
    f.render_widget(help, chunks[2]);
}

/// Helper to create a centered rectangle
#[must_use]
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    RatatuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

enum PopupOutcome {
    Nothing,
    Saved(String),
    Changed,
    Closed,
    Failed(String),
}

fn handle_popup_input(state: &mut AppState, key: event::KeyEvent) -> Result<bool> {
    let outcome = match state.active_popup.as_mut() {
        None => PopupOutcome::Nothing,
        Some(ActiveComponent::BalloonEditor(dialog)) => match dialog.handle_input(key) {
            Some(BalloonEditorEvent::SaveRequested) => {
                match dialog.editor_mut().save(&mut state.template.catalogs) {
                    Ok(changes) if changes.is_empty() => {
                        PopupOutcome::Saved("No changes to save".to_string())
                    }
                    Ok(changes) => PopupOutcome::Saved(format!(
                        "Saved: {} added, {} removed, {} renamed, {} restyled{}",
                        changes.added.len(),
                        changes.removed.len(),
                        changes.renamed.len(),
                        changes.restyled.len(),
                        if changes.reordered { ", reordered" } else { "" }
                    )),
                    Err(e) => PopupOutcome::Failed(e.to_string()),
                }
            }
            Some(BalloonEditorEvent::Closed) => PopupOutcome::Closed,
            None => PopupOutcome::Nothing,
        },
        Some(ActiveComponent::BalloonManager(panel)) => {
            match panel.handle_input(key, &mut state.template.catalogs) {
                Some(BalloonManagerEvent::Changed) => PopupOutcome::Changed,
                Some(BalloonManagerEvent::Closed) => PopupOutcome::Closed,
                None => PopupOutcome::Nothing,
            }
        }
    };

    match outcome {
        PopupOutcome::Nothing => {}
        PopupOutcome::Saved(message) => match state.save_template() {
            Ok(()) => state.set_status(message),
            Err(e) => state.set_error(format!("{e:#}")),
        },
        PopupOutcome::Changed => {
            if let Err(e) = state.save_template() {
                state.set_error(format!("{e:#}"));
            }
        }
        PopupOutcome::Closed => state.close_component(),
        PopupOutcome::Failed(message) => state.set_error(message),
    }
    Ok(false)
}

fn handle_stage_list_input(state: &mut AppState, key: event::KeyEvent) -> Result<bool> {
    if state.show_help {
        state.show_help = false;
        return Ok(false);
    }
    let count = state.template.stages.len();
    match state.shortcuts.lookup(STAGES_CONTEXT, key) {
        Some(Action::NavigateUp) if count > 0 => {
            state.selected_stage = (state.selected_stage + count - 1) % count;
        }
        Some(Action::NavigateDown) if count > 0 => {
            state.selected_stage = (state.selected_stage + 1) % count;
        }
        Some(Action::Select) => state.open_workspace(),
        Some(Action::ToggleHelp) => state.show_help = true,
        Some(Action::Quit) => {
            state.should_quit = true;
            return Ok(true);
        }
        _ => {}
    }
    Ok(false)
}

/// Handle keyboard input events
pub fn handle_key_event(state: &mut AppState, key: event::KeyEvent) -> Result<bool> {
    // If error overlay is shown, allow dismissing with Enter or Esc
    if state.error_message.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            state.clear_error();
        }
        // Block all other input while error is shown
        return Ok(false);
    }

    if state.active_popup.is_some() {
        return handle_popup_input(state, key);
    }

    if let Some(panel) = state.workspace.as_mut() {
        if let Some(event) = panel.handle_input(key) {
            state.handle_workspace_event(event)?;
        }
        return Ok(false);
    }

    handle_stage_list_input(state, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ToolKind, WorkflowTemplate};
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct RecordingClipboard(Rc<RefCell<Vec<String>>>);

    impl ClipboardSink for RecordingClipboard {
        fn copy_text(&mut self, text: &str) -> Result<()> {
            self.0.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key_event(state, KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn ctrl(state: &mut AppState, c: char) {
        handle_key_event(state, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)).unwrap();
    }

    fn state_in(dir: &TempDir) -> AppState {
        let mut config = Config::default();
        config.editor.simulated_latency_ms = 0;
        let mut state = AppState::new(
            WorkflowTemplate::sample(),
            dir.path().join("workflow.json"),
            LayoutRepository::in_dir(dir.path().join("layouts")),
            config,
        );
        state.theme = Theme::dark();
        state
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(50, 50, area);
        assert_eq!(centered.width, 50);
        assert_eq!(centered.height, 25);
        assert_eq!(centered.x, 25);
    }

    #[test]
    fn test_open_edit_save_writes_template() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        press(&mut state, KeyCode::Enter);
        assert!(state.workspace.is_some());

        let stage_id = state.template.stages[0].id.clone();
        let had_doc_view = state.template.stages[0].tools.contains(&ToolKind::DocView);
        // Doc view is the last tool in the list
        for _ in 0..6 {
            press(&mut state, KeyCode::Down);
        }
        press(&mut state, KeyCode::Char(' '));
        ctrl(&mut state, 's');

        assert_eq!(state.status_message, "Stage saved");
        let reloaded = TemplateService::load(&state.template_path).unwrap();
        assert_eq!(
            reloaded.stage(&stage_id).unwrap().tools.contains(&ToolKind::DocView),
            !had_doc_view
        );
        assert!(state.layouts.exists(&stage_id).unwrap());
    }

    #[test]
    fn test_escape_without_changes_returns_to_list() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        press(&mut state, KeyCode::Enter);
        press(&mut state, KeyCode::Esc);
        assert!(state.workspace.is_none());
        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);
    }

    #[test]
    fn test_copy_link_uses_clipboard() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        let clipboard = RecordingClipboard::default();
        state.clipboard = Box::new(clipboard.clone());
        press(&mut state, KeyCode::Enter);
        state
            .workspace
            .as_mut()
            .unwrap()
            .workspace_mut()
            .update_tool_config(|config| {
                config.doc_view_mut().url = Some("https://docs.example/dfd".to_string());
            });

        press(&mut state, KeyCode::Char('y'));
        assert_eq!(clipboard.0.borrow().as_slice(), ["https://docs.example/dfd"]);
        assert_eq!(state.status_message, "Link copied");
    }

    #[test]
    fn test_offline_comment_rolls_back_on_tick() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        press(&mut state, KeyCode::Enter);
        state
            .workspace
            .as_mut()
            .unwrap()
            .workspace_mut()
            .enable_tool(ToolKind::Comments);

        ctrl(&mut state, 'f');
        assert!(state.transport.is_failing());
        press(&mut state, KeyCode::Char('c'));
        for c in "Ok".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.queue.pending().len(), 1);

        state.tick(Instant::now() + Duration::from_millis(10));
        assert!(state.queue.pending().is_empty());
        assert_eq!(state.workspace.as_ref().unwrap().composer(), "Ok");
        assert_eq!(state.status_color_override, Some(state.theme.error));
    }

    #[test]
    fn test_manager_changes_save_template() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        press(&mut state, KeyCode::Enter);
        let stage_id = state.template.stages[0].id.clone();
        state.open_balloon_manager(BalloonArea::ActionCatalog);

        press(&mut state, KeyCode::Char('n'));
        for c in "Publicar".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Enter);

        let reloaded = TemplateService::load(&state.template_path).unwrap();
        let labels: Vec<String> = reloaded
            .catalogs
            .catalog(&stage_id, BalloonArea::ActionCatalog)
            .unwrap()
            .iter()
            .map(|item| item.label.clone())
            .collect();
        assert!(labels.contains(&"Publicar".to_string()));

        press(&mut state, KeyCode::Esc);
        assert!(state.active_popup.is_none());
    }

    #[test]
    fn test_render_stage_list_and_workspace() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();

        terminal.draw(|f| render(f, &state)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Stages"));
        assert!(text.contains(&state.template.stages[0].title));

        press(&mut state, KeyCode::Enter);
        terminal.draw(|f| render(f, &state)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Tools"));
        assert!(text.contains("Activity"));
    }
}
