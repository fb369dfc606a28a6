//! Stage edit workspace screen.
//!
//! Left pane: stage fields, the tool list and the comment composer.
//! Right pane: live stage card preview. Every change lands on the
//! [`StageWorkspace`] draft; Ctrl+S asks the parent to commit.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use tracing::debug;

use crate::designer::{DropTarget, Side};
use crate::editor::{CloseDecision, StageWorkspace};
use crate::models::{
    BalloonArea, Column, SignatureDecision, StagePatch, SyncState, ToolKind,
};
use crate::services::{
    CurrentUser, Notifier, OptimisticQueue, Resolution, SubmitError, Transport,
};
use crate::shortcuts::{Action, ShortcutRegistry, WORKSPACE_CONTEXT};
use crate::tui::balloon_editor::help_line;
use crate::tui::component::Component;
use crate::tui::stage_card::{render_stage_card, StageCardView};
use crate::tui::{centered_rect, render_unsaved_prompt, Theme};

/// Which list has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceFocus {
    /// The seven tools
    Tools,
    /// Title, department, days, status
    Fields,
}

/// Editable scalar fields of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageField {
    /// Display title
    Title,
    /// Responsible department
    Department,
    /// SLA days
    Days,
    /// Status (cycled, not typed)
    Status,
}

impl StageField {
    const ALL: [Self; 4] = [Self::Title, Self::Department, Self::Days, Self::Status];

    const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Department => "Department",
            Self::Days => "Days",
            Self::Status => "Status",
        }
    }
}

/// Current interaction of the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelMode {
    /// Shortcuts are live
    Normal,
    /// Typing a field value
    EditingField {
        /// Field being edited
        field: StageField,
        /// Value typed so far
        input: String,
    },
    /// Typing a comment
    Composing,
    /// Typing an attachment name
    Attaching {
        /// Name typed so far
        input: String,
    },
    /// Moving a tool to a drop target
    Dragging {
        /// Reachable drop targets
        targets: Vec<DropTarget>,
        /// Hovered target
        index: usize,
    },
    /// Unsaved changes prompt on close
    ConfirmClose,
    /// Key help overlay
    Help,
}

/// Events emitted by the workspace panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// Commit the drafts
    SaveRequested,
    /// Leave the workspace
    Closed,
    /// Open the transactional editor for an area
    OpenBalloonEditor(BalloonArea),
    /// Open the inline manager for an area
    OpenBalloonManager(BalloonArea),
    /// Send the composer text
    SubmitComment,
    /// Create a document version
    CreateVersion,
    /// Attach a document with this name
    UploadAttachment(String),
    /// Record the current user's decision
    DecideSignature(SignatureDecision),
    /// Open the linked document
    OpenDocument,
    /// Copy the linked document URL
    CopyLink,
    /// Flip the simulated backend between failing and healthy
    ToggleOffline,
    /// Show a message in the status bar
    Status(String),
}

/// Catalog area a tool owns, if any.
#[must_use]
pub fn area_for_tool(tool: ToolKind) -> Option<BalloonArea> {
    BalloonArea::all().iter().copied().find(|area| area.owner() == tool)
}

fn tool_list(tools: &[ToolKind]) -> String {
    tools
        .iter()
        .map(|tool| tool.id())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The workspace screen.
#[derive(Debug, Clone)]
pub struct WorkspacePanel {
    workspace: StageWorkspace,
    shortcuts: ShortcutRegistry,
    focus: WorkspaceFocus,
    selected_tool: usize,
    selected_field: usize,
    mode: PanelMode,
    composer: String,
    closed: bool,
}

impl WorkspacePanel {
    /// Wraps an opened workspace.
    #[must_use]
    pub fn new(workspace: StageWorkspace) -> Self {
        Self {
            workspace,
            shortcuts: ShortcutRegistry::new(),
            focus: WorkspaceFocus::Tools,
            selected_tool: 0,
            selected_field: 0,
            mode: PanelMode::Normal,
            composer: String::new(),
            closed: false,
        }
    }

    /// The wrapped workspace.
    #[must_use]
    pub const fn workspace(&self) -> &StageWorkspace {
        &self.workspace
    }

    /// The wrapped workspace, for saving.
    pub fn workspace_mut(&mut self) -> &mut StageWorkspace {
        &mut self.workspace
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> &PanelMode {
        &self.mode
    }

    /// Text in the comment composer.
    #[must_use]
    pub fn composer(&self) -> &str {
        &self.composer
    }

    /// Tool under the cursor.
    #[must_use]
    pub fn selected_tool(&self) -> ToolKind {
        ToolKind::all()[self.selected_tool.min(ToolKind::all().len() - 1)]
    }

    fn selected_field(&self) -> StageField {
        StageField::ALL[self.selected_field.min(StageField::ALL.len() - 1)]
    }

    /// Sends the composer text as a pending comment.
    pub fn submit_comment(
        &mut self,
        queue: &mut OptimisticQueue,
        author: &CurrentUser,
        transport: &dyn Transport,
        now: Instant,
    ) -> Result<String, SubmitError> {
        let composer = &mut self.composer;
        let result = self
            .workspace
            .update_stage(|stage| queue.submit_comment(stage, author, composer, now, transport));
        if result.is_ok() {
            self.mode = PanelMode::Normal;
        }
        result
    }

    /// Inserts a pending document version.
    pub fn create_version(
        &mut self,
        queue: &mut OptimisticQueue,
        author: &CurrentUser,
        transport: &dyn Transport,
        now: Instant,
    ) -> String {
        let number = self
            .workspace
            .stage()
            .tool_config
            .management
            .as_ref()
            .map_or(1, |m| m.next_version_number());
        let note = format!("Version {number}");
        self.workspace
            .update_stage(|stage| queue.create_version(stage, author, &note, now, transport))
    }

    /// Inserts a pending attachment.
    pub fn upload_attachment(
        &mut self,
        queue: &mut OptimisticQueue,
        author: &CurrentUser,
        name: &str,
        transport: &dyn Transport,
        now: Instant,
    ) -> Result<String, SubmitError> {
        self.workspace.update_stage(|stage| {
            queue.upload_attachment(stage, author, name, None, now, transport)
        })
    }

    /// Records a decision for the signer matching `user`, or the first
    /// signer still pending.
    pub fn decide_signature(
        &mut self,
        queue: &mut OptimisticQueue,
        user: &CurrentUser,
        decision: SignatureDecision,
        transport: &dyn Transport,
        now: Instant,
    ) -> Result<String, SubmitError> {
        let signers = self
            .workspace
            .stage()
            .tool_config
            .signatures
            .as_ref()
            .map(|s| s.signers.clone())
            .unwrap_or_default();
        let signer_id = signers
            .iter()
            .find(|s| s.name == user.name)
            .or_else(|| {
                signers
                    .iter()
                    .find(|s| s.decision == SignatureDecision::Pending)
            })
            .map(|s| s.id.clone())
            .ok_or_else(|| SubmitError::UnknownSigner(user.name.clone()))?;
        self.workspace.update_stage(|stage| {
            queue.decide_signature(stage, &signer_id, decision, now, transport)
        })
    }

    /// Resolves due operations on this stage. A rolled-back comment goes
    /// back into the composer.
    pub fn poll(
        &mut self,
        queue: &mut OptimisticQueue,
        transport: &dyn Transport,
        notifier: &dyn Notifier,
        now: Instant,
    ) -> Vec<Resolution> {
        let stage_id = self.workspace.stage().id.clone();
        if !queue.pending().iter().any(|op| op.stage_id == stage_id && op.ready_at <= now) {
            return Vec::new();
        }
        let resolutions = self
            .workspace
            .update_stage(|stage| queue.poll(stage, now, transport, notifier));
        for resolution in &resolutions {
            if let Resolution::RolledBack {
                restore_input: Some(text),
                ..
            } = resolution
            {
                self.composer.clone_from(text);
            }
        }
        resolutions
    }

    /// Linked document URL of the draft.
    #[must_use]
    pub fn document_url(&self) -> Option<&str> {
        self.workspace
            .stage()
            .tool_config
            .doc_view
            .as_ref()
            .and_then(|doc| doc.url.as_deref())
    }

    fn drop_targets(&self) -> Vec<DropTarget> {
        let layout = self.workspace.layout();
        let mut targets = Vec::new();
        for column in layout.active_columns() {
            let tools = layout.column(*column);
            if tools.is_empty() {
                targets.push(DropTarget::EmptyColumn(*column));
            } else {
                targets.extend(tools.iter().map(|tool| DropTarget::Tool(*tool)));
            }
        }
        targets
    }

    fn require_tool(&self, tool: ToolKind) -> Option<WorkspaceEvent> {
        if self.workspace.stage().has_tool(tool) {
            None
        } else {
            Some(WorkspaceEvent::Status(format!(
                "Enable {} first",
                tool.meta().title
            )))
        }
    }

    fn toggle_selected(&mut self) -> Option<WorkspaceEvent> {
        let tool = self.selected_tool();
        let enabling = !self.workspace.stage().has_tool(tool);
        let affected = self.workspace.toggle_tool(tool);
        let verb = if enabling { "Enabled" } else { "Disabled" };
        Some(WorkspaceEvent::Status(format!("{verb} {}", tool_list(&affected))))
    }

    fn start_drag(&mut self) -> Option<WorkspaceEvent> {
        let tool = self.selected_tool();
        if !self.workspace.drag_start(tool) {
            return self.require_tool(tool);
        }
        let targets = self.drop_targets();
        let index = targets
            .iter()
            .position(|t| *t == DropTarget::Tool(tool))
            .unwrap_or(0);
        self.workspace.drag_over(targets.get(index).copied());
        self.mode = PanelMode::Dragging { targets, index };
        None
    }

    fn catalog_event(&self, manager: bool) -> Option<WorkspaceEvent> {
        let tool = self.selected_tool();
        match area_for_tool(tool) {
            Some(area) if manager => Some(WorkspaceEvent::OpenBalloonManager(area)),
            Some(area) => Some(WorkspaceEvent::OpenBalloonEditor(area)),
            None => Some(WorkspaceEvent::Status(format!(
                "{} has no balloon catalog",
                tool.meta().title
            ))),
        }
    }

    fn begin_field_edit(&mut self) {
        let stage = self.workspace.stage();
        let field = self.selected_field();
        let input = match field {
            StageField::Title => stage.title.clone(),
            StageField::Department => stage.department.clone(),
            StageField::Days => stage.days.to_string(),
            StageField::Status => {
                self.cycle_status();
                return;
            }
        };
        self.mode = PanelMode::EditingField { field, input };
    }

    fn cycle_status(&mut self) {
        let patch = StagePatch {
            status: Some(self.workspace.stage().status.cycle()),
            ..StagePatch::default()
        };
        self.workspace.apply_patch(&patch);
    }

    fn commit_field(&mut self, field: StageField, input: &str) -> Option<WorkspaceEvent> {
        let mut patch = StagePatch::default();
        match field {
            StageField::Title => {
                let title = input.trim();
                if title.is_empty() {
                    return Some(WorkspaceEvent::Status("Title cannot be empty".to_string()));
                }
                patch.title = Some(title.to_string());
            }
            StageField::Department => patch.department = Some(input.trim().to_string()),
            StageField::Days => match input.trim().parse::<u32>() {
                Ok(days) => patch.days = Some(days),
                Err(_) => {
                    return Some(WorkspaceEvent::Status(format!(
                        "'{}' is not a number of days",
                        input.trim()
                    )))
                }
            },
            StageField::Status => {}
        }
        self.mode = PanelMode::Normal;
        self.workspace.apply_patch(&patch);
        None
    }

    fn handle_action(&mut self, action: Action) -> Option<WorkspaceEvent> {
        let tool = self.selected_tool();
        match action {
            Action::NavigateUp => {
                match self.focus {
                    WorkspaceFocus::Tools => {
                        let len = ToolKind::all().len();
                        self.selected_tool = (self.selected_tool + len - 1) % len;
                    }
                    WorkspaceFocus::Fields => {
                        let len = StageField::ALL.len();
                        self.selected_field = (self.selected_field + len - 1) % len;
                    }
                }
                None
            }
            Action::NavigateDown => {
                match self.focus {
                    WorkspaceFocus::Tools => {
                        self.selected_tool = (self.selected_tool + 1) % ToolKind::all().len();
                    }
                    WorkspaceFocus::Fields => {
                        self.selected_field = (self.selected_field + 1) % StageField::ALL.len();
                    }
                }
                None
            }
            Action::SwitchFocus => {
                self.focus = match self.focus {
                    WorkspaceFocus::Tools => WorkspaceFocus::Fields,
                    WorkspaceFocus::Fields => WorkspaceFocus::Tools,
                };
                None
            }
            Action::Select => match self.focus {
                WorkspaceFocus::Tools => self.start_drag(),
                WorkspaceFocus::Fields => {
                    self.begin_field_edit();
                    None
                }
            },
            Action::Save => Some(WorkspaceEvent::SaveRequested),
            Action::Revert => {
                self.workspace.revert();
                Some(WorkspaceEvent::Status("Changes reverted".to_string()))
            }
            Action::CycleLayoutMode => {
                let mode = self.workspace.cycle_mode();
                Some(WorkspaceEvent::Status(format!("Layout: {mode}")))
            }
            Action::ToggleDensity => {
                self.workspace.toggle_density();
                None
            }
            Action::ToggleGuides => {
                self.workspace.toggle_guides();
                None
            }
            Action::ZoomIn => {
                self.workspace.zoom_in();
                None
            }
            Action::ZoomOut => {
                self.workspace.zoom_out();
                None
            }
            Action::ToggleTool => self.toggle_selected(),
            Action::RemoveTool => {
                if self.workspace.stage().has_tool(tool) {
                    self.toggle_selected()
                } else {
                    None
                }
            }
            Action::ConfigureTool => self.catalog_event(false),
            Action::MoveToolUp => {
                self.workspace.move_tool_up(tool);
                None
            }
            Action::MoveToolDown => {
                self.workspace.move_tool_down(tool);
                None
            }
            Action::MoveToolLeft => {
                self.workspace.move_tool_across(tool, Side::Left);
                None
            }
            Action::MoveToolRight => {
                self.workspace.move_tool_across(tool, Side::Right);
                None
            }
            Action::OpenBalloonEditor => self.catalog_event(false),
            Action::OpenBalloonManager => self.catalog_event(true),
            Action::CycleStatus => {
                self.cycle_status();
                None
            }
            Action::WriteComment => self.require_tool(ToolKind::Comments).or_else(|| {
                self.mode = PanelMode::Composing;
                None
            }),
            Action::NewVersion => self
                .require_tool(ToolKind::Management)
                .or(Some(WorkspaceEvent::CreateVersion)),
            Action::AttachDocument => self.require_tool(ToolKind::Management).or_else(|| {
                self.mode = PanelMode::Attaching {
                    input: String::new(),
                };
                None
            }),
            Action::ApproveSignature => self
                .require_tool(ToolKind::Signatures)
                .or(Some(WorkspaceEvent::DecideSignature(SignatureDecision::Approved))),
            Action::RejectSignature => self
                .require_tool(ToolKind::Signatures)
                .or(Some(WorkspaceEvent::DecideSignature(SignatureDecision::Rejected))),
            Action::OpenDocument => Some(WorkspaceEvent::OpenDocument),
            Action::CopyLink => Some(WorkspaceEvent::CopyLink),
            Action::ToggleOffline => Some(WorkspaceEvent::ToggleOffline),
            Action::ToggleHelp => {
                self.mode = PanelMode::Help;
                None
            }
            Action::Cancel => match self.workspace.request_close() {
                CloseDecision::Close => {
                    self.closed = true;
                    Some(WorkspaceEvent::Closed)
                }
                CloseDecision::ConfirmDiscard => {
                    self.mode = PanelMode::ConfirmClose;
                    None
                }
            },
            Action::Quit => None,
        }
    }

    fn handle_drag_input(
        &mut self,
        key: KeyEvent,
        targets: Vec<DropTarget>,
        mut index: usize,
    ) -> Option<WorkspaceEvent> {
        let len = targets.len();
        if len == 0 {
            self.workspace.drag_end(None);
            return None;
        }
        match key.code {
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => {
                index = (index + len - 1) % len;
            }
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => {
                index = (index + 1) % len;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.mode = PanelMode::Normal;
                let moved = self.workspace.drag_end(targets.get(index).copied());
                debug!(moved, "drag finished");
                return None;
            }
            KeyCode::Esc => {
                self.mode = PanelMode::Normal;
                self.workspace.drag_end(None);
                return None;
            }
            _ => return None,
        }
        self.workspace.drag_over(targets.get(index).copied());
        self.mode = PanelMode::Dragging { targets, index };
        None
    }

    /// Applies a key to a text buffer. Returns `Some(true)` on Enter and
    /// `Some(false)` on Esc.
    fn edit_text(key: KeyEvent, input: &mut String) -> Option<bool> {
        match key.code {
            KeyCode::Enter => Some(true),
            KeyCode::Esc => Some(false),
            KeyCode::Backspace => {
                input.pop();
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                input.push(c);
                None
            }
            _ => None,
        }
    }
}

impl Component for WorkspacePanel {
    type Event = WorkspaceEvent;

    fn handle_input(&mut self, key: KeyEvent) -> Option<Self::Event> {
        match std::mem::replace(&mut self.mode, PanelMode::Normal) {
            PanelMode::Normal => {
                let action = self.shortcuts.lookup(WORKSPACE_CONTEXT, key)?;
                self.handle_action(action)
            }
            PanelMode::EditingField { field, mut input } => {
                match Self::edit_text(key, &mut input) {
                    Some(true) => {
                        let event = self.commit_field(field, &input);
                        if event.is_some() {
                            self.mode = PanelMode::EditingField { field, input };
                        }
                        event
                    }
                    Some(false) => None,
                    None => {
                        self.mode = PanelMode::EditingField { field, input };
                        None
                    }
                }
            }
            PanelMode::Composing => {
                let mut composer = std::mem::take(&mut self.composer);
                let outcome = Self::edit_text(key, &mut composer);
                self.composer = composer;
                match outcome {
                    Some(true) => {
                        self.mode = PanelMode::Composing;
                        Some(WorkspaceEvent::SubmitComment)
                    }
                    Some(false) => None,
                    None => {
                        self.mode = PanelMode::Composing;
                        None
                    }
                }
            }
            PanelMode::Attaching { mut input } => match Self::edit_text(key, &mut input) {
                Some(true) => Some(WorkspaceEvent::UploadAttachment(input)),
                Some(false) => None,
                None => {
                    self.mode = PanelMode::Attaching { input };
                    None
                }
            },
            PanelMode::Dragging { targets, index } => self.handle_drag_input(key, targets, index),
            PanelMode::ConfirmClose => match key.code {
                KeyCode::Char('y') => {
                    self.workspace.revert();
                    self.closed = true;
                    Some(WorkspaceEvent::Closed)
                }
                KeyCode::Char('n') | KeyCode::Esc => None,
                _ => {
                    self.mode = PanelMode::ConfirmClose;
                    None
                }
            },
            PanelMode::Help => None,
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(36), Constraint::Percentage(64)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Fields
                Constraint::Length(9), // Tools
                Constraint::Min(5),    // Activity
                Constraint::Length(3), // Keys
            ])
            .split(panes[0]);

        self.render_fields(f, left[0], theme);
        self.render_tools(f, left[1], theme);
        self.render_activity(f, left[2], theme);

        let keys = Paragraph::new(vec![help_line(
            &[
                ("Space", ": Tool  "),
                ("Enter", ": Drag  "),
                ("m/d/g", ": Layout  "),
                ("b", ": Balloons  "),
                ("?", ": Help"),
            ],
            theme,
        )])
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(keys, left[3]);

        let designer = self.workspace.designer();
        render_stage_card(
            f,
            panes[1],
            StageCardView {
                stage: self.workspace.stage(),
                layout: designer.layout(),
                drag: designer.drag(),
                selected: Some(self.selected_tool()),
            },
            theme,
        );

        match &self.mode {
            PanelMode::ConfirmClose => render_unsaved_prompt(f, theme),
            PanelMode::Help => render_workspace_help(f, area, theme),
            _ => {}
        }
    }

    fn should_close(&self) -> bool {
        self.closed
    }
}

impl WorkspacePanel {
    fn render_fields(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let stage = self.workspace.stage();
        let focused = self.focus == WorkspaceFocus::Fields;
        let lines: Vec<Line> = StageField::ALL
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let value = match (&self.mode, field) {
                    (PanelMode::EditingField { field: editing, input }, _) if editing == field => {
                        format!("{input}_")
                    }
                    (_, StageField::Title) => stage.title.clone(),
                    (_, StageField::Department) => stage.department.clone(),
                    (_, StageField::Days) => stage.days.to_string(),
                    (_, StageField::Status) => stage.status.to_string(),
                };
                let label_style = if focused && i == self.selected_field {
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text_secondary)
                };
                Line::from(vec![
                    Span::styled(format!("{:<11}", field.label()), label_style),
                    Span::styled(value, Style::default().fg(theme.text)),
                ])
            })
            .collect();

        let title = if self.workspace.has_changes() {
            " Stage * "
        } else {
            " Stage "
        };
        let border = if focused { theme.primary } else { theme.text_muted };
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );
        f.render_widget(widget, area);
    }

    fn render_tools(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let stage = self.workspace.stage();
        let layout = self.workspace.layout();
        let focused = self.focus == WorkspaceFocus::Tools;
        let items: Vec<ListItem> = ToolKind::all()
            .iter()
            .enumerate()
            .map(|(i, tool)| {
                let enabled = stage.has_tool(*tool);
                let check = if enabled { "[x] " } else { "[ ] " };
                let place = match layout.position_of(*tool) {
                    Some((Column::Left, _)) => " ◧",
                    Some((Column::Right, _)) => " ◨",
                    _ => "",
                };
                let style = if focused && i == self.selected_tool {
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
                } else if enabled {
                    Style::default().fg(theme.text)
                } else {
                    Style::default().fg(theme.text_muted)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(check, style),
                    Span::styled(format!("{} {}", tool.meta().icon, tool.meta().title), style),
                    Span::styled(place, Style::default().fg(theme.text_muted)),
                ]))
            })
            .collect();

        let border = if focused { theme.primary } else { theme.text_muted };
        let title = match &self.mode {
            PanelMode::Dragging { .. } => " Tools (dragging: ↑/↓ target, Enter drop) ",
            _ => " Tools ",
        };
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );
        f.render_widget(list, area);
    }

    fn render_activity(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let config = &self.workspace.stage().tool_config;
        let mut lines: Vec<Line> = Vec::new();

        if let Some(comments) = &config.comments {
            for comment in comments.comments.iter().rev().take(4).rev() {
                let marker = match comment.state {
                    SyncState::Pending => Span::styled("… ", Style::default().fg(theme.warning)),
                    SyncState::Confirmed => Span::styled("✓ ", Style::default().fg(theme.success)),
                };
                lines.push(Line::from(vec![
                    marker,
                    Span::styled(
                        format!("{}: ", comment.author),
                        Style::default().fg(theme.text_secondary),
                    ),
                    Span::raw(comment.text.clone()),
                ]));
            }
        }
        if let Some(management) = &config.management {
            let pending = management
                .versions
                .iter()
                .filter(|v| v.state == SyncState::Pending)
                .count()
                + management
                    .attachments
                    .iter()
                    .filter(|a| a.state == SyncState::Pending)
                    .count();
            if pending > 0 {
                lines.push(Line::from(Span::styled(
                    format!("… {pending} upload(s) pending"),
                    Style::default().fg(theme.warning),
                )));
            }
        }

        match &self.mode {
            PanelMode::Composing => lines.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(theme.primary)),
                Span::raw(format!("{}_", self.composer)),
            ])),
            PanelMode::Attaching { input } => lines.push(Line::from(vec![
                Span::styled("attach> ", Style::default().fg(theme.primary)),
                Span::raw(format!("{input}_")),
            ])),
            _ if !self.composer.is_empty() => lines.push(Line::from(Span::styled(
                format!("draft: {}", self.composer),
                Style::default().fg(theme.text_muted),
            ))),
            _ => {}
        }

        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "No activity. c: comment  v: version  a: attach",
                Style::default().fg(theme.text_muted),
            )));
        }

        let widget = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Activity "));
        f.render_widget(widget, area);
    }
}

fn render_workspace_help(f: &mut Frame, area: Rect, theme: &Theme) {
    let help_area = centered_rect(60, 70, area);
    f.render_widget(Clear, help_area);

    let rows: [(&str, &str); 16] = [
        ("Ctrl+S / Ctrl+R", "Save / revert"),
        ("Tab", "Switch between tools and fields"),
        ("Space / x", "Toggle / remove tool"),
        ("Enter", "Drag tool, or edit field"),
        ("Shift+↑/↓", "Move tool in its column"),
        ("Shift+←/→", "Move tool between columns"),
        ("m / d / g", "Layout mode / density / guides"),
        ("+ / -", "Scale preview"),
        ("b / Shift+B / e", "Balloon editor / manager / configure"),
        ("t", "Cycle status"),
        ("c", "Write comment"),
        ("v / a", "New version / attach document"),
        ("p / Shift+P", "Approve / reject signature"),
        ("o / y", "Open / copy document link"),
        ("Ctrl+F", "Simulate backend failure"),
        ("Esc", "Close workspace"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(key, label)| {
            Line::from(vec![
                Span::styled(format!("{key:<18}"), Style::default().fg(theme.primary)),
                Span::styled(*label, Style::default().fg(theme.text)),
            ])
        })
        .collect();

    let help = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Workspace Keys (any key to close) ")
                .style(Style::default().bg(theme.background)),
        );
    f.render_widget(help, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LayoutMode, ModelStage, SignatureDecision, Signer, StageStatus};
    use crate::services::{
        LayoutRepository, NoticeLevel, NoticeLog, SimulatedTransport, ToolDependencies,
    };
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn panel_for(stage: &ModelStage) -> WorkspacePanel {
        let layouts = LayoutRepository::in_memory();
        WorkspacePanel::new(StageWorkspace::open(
            stage,
            &layouts,
            ToolDependencies::default(),
        ))
    }

    fn stage() -> ModelStage {
        let mut stage = ModelStage::new("dfd", "DFD", 0);
        stage.enable_tool(ToolKind::MainForm);
        stage.enable_tool(ToolKind::Comments);
        stage
    }

    fn user() -> CurrentUser {
        CurrentUser {
            name: "Ana".to_string(),
            role: "Analista".to_string(),
        }
    }

    fn select(panel: &mut WorkspacePanel, tool: ToolKind) {
        while panel.selected_tool() != tool {
            panel.handle_input(key(KeyCode::Down));
        }
    }

    #[test]
    fn test_space_toggles_with_dependencies() {
        let mut stage = ModelStage::new("dfd", "DFD", 0);
        stage.enable_tool(ToolKind::Comments);
        let mut panel = panel_for(&stage);
        select(&mut panel, ToolKind::StageActions);
        let event = panel.handle_input(key(KeyCode::Char(' ')));
        assert_eq!(
            event,
            Some(WorkspaceEvent::Status(
                "Enabled stage_actions, main_form".to_string()
            ))
        );
        assert!(panel.workspace().stage().has_tool(ToolKind::MainForm));
        assert!(panel.workspace().has_changes());
    }

    #[test]
    fn test_layout_keys() {
        let mut panel = panel_for(&stage());
        panel.handle_input(key(KeyCode::Char('m')));
        assert_eq!(panel.workspace().layout().mode, LayoutMode::Split50);
        panel.handle_input(key(KeyCode::Char('g')));
        assert!(panel.workspace().layout().show_guides);
        panel.handle_input(key(KeyCode::Char('+')));
        assert!(panel.workspace().layout().scale > 1.0);
    }

    #[test]
    fn test_drag_with_keyboard() {
        let mut panel = panel_for(&stage());
        select(&mut panel, ToolKind::Comments);
        panel.handle_input(key(KeyCode::Enter));
        assert!(matches!(panel.mode(), PanelMode::Dragging { .. }));
        panel.handle_input(key(KeyCode::Up));
        panel.handle_input(key(KeyCode::Enter));

        assert_eq!(panel.mode(), &PanelMode::Normal);
        assert_eq!(
            panel.workspace().layout().order_stack,
            vec![ToolKind::Comments, ToolKind::MainForm]
        );
    }

    #[test]
    fn test_b_opens_editor_for_owning_tool() {
        let mut panel = panel_for(&stage());
        select(&mut panel, ToolKind::MainForm);
        assert_eq!(
            panel.handle_input(key(KeyCode::Char('b'))),
            Some(WorkspaceEvent::OpenBalloonEditor(BalloonArea::RequiredFields))
        );
        select(&mut panel, ToolKind::Comments);
        assert!(matches!(
            panel.handle_input(key(KeyCode::Char('b'))),
            Some(WorkspaceEvent::Status(_))
        ));
    }

    #[test]
    fn test_field_edit_applies_patch() {
        let mut panel = panel_for(&stage());
        panel.handle_input(key(KeyCode::Tab));
        panel.handle_input(key(KeyCode::Down));
        panel.handle_input(key(KeyCode::Down));
        panel.handle_input(key(KeyCode::Enter));
        panel.handle_input(key(KeyCode::Backspace));
        panel.handle_input(key(KeyCode::Char('7')));
        panel.handle_input(key(KeyCode::Enter));
        assert_eq!(panel.workspace().stage().days, 7);

        panel.handle_input(key(KeyCode::Char('t')));
        assert_eq!(panel.workspace().stage().status, StageStatus::Pending.cycle());
    }

    #[test]
    fn test_bad_days_keep_editing() {
        let mut panel = panel_for(&stage());
        panel.handle_input(key(KeyCode::Tab));
        panel.handle_input(key(KeyCode::Down));
        panel.handle_input(key(KeyCode::Down));
        panel.handle_input(key(KeyCode::Enter));
        panel.handle_input(key(KeyCode::Char('x')));
        let event = panel.handle_input(key(KeyCode::Enter));
        assert!(matches!(event, Some(WorkspaceEvent::Status(_))));
        assert!(matches!(panel.mode(), PanelMode::EditingField { .. }));
    }

    #[test]
    fn test_escape_with_changes_prompts() {
        let mut panel = panel_for(&stage());
        panel.handle_input(key(KeyCode::Char('d')));
        assert_eq!(panel.handle_input(key(KeyCode::Esc)), None);
        assert_eq!(panel.mode(), &PanelMode::ConfirmClose);
        assert_eq!(
            panel.handle_input(key(KeyCode::Char('y'))),
            Some(WorkspaceEvent::Closed)
        );
        assert!(panel.should_close());
        assert!(!panel.workspace().has_changes());
    }

    #[test]
    fn test_comment_rollback_restores_composer() {
        let mut panel = panel_for(&stage());
        let mut queue = OptimisticQueue::new();
        let mut transport = SimulatedTransport::new(Duration::from_millis(100));
        let notices = NoticeLog::new();
        let start = Instant::now();

        panel.handle_input(key(KeyCode::Char('c')));
        for c in "Revisar".chars() {
            panel.handle_input(key(KeyCode::Char(c)));
        }
        assert_eq!(
            panel.handle_input(key(KeyCode::Enter)),
            Some(WorkspaceEvent::SubmitComment)
        );
        panel
            .submit_comment(&mut queue, &user(), &transport, start)
            .unwrap();
        assert_eq!(panel.composer(), "");
        assert_eq!(panel.mode(), &PanelMode::Normal);

        transport.set_failing(true);
        let resolutions =
            panel.poll(&mut queue, &transport, &notices, start + Duration::from_millis(150));
        assert_eq!(resolutions.len(), 1);
        assert_eq!(panel.composer(), "Revisar");
        let comments = panel.workspace().stage().tool_config.comments.as_ref().unwrap();
        assert!(comments.comments.is_empty());
        assert_eq!(notices.snapshot()[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_signature_prefers_matching_signer() {
        let mut stage = stage();
        stage.enable_tool(ToolKind::Signatures);
        stage.tool_config.signatures_mut().signers = vec![
            Signer {
                id: "s1".to_string(),
                name: "Bruno".to_string(),
                role: "Diretor".to_string(),
                decision: SignatureDecision::Pending,
            },
            Signer {
                id: "s2".to_string(),
                name: "Ana".to_string(),
                role: "Analista".to_string(),
                decision: SignatureDecision::Pending,
            },
        ];
        let mut panel = panel_for(&stage);
        let mut queue = OptimisticQueue::new();
        let transport = SimulatedTransport::new(Duration::ZERO);

        let id = panel
            .decide_signature(
                &mut queue,
                &user(),
                SignatureDecision::Approved,
                &transport,
                Instant::now(),
            )
            .unwrap();
        assert_eq!(id, "s2");
    }
}
