//! Keyboard shortcut registry.
//!
//! Maps key events to [`Action`]s per screen context. Text-entry modes
//! (labels, comments, field edits) read keys directly and bypass the registry.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Context of the stage list screen.
pub const STAGES_CONTEXT: &str = "stages";
/// Context of the stage edit workspace.
pub const WORKSPACE_CONTEXT: &str = "workspace";

/// All bindable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Navigation
    /// Move selection up
    NavigateUp,
    /// Move selection down
    NavigateDown,
    /// Move between the tool list and the stage fields
    SwitchFocus,
    /// Open, edit or pick up the selection
    Select,

    // Stage list
    /// Exit the application
    Quit,

    // Workspace: lifecycle
    /// Commit the draft
    Save,
    /// Discard the draft
    Revert,

    // Workspace: layout
    /// Next layout mode
    CycleLayoutMode,
    /// Cozy / compact
    ToggleDensity,
    /// Column guides on/off
    ToggleGuides,
    /// Grow the preview
    ZoomIn,
    /// Shrink the preview
    ZoomOut,

    // Workspace: tools
    /// Enable or disable the selected tool
    ToggleTool,
    /// Disable the selected tool from its chrome
    RemoveTool,
    /// Configure the selected tool
    ConfigureTool,
    /// Move tool up in its column
    MoveToolUp,
    /// Move tool down in its column
    MoveToolDown,
    /// Move tool to the left column
    MoveToolLeft,
    /// Move tool to the right column
    MoveToolRight,

    // Workspace: catalogs
    /// Transactional balloon editor for the selected tool's area
    OpenBalloonEditor,
    /// Inline balloon manager for the selected tool's area
    OpenBalloonManager,

    // Workspace: collaboration
    /// Cycle stage status
    CycleStatus,
    /// Start typing a comment
    WriteComment,
    /// Create a document version
    NewVersion,
    /// Attach a document
    AttachDocument,
    /// Approve as the current user
    ApproveSignature,
    /// Reject as the current user
    RejectSignature,
    /// Open the linked document
    OpenDocument,
    /// Copy the linked document's URL
    CopyLink,
    /// Make the simulated backend fail or recover
    ToggleOffline,

    // Help
    /// Show or hide key help
    ToggleHelp,

    // General
    /// Cancel / close
    Cancel,
}

impl Action {
    /// Stable identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::NavigateUp => "navigate_up",
            Self::NavigateDown => "navigate_down",
            Self::SwitchFocus => "switch_focus",
            Self::Select => "select",
            Self::Quit => "quit",
            Self::Save => "save",
            Self::Revert => "revert",
            Self::CycleLayoutMode => "cycle_layout_mode",
            Self::ToggleDensity => "toggle_density",
            Self::ToggleGuides => "toggle_guides",
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::ToggleTool => "toggle_tool",
            Self::RemoveTool => "remove_tool",
            Self::ConfigureTool => "configure_tool",
            Self::MoveToolUp => "move_tool_up",
            Self::MoveToolDown => "move_tool_down",
            Self::MoveToolLeft => "move_tool_left",
            Self::MoveToolRight => "move_tool_right",
            Self::OpenBalloonEditor => "open_balloon_editor",
            Self::OpenBalloonManager => "open_balloon_manager",
            Self::CycleStatus => "cycle_status",
            Self::WriteComment => "write_comment",
            Self::NewVersion => "new_version",
            Self::AttachDocument => "attach_document",
            Self::ApproveSignature => "approve_signature",
            Self::RejectSignature => "reject_signature",
            Self::OpenDocument => "open_document",
            Self::CopyLink => "copy_link",
            Self::ToggleOffline => "toggle_offline",
            Self::ToggleHelp => "toggle_help",
            Self::Cancel => "cancel",
        }
    }
}

/// A key binding (key + modifiers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    /// Key
    pub code: KeyCode,
    /// Modifiers held
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Create a new key binding.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Create a key binding from a KeyEvent.
    #[must_use]
    pub const fn from_event(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Shortcut registry that maps key events to actions for a given context.
#[derive(Debug, Clone)]
pub struct ShortcutRegistry {
    bindings: HashMap<(String, KeyBinding), Action>,
}

impl ShortcutRegistry {
    /// Create a new shortcut registry with default bindings.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            bindings: HashMap::new(),
        };

        registry.register_navigation(STAGES_CONTEXT);
        registry.register_navigation(WORKSPACE_CONTEXT);
        registry.register_stage_list_shortcuts();
        registry.register_workspace_shortcuts();
        registry
    }

    fn register_navigation(&mut self, ctx: &str) {
        use KeyCode as K;
        use KeyModifiers as M;

        self.register(ctx, K::Up, M::NONE, Action::NavigateUp);
        self.register(ctx, K::Down, M::NONE, Action::NavigateDown);
        self.register(ctx, K::Char('k'), M::NONE, Action::NavigateUp);
        self.register(ctx, K::Char('j'), M::NONE, Action::NavigateDown);
        self.register(ctx, K::Enter, M::NONE, Action::Select);
        self.register(ctx, K::Char('?'), M::NONE, Action::ToggleHelp);
        self.register(ctx, K::Esc, M::NONE, Action::Cancel);
    }

    fn register_stage_list_shortcuts(&mut self) {
        use KeyCode as K;
        use KeyModifiers as M;

        let ctx = STAGES_CONTEXT;
        self.register(ctx, K::Char('q'), M::NONE, Action::Quit);
        self.register(ctx, K::Char('q'), M::CONTROL, Action::Quit);
    }

    fn register_workspace_shortcuts(&mut self) {
        use KeyCode as K;
        use KeyModifiers as M;

        let ctx = WORKSPACE_CONTEXT;

        // === LIFECYCLE ===
        self.register(ctx, K::Char('s'), M::CONTROL, Action::Save);
        self.register(ctx, K::Char('s'), M::SUPER, Action::Save);
        self.register(ctx, K::Char('r'), M::CONTROL, Action::Revert);
        self.register(ctx, K::Tab, M::NONE, Action::SwitchFocus);

        // === LAYOUT ===
        self.register(ctx, K::Char('m'), M::NONE, Action::CycleLayoutMode);
        self.register(ctx, K::Char('d'), M::NONE, Action::ToggleDensity);
        self.register(ctx, K::Char('g'), M::NONE, Action::ToggleGuides);
        self.register(ctx, K::Char('+'), M::NONE, Action::ZoomIn);
        self.register(ctx, K::Char('+'), M::SHIFT, Action::ZoomIn);
        self.register(ctx, K::Char('='), M::NONE, Action::ZoomIn);
        self.register(ctx, K::Char('-'), M::NONE, Action::ZoomOut);

        // === TOOLS ===
        self.register(ctx, K::Char(' '), M::NONE, Action::ToggleTool);
        self.register(ctx, K::Char('x'), M::NONE, Action::RemoveTool);
        self.register(ctx, K::Char('e'), M::NONE, Action::ConfigureTool);
        self.register(ctx, K::Up, M::SHIFT, Action::MoveToolUp);
        self.register(ctx, K::Down, M::SHIFT, Action::MoveToolDown);
        self.register(ctx, K::Left, M::SHIFT, Action::MoveToolLeft);
        self.register(ctx, K::Right, M::SHIFT, Action::MoveToolRight);

        // === CATALOGS ===
        self.register(ctx, K::Char('b'), M::NONE, Action::OpenBalloonEditor);
        self.register(ctx, K::Char('B'), M::SHIFT, Action::OpenBalloonManager);

        // === COLLABORATION ===
        self.register(ctx, K::Char('t'), M::NONE, Action::CycleStatus);
        self.register(ctx, K::Char('c'), M::NONE, Action::WriteComment);
        self.register(ctx, K::Char('v'), M::NONE, Action::NewVersion);
        self.register(ctx, K::Char('a'), M::NONE, Action::AttachDocument);
        self.register(ctx, K::Char('p'), M::NONE, Action::ApproveSignature);
        self.register(ctx, K::Char('P'), M::SHIFT, Action::RejectSignature);
        self.register(ctx, K::Char('o'), M::NONE, Action::OpenDocument);
        self.register(ctx, K::Char('y'), M::NONE, Action::CopyLink);
        self.register(ctx, K::Char('f'), M::CONTROL, Action::ToggleOffline);
    }

    /// Register a shortcut binding.
    fn register(&mut self, context: &str, code: KeyCode, modifiers: KeyModifiers, action: Action) {
        let binding = KeyBinding::new(code, modifiers);
        self.bindings.insert((context.to_string(), binding), action);
    }

    /// Look up an action for a given context and key event.
    #[must_use]
    pub fn lookup(&self, context: &str, event: KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(event);
        self.bindings.get(&(context.to_string(), binding)).copied()
    }

    /// Check if a key event matches a specific action in the given context.
    #[must_use]
    pub fn matches(&self, context: &str, event: KeyEvent, action: Action) -> bool {
        self.lookup(context, event) == Some(action)
    }
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self::new()
    }
}
