//! Stage card composition: which tool blocks appear, where, and how they look.

pub mod stage_card;
pub mod tool_block;

pub use stage_card::{
    status_visual, DragState, DropTarget, Side, StageCardDesigner, StatusAccent, StatusVisual,
};
pub use tool_block::{Badge, BadgeTone, ChromeAction, ToolBlock};
