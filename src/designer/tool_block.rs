//! Tool block metadata and read-only badges.

use crate::models::{ModelStage, ToolKind, ToolMeta};

/// Emphasis of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    /// Plain count
    Neutral,
    /// Something is complete
    Success,
    /// Something is missing
    Warning,
}

/// A small status label in a tool block header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// Text
    pub label: String,
    /// Emphasis
    pub tone: BadgeTone,
}

impl Badge {
    fn neutral(label: String) -> Self {
        Self {
            label,
            tone: BadgeTone::Neutral,
        }
    }
}

/// Affordances offered by a tool block's chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeAction {
    /// Disable the tool on this stage
    Remove,
    /// Open the tool's configuration
    Configure,
}

/// Everything needed to draw one tool block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolBlock {
    /// Tool kind
    pub kind: ToolKind,
    /// Title, description and glyph
    pub meta: ToolMeta,
    /// Badges derived from the stage's tool configuration
    pub badges: Vec<Badge>,
}

impl ToolBlock {
    /// Chrome actions available on every block.
    pub const ACTIONS: [ChromeAction; 2] = [ChromeAction::Configure, ChromeAction::Remove];

    /// Describes `kind` as configured on `stage`.
    #[must_use]
    pub fn describe(kind: ToolKind, stage: &ModelStage) -> Self {
        Self {
            kind,
            meta: kind.meta(),
            badges: badges(kind, stage),
        }
    }

    /// Describes a tool given by identifier; unknown identifiers describe nothing.
    #[must_use]
    pub fn describe_id(id: &str, stage: &ModelStage) -> Option<Self> {
        ToolKind::parse(id).map(|kind| Self::describe(kind, stage))
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn badges(kind: ToolKind, stage: &ModelStage) -> Vec<Badge> {
    let config = &stage.tool_config;
    match kind {
        ToolKind::Management => {
            let (versions, attachments) = config
                .management
                .as_ref()
                .map_or((0, 0), |m| (m.versions.len(), m.attachments.len()));
            vec![
                Badge::neutral(plural(versions, "version", "versions")),
                Badge::neutral(plural(attachments, "attachment", "attachments")),
            ]
        }
        ToolKind::MainForm => {
            let filled = config.main_form.as_ref().map_or(0, |f| f.filled_count());
            vec![Badge::neutral(format!("{filled} filled"))]
        }
        ToolKind::StagePanel => {
            let (done, total) = config
                .stage_panel
                .as_ref()
                .map_or((0, 0), |p| p.completion());
            let tone = if total > 0 && done == total {
                BadgeTone::Success
            } else {
                BadgeTone::Neutral
            };
            vec![Badge {
                label: format!("{done}/{total} done"),
                tone,
            }]
        }
        ToolKind::StageActions => {
            let count = config
                .stage_actions
                .as_ref()
                .map_or(0, |a| a.enabled_actions.len());
            vec![Badge::neutral(plural(count, "action", "actions"))]
        }
        ToolKind::Comments => {
            let count = config.comments.as_ref().map_or(0, |c| c.comments.len());
            vec![Badge::neutral(plural(count, "comment", "comments"))]
        }
        ToolKind::Signatures => {
            let (signed, total) = config.signatures.as_ref().map_or((0, 0), |s| s.signed());
            let tone = if total > 0 && signed == total {
                BadgeTone::Success
            } else {
                BadgeTone::Neutral
            };
            vec![Badge {
                label: format!("{signed}/{total} signed"),
                tone,
            }]
        }
        ToolKind::DocView => {
            let linked = config
                .doc_view
                .as_ref()
                .and_then(|d| d.url.as_deref())
                .is_some_and(|url| !url.trim().is_empty());
            vec![if linked {
                Badge {
                    label: "linked".to_string(),
                    tone: BadgeTone::Success,
                }
            } else {
                Badge {
                    label: "no link".to_string(),
                    tone: BadgeTone::Warning,
                }
            }]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChecklistItem, Signer, SignatureDecision};

    #[test]
    fn test_unknown_id_describes_nothing() {
        let stage = ModelStage::new("s", "S", 0);
        assert!(ToolBlock::describe_id("kanban", &stage).is_none());
        assert!(ToolBlock::describe_id("doc-view", &stage).is_some());
    }

    #[test]
    fn test_badges_without_payload() {
        let stage = ModelStage::new("s", "S", 0);
        let block = ToolBlock::describe(ToolKind::Management, &stage);
        assert_eq!(block.meta.title, "Management");
        let labels: Vec<&str> = block.badges.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["0 versions", "0 attachments"]);

        let doc = ToolBlock::describe(ToolKind::DocView, &stage);
        assert_eq!(doc.badges[0].label, "no link");
        assert_eq!(doc.badges[0].tone, BadgeTone::Warning);
    }

    #[test]
    fn test_checklist_and_signature_completion() {
        let mut stage = ModelStage::new("s", "S", 0);
        stage.tool_config.stage_panel_mut().checklist = vec![
            ChecklistItem {
                id: "a".to_string(),
                label: "A".to_string(),
                done: true,
            },
            ChecklistItem {
                id: "b".to_string(),
                label: "B".to_string(),
                done: false,
            },
        ];
        stage.tool_config.signatures_mut().signers.push(Signer {
            id: "s1".to_string(),
            name: "Ana".to_string(),
            role: String::new(),
            decision: SignatureDecision::Approved,
        });

        let panel = ToolBlock::describe(ToolKind::StagePanel, &stage);
        assert_eq!(panel.badges[0].label, "1/2 done");
        assert_eq!(panel.badges[0].tone, BadgeTone::Neutral);

        let signatures = ToolBlock::describe(ToolKind::Signatures, &stage);
        assert_eq!(signatures.badges[0].label, "1/1 signed");
        assert_eq!(signatures.badges[0].tone, BadgeTone::Success);
    }

    #[test]
    fn test_doc_view_linked() {
        let mut stage = ModelStage::new("s", "S", 0);
        stage.tool_config.doc_view_mut().url = Some("https://docs.example/dfd".to_string());
        let block = ToolBlock::describe(ToolKind::DocView, &stage);
        assert_eq!(block.badges[0].label, "linked");
    }

    #[test]
    fn test_singular_counts() {
        let mut stage = ModelStage::new("s", "S", 0);
        stage
            .tool_config
            .stage_actions
            .get_or_insert_with(Default::default)
            .enabled_actions
            .push("a1".to_string());
        let block = ToolBlock::describe(ToolKind::StageActions, &stage);
        assert_eq!(block.badges[0].label, "1 action");
    }
}
