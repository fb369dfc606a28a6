//! The persisted workflow template document.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{
    BalloonArea, BalloonColor, BalloonIcon, BalloonItem, ChecklistItem, ModelStage, StageStatus,
    ToolKind,
};
use crate::services::catalog::BalloonStore;
use crate::services::StageError;

/// A procurement workflow: its ordered stages plus every balloon catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    /// Template name
    pub name: String,
    /// Stages, sorted by `order_index`
    #[serde(default)]
    pub stages: Vec<ModelStage>,
    /// Balloon catalogs keyed by stage id and area
    #[serde(default)]
    pub catalogs: BalloonStore,
}

impl WorkflowTemplate {
    /// Creates an empty template.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            catalogs: BalloonStore::new(),
        }
    }

    /// Looks up a stage by id.
    #[must_use]
    pub fn stage(&self, id: &str) -> Option<&ModelStage> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Mutable lookup of a stage by id.
    pub fn stage_mut(&mut self, id: &str) -> Option<&mut ModelStage> {
        self.stages.iter_mut().find(|s| s.id == id)
    }

    /// Restores structural invariants after deserialization.
    ///
    /// Rejects repeated stage ids, then sorts stages by `order_index`, repairs
    /// each stage's tool lists, registers catalogs for stages that have none
    /// and gives blank or repeated balloon ids a fresh id.
    pub fn normalize(&mut self) -> Result<(), StageError> {
        let mut ids: BTreeSet<&str> = BTreeSet::new();
        for stage in &self.stages {
            if !ids.insert(stage.id.as_str()) {
                return Err(StageError::DuplicateId(stage.id.clone()));
            }
        }
        self.repair();
        Ok(())
    }

    fn repair(&mut self) {
        self.stages.sort_by_key(|s| s.order_index);
        for stage in &mut self.stages {
            stage.normalize_tools();
            self.catalogs.register_stage(&stage.id);
        }
        self.catalogs.repair_ids();
    }

    /// The six-stage procurement template written by `stagecard init`.
    #[must_use]
    pub fn sample() -> Self {
        let mut template = Self::new("Contratação padrão");

        let mut dfd = ModelStage::new("dfd-elaboration", "Elaboração do DFD", 0);
        dfd.department = "Requisitante".to_string();
        dfd.days = 5;
        dfd.status = StageStatus::Done;
        for tool in [ToolKind::MainForm, ToolKind::Management, ToolKind::Comments] {
            dfd.enable_tool(tool);
        }
        if let Some(form) = dfd.tool_config.main_form.as_mut() {
            form.fields
                .insert("objeto".to_string(), "Aquisição de notebooks".to_string());
            form.fields
                .insert("justificativa".to_string(), "Renovação do parque".to_string());
        }

        let mut dfd_approval = ModelStage::new("dfd-approval", "Aprovação do DFD", 1);
        dfd_approval.department = "Autoridade Competente".to_string();
        dfd_approval.days = 2;
        dfd_approval.status = StageStatus::InProgress;
        for tool in [ToolKind::DocView, ToolKind::Signatures, ToolKind::Comments] {
            dfd_approval.enable_tool(tool);
        }

        let mut dispatch = ModelStage::new("dispatch", "Despacho", 2);
        dispatch.department = "Gabinete".to_string();
        dispatch.days = 1;
        for tool in [ToolKind::MainForm, ToolKind::StageActions] {
            dispatch.enable_tool(tool);
        }

        let mut etp = ModelStage::new("etp-elaboration", "Elaboração do ETP", 3);
        etp.department = "Planejamento".to_string();
        etp.days = 10;
        for tool in [
            ToolKind::MainForm,
            ToolKind::StagePanel,
            ToolKind::Management,
            ToolKind::Comments,
        ] {
            etp.enable_tool(tool);
        }
        etp.tool_config.stage_panel_mut().checklist = vec![
            ChecklistItem {
                id: BalloonItem::generate_id(),
                label: "Levantamento de mercado".to_string(),
                done: false,
            },
            ChecklistItem {
                id: BalloonItem::generate_id(),
                label: "Estimativa de quantidades".to_string(),
                done: false,
            },
        ];

        let mut risk = ModelStage::new("risk-matrix-elaboration", "Elaboração da Matriz de Risco", 4);
        risk.department = "Gestão de Riscos".to_string();
        risk.days = 7;
        for tool in [ToolKind::MainForm, ToolKind::StagePanel] {
            risk.enable_tool(tool);
        }

        let mut risk_approval =
            ModelStage::new("risk-matrix-approval", "Aprovação da Matriz de Risco", 5);
        risk_approval.department = "Autoridade Competente".to_string();
        risk_approval.days = 2;
        for tool in [ToolKind::DocView, ToolKind::Signatures] {
            risk_approval.enable_tool(tool);
        }

        template.stages = vec![dfd, dfd_approval, dispatch, etp, risk, risk_approval];
        template.repair();
        template.seed_catalogs();
        template
    }

    fn seed_catalogs(&mut self) {
        let seeds: [(&str, BalloonArea, Vec<BalloonItem>); 3] = [
            (
                "dfd-elaboration",
                BalloonArea::RequiredFields,
                vec![
                    BalloonItem::new("Objeto").with_icon(Some(BalloonIcon::File)),
                    BalloonItem::new("Justificativa").with_icon(Some(BalloonIcon::Pen)),
                    BalloonItem::new("Urgente")
                        .with_color(BalloonColor::Amber)
                        .with_icon(Some(BalloonIcon::Alert)),
                ],
            ),
            (
                "dispatch",
                BalloonArea::ActionCatalog,
                vec![
                    BalloonItem::new("Encaminhar")
                        .with_icon(Some(BalloonIcon::Send))
                        .with_meta("action_type", "forward"),
                    BalloonItem::new("Devolver")
                        .with_color(BalloonColor::Red)
                        .with_meta("action_type", "return"),
                ],
            ),
            (
                "etp-elaboration",
                BalloonArea::ChecklistCatalog,
                vec![
                    BalloonItem::new("Levantamento de mercado")
                        .with_color(BalloonColor::Sky),
                    BalloonItem::new("Estimativa de quantidades")
                        .with_color(BalloonColor::Sky),
                ],
            ),
        ];
        for (stage_id, area, items) in seeds {
            // Stages are registered by repair()
            let _ = self.catalogs.replace_catalog(stage_id, area, items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_has_six_ordered_stages() {
        let template = WorkflowTemplate::sample();
        assert_eq!(template.stages.len(), 6);
        let indices: Vec<u32> = template.stages.iter().map(|s| s.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(template.stages[0].title, "Elaboração do DFD");
        for stage in &template.stages {
            assert!(template.catalogs.has_stage(&stage.id));
        }
    }

    #[test]
    fn test_sample_catalogs_are_seeded() {
        let template = WorkflowTemplate::sample();
        let fields = template
            .catalogs
            .catalog("dfd-elaboration", BalloonArea::RequiredFields)
            .unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[2].color, BalloonColor::Amber);
    }

    #[test]
    fn test_normalize_sorts_and_registers() {
        let mut template = WorkflowTemplate::new("t");
        template.stages.push(ModelStage::new("b", "B", 1));
        template.stages.push(ModelStage::new("a", "A", 0));
        template.normalize().unwrap();
        assert_eq!(template.stages[0].id, "a");
        assert!(template.catalogs.has_stage("b"));
    }

    #[test]
    fn test_normalize_rejects_duplicate_stage_ids() {
        let mut template = WorkflowTemplate::new("t");
        template.stages.push(ModelStage::new("a", "A", 0));
        template.stages.push(ModelStage::new("a", "Again", 1));
        assert_eq!(
            template.normalize(),
            Err(StageError::DuplicateId("a".to_string()))
        );
    }

    #[test]
    fn test_normalize_regenerates_blank_and_repeated_balloon_ids() {
        let json = r#"{
            "name": "t",
            "stages": [{"id": "a", "title": "A", "order_index": 0}],
            "catalogs": {"a": {"required_fields": [
                {"label": "Objeto"},
                {"id": "x", "label": "Prazo"},
                {"id": "x", "label": "Valor"}
            ]}}
        }"#;
        let mut template: WorkflowTemplate = serde_json::from_str(json).unwrap();
        template.normalize().unwrap();

        let items = template.catalogs.catalog("a", BalloonArea::RequiredFields).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| !item.id.is_empty()));
        assert_eq!(items[1].id, "x");
        assert_ne!(items[2].id, "x");
        assert_ne!(items[0].id, items[2].id);
    }

    #[test]
    fn test_json_round_trip() {
        let template = WorkflowTemplate::sample();
        let json = serde_json::to_string_pretty(&template).unwrap();
        let restored: WorkflowTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, template);
    }
}
