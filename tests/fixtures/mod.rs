//! Shared test fixtures for E2E CLI and API tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use stagecard::models::{BalloonArea, ModelStage, ToolKind, WorkflowTemplate};
use stagecard::services::TemplateService;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stage id of the small fixture stage.
pub const REVIEW_STAGE: &str = "review";

/// The built-in six-stage procurement template.
pub fn sample_template() -> WorkflowTemplate {
    WorkflowTemplate::sample()
}

/// A one-stage template: `review` with main form and comments enabled and
/// empty catalogs.
pub fn minimal_template() -> WorkflowTemplate {
    let mut template = WorkflowTemplate::new("Revisão");
    let mut stage = ModelStage::new(REVIEW_STAGE, "Revisão jurídica", 0);
    stage.department = "Jurídico".to_string();
    stage.days = 3;
    stage.enable_tool(ToolKind::MainForm);
    stage.enable_tool(ToolKind::Comments);
    template
        .add_stage(stage)
        .expect("fixture stage id is unique");
    template
}

/// Writes a template as JSON for CLI testing.
pub fn write_template_file(template: &WorkflowTemplate, path: &Path) {
    TemplateService::save(template, path).expect("Failed to write template");
}

/// Reads a template file written by a command under test.
pub fn read_template_file(path: &Path) -> WorkflowTemplate {
    TemplateService::load(path).expect("Failed to read template")
}

/// Creates a template file in a temp directory and returns the path.
///
/// The returned `TempDir` must outlive the test; a `layouts/` directory next
/// to the template is available via [`layouts_dir`].
pub fn create_temp_template_file(template: &WorkflowTemplate) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("workflow.json");
    write_template_file(template, &path);
    (path, temp_dir)
}

/// Layout directory inside a fixture temp dir.
pub fn layouts_dir(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("layouts")
}

/// Labels of a catalog, in order.
pub fn catalog_labels(template: &WorkflowTemplate, stage_id: &str, area: BalloonArea) -> Vec<String> {
    template
        .catalogs
        .catalog(stage_id, area)
        .expect("catalog exists")
        .iter()
        .map(|item| item.label.clone())
        .collect()
}
