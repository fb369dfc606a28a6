//! Workflow template file I/O.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::WorkflowTemplate;

/// Loads and saves [`WorkflowTemplate`] JSON files.
pub struct TemplateService;

impl TemplateService {
    /// Loads a template and restores its structural invariants.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use stagecard::services::TemplateService;
    ///
    /// let template = TemplateService::load(Path::new("workflow.json"))?;
    /// println!("{} stages", template.stages.len());
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<WorkflowTemplate> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read template from {}", path.display()))?;
        let mut template: WorkflowTemplate = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse template {}", path.display()))?;
        template
            .normalize()
            .with_context(|| format!("Invalid template {}", path.display()))?;
        Ok(template)
    }

    /// Saves a template as pretty JSON.
    ///
    /// Writes to a temp file and renames it over `path`, so the file is never
    /// left half-written.
    pub fn save(template: &WorkflowTemplate, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content =
            serde_json::to_string_pretty(template).context("Failed to serialize template")?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to save template to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/workflow.json");
        let template = WorkflowTemplate::sample();

        TemplateService::save(&template, &path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = TemplateService::load(&path).unwrap();
        assert_eq!(loaded, template);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let temp_dir = TempDir::new().unwrap();
        let err = TemplateService::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read template"));
    }

    #[test]
    fn test_load_normalizes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t.json");
        fs::write(
            &path,
            r#"{"name":"t","stages":[
                {"id":"b","title":"B","order_index":1,"tools":["comments"]},
                {"id":"a","title":"A","order_index":0}
            ]}"#,
        )
        .unwrap();
        let loaded = TemplateService::load(&path).unwrap();
        assert_eq!(loaded.stages[0].id, "a");
        assert_eq!(loaded.stages[1].tools_order, loaded.stages[1].tools);
        assert!(loaded.catalogs.has_stage("b"));
    }

    #[test]
    fn test_load_rejects_duplicate_stage_ids() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t.json");
        fs::write(
            &path,
            r#"{"name":"t","stages":[
                {"id":"a","title":"A","order_index":0},
                {"id":"a","title":"A2","order_index":1}
            ]}"#,
        )
        .unwrap();
        let err = TemplateService::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Stage 'a' already exists"));
    }
}
