//! Stage collection access.

use thiserror::Error;
use tracing::debug;

use crate::models::{ModelStage, WorkflowTemplate};

/// Failures of stage lookups and commits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// No stage with this id
    #[error("Stage '{0}' not found")]
    NotFound(String),
    /// A tool id outside the fixed tool set
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),
    /// A stage with this id already exists
    #[error("Stage '{0}' already exists")]
    DuplicateId(String),
}

/// Owner of the stage collection that the workspace commits into.
pub trait StageRepository {
    /// Returns a copy of the stage with `id`.
    fn load_stage(&self, id: &str) -> Result<ModelStage, StageError>;

    /// Overwrites the stored stage with the same id.
    fn commit_stage(&mut self, stage: &ModelStage) -> Result<(), StageError>;
}

impl StageRepository for WorkflowTemplate {
    fn load_stage(&self, id: &str) -> Result<ModelStage, StageError> {
        self.stage(id)
            .cloned()
            .ok_or_else(|| StageError::NotFound(id.to_string()))
    }

    fn commit_stage(&mut self, stage: &ModelStage) -> Result<(), StageError> {
        let stored = self
            .stage_mut(&stage.id)
            .ok_or_else(|| StageError::NotFound(stage.id.clone()))?;
        // order_index belongs to the template, not to the stage editor
        let order_index = stored.order_index;
        *stored = stage.clone();
        stored.order_index = order_index;
        debug!(stage_id = %stage.id, tools = stage.tools.len(), "stage committed");
        Ok(())
    }
}

impl WorkflowTemplate {
    /// Appends a new stage at the end of the workflow and registers its catalogs.
    pub fn add_stage(&mut self, mut stage: ModelStage) -> Result<(), StageError> {
        if self.stage(&stage.id).is_some() {
            return Err(StageError::DuplicateId(stage.id));
        }
        stage.order_index = u32::try_from(self.stages.len()).unwrap_or(u32::MAX);
        self.catalogs.register_stage(&stage.id);
        self.stages.push(stage);
        Ok(())
    }
}
