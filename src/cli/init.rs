//! `stagecard init`: writes the sample procurement template.

use clap::Args;
use std::path::PathBuf;

use crate::cli::common::{save_template, CliError, CliResult};
use crate::models::WorkflowTemplate;

/// Create a template file from the built-in procurement workflow
#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Template file to create
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> CliResult<()> {
        if self.path.exists() && !self.force {
            return Err(CliError::validation(format!(
                "{} already exists. Use --force to overwrite.",
                self.path.display()
            )));
        }

        let template = WorkflowTemplate::sample();
        save_template(&template, &self.path)?;

        println!(
            "Created {} with {} stages",
            self.path.display(),
            template.stages.len()
        );
        Ok(())
    }
}
