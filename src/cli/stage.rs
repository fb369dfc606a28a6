//! Stage commands: list, inspect, toggle tools and edit fields.
//!
//! Tool and field edits go through [`StageWorkspace`] so dependency rules and
//! the persisted layout stay in step with the stage.

use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::common::{
    find_stage, layout_repository, load_config, load_template, parse_tool, print_json,
    save_template, CliError, CliResult,
};
use crate::editor::StageWorkspace;
use crate::models::{StagePatch, StageStatus, ToolKind};

/// Inspect and edit stages of a template
#[derive(Debug, Clone, Args)]
pub struct StageArgs {
    /// Stage subcommand
    #[command(subcommand)]
    pub command: StageCommand,
}

/// Stage subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum StageCommand {
    /// List all stages
    List(ListStagesArgs),
    /// Show one stage with its tools
    Show(ShowStageArgs),
    /// Enable a tool (and the tools it requires)
    Enable(ToggleToolArgs),
    /// Disable a tool (and the tools that require it)
    Disable(ToggleToolArgs),
    /// Edit title, department, days or status
    Set(SetStageArgs),
}

/// List all stages
#[derive(Debug, Clone, Args)]
pub struct ListStagesArgs {
    /// Path to template file
    #[arg(short, long, value_name = "FILE")]
    pub template: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Show one stage
#[derive(Debug, Clone, Args)]
pub struct ShowStageArgs {
    /// Path to template file
    #[arg(short, long, value_name = "FILE")]
    pub template: PathBuf,

    /// Stage id
    #[arg(short, long, value_name = "ID")]
    pub stage: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Enable or disable a tool
#[derive(Debug, Clone, Args)]
pub struct ToggleToolArgs {
    /// Path to template file
    #[arg(short, long, value_name = "FILE")]
    pub template: PathBuf,

    /// Stage id
    #[arg(short, long, value_name = "ID")]
    pub stage: String,

    /// Tool id (management, main_form, stage_panel, stage_actions, comments, signatures, doc_view)
    #[arg(long, value_name = "TOOL")]
    pub tool: String,

    /// Directory holding stage layouts (defaults to the configured one)
    #[arg(long, value_name = "DIR")]
    pub layouts_dir: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Edit scalar stage fields
#[derive(Debug, Clone, Args)]
pub struct SetStageArgs {
    /// Path to template file
    #[arg(short, long, value_name = "FILE")]
    pub template: PathBuf,

    /// Stage id
    #[arg(short, long, value_name = "ID")]
    pub stage: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New responsible department
    #[arg(long)]
    pub department: Option<String>,

    /// New SLA in days
    #[arg(long)]
    pub days: Option<u32>,

    /// New status (pending, in_progress, done)
    #[arg(long)]
    pub status: Option<String>,

    /// Directory holding stage layouts (defaults to the configured one)
    #[arg(long, value_name = "DIR")]
    pub layouts_dir: Option<PathBuf>,
}

// JSON response types
#[derive(Debug, Serialize)]
struct StageSummary {
    id: String,
    title: String,
    department: String,
    days: u32,
    status: StageStatus,
    tools: Vec<ToolKind>,
}

#[derive(Debug, Serialize)]
struct ListStagesResponse {
    stages: Vec<StageSummary>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct ToggleToolResponse {
    stage: String,
    affected: Vec<ToolKind>,
    tools: Vec<ToolKind>,
}

impl StageArgs {
    /// Execute the stage command
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            StageCommand::List(args) => args.execute(),
            StageCommand::Show(args) => args.execute(),
            StageCommand::Enable(args) => args.execute(true),
            StageCommand::Disable(args) => args.execute(false),
            StageCommand::Set(args) => args.execute(),
        }
    }
}

fn tool_ids(tools: &[ToolKind]) -> String {
    if tools.is_empty() {
        return "(none)".to_string();
    }
    tools.iter().map(|t| t.id()).collect::<Vec<_>>().join(", ")
}

impl ListStagesArgs {
    /// Execute the list command
    pub fn execute(&self) -> CliResult<()> {
        let template = load_template(&self.template)?;

        let stages: Vec<StageSummary> = template
            .stages
            .iter()
            .map(|stage| StageSummary {
                id: stage.id.clone(),
                title: stage.title.clone(),
                department: stage.department.clone(),
                days: stage.days,
                status: stage.status,
                tools: stage.tools_order.clone(),
            })
            .collect();
        let response = ListStagesResponse {
            count: stages.len(),
            stages,
        };

        if self.json {
            print_json(&response)?;
        } else if response.count == 0 {
            println!("No stages defined.");
        } else {
            println!("Stages ({}):", response.count);
            println!();
            for stage in &response.stages {
                println!(
                    "  {:<26} {:<34} {:<12} {:>3}d  {}",
                    stage.id,
                    stage.title,
                    stage.status.id(),
                    stage.days,
                    tool_ids(&stage.tools)
                );
            }
        }
        Ok(())
    }
}

impl ShowStageArgs {
    /// Execute the show command
    pub fn execute(&self) -> CliResult<()> {
        let template = load_template(&self.template)?;
        let stage = find_stage(&template, &self.stage)?;

        if self.json {
            return print_json(stage);
        }

        println!("{} ({})", stage.title, stage.id);
        println!("  Department: {}", stage.department);
        println!("  Days:       {}", stage.days);
        println!("  Status:     {}", stage.status);
        println!("  Tools:");
        for tool in ToolKind::all() {
            let mark = if stage.has_tool(*tool) { "x" } else { " " };
            println!("    [{mark}] {:<14} {}", tool.id(), tool.meta().description);
        }
        Ok(())
    }
}

impl ToggleToolArgs {
    /// Execute enable (`enable == true`) or disable
    pub fn execute(&self, enable: bool) -> CliResult<()> {
        let tool = parse_tool(&self.tool)?;
        let config = load_config();
        let mut template = load_template(&self.template)?;
        let mut layouts = layout_repository(self.layouts_dir.as_ref(), &config)?;
        let stage = find_stage(&template, &self.stage)?;

        let mut workspace = StageWorkspace::open(stage, &layouts, config.tool_dependencies());
        let affected = if enable {
            workspace.enable_tool(tool)
        } else {
            workspace.disable_tool(tool)
        };

        if workspace.has_changes() {
            workspace
                .save(&mut template, &mut layouts)
                .map_err(|e| CliError::io(format!("{e:#}")))?;
            save_template(&template, &self.template)?;
        }

        let response = ToggleToolResponse {
            stage: self.stage.clone(),
            affected,
            tools: workspace.stage().tools_order.clone(),
        };
        if self.json {
            return print_json(&response);
        }

        let verb = if enable { "Enabled" } else { "Disabled" };
        if response.affected.is_empty() {
            println!("Nothing to do: {} is already {}", tool.id(), verb.to_lowercase());
        } else {
            println!("{verb}: {}", tool_ids(&response.affected));
        }
        println!("Tools: {}", tool_ids(&response.tools));
        Ok(())
    }
}

impl SetStageArgs {
    /// Execute the set command
    pub fn execute(&self) -> CliResult<()> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<StageStatus>)
            .transpose()
            .map_err(CliError::validation)?;
        let patch = StagePatch {
            title: self.title.clone(),
            department: self.department.clone(),
            days: self.days,
            status,
        };
        if patch.is_empty() {
            return Err(CliError::validation(
                "Nothing to change. Pass --title, --department, --days or --status.",
            ));
        }
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(CliError::validation("Title cannot be empty"));
        }

        let config = load_config();
        let mut template = load_template(&self.template)?;
        let mut layouts = layout_repository(self.layouts_dir.as_ref(), &config)?;
        let stage = find_stage(&template, &self.stage)?;

        let mut workspace = StageWorkspace::open(stage, &layouts, config.tool_dependencies());
        if workspace.apply_patch(&patch) {
            workspace
                .save(&mut template, &mut layouts)
                .map_err(|e| CliError::io(format!("{e:#}")))?;
            save_template(&template, &self.template)?;
            println!("Updated stage '{}'", self.stage);
        } else {
            println!("Stage '{}' already has these values", self.stage);
        }
        Ok(())
    }
}
