//! Stage card layout commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::common::{
    find_stage, layout_repository, load_config, load_template, print_json, CliError, CliResult,
};
use crate::models::{Column, LayoutMode, StageLayout};

/// Inspect or change the stored card layout of a stage
#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    /// Layout subcommand
    #[command(subcommand)]
    pub command: LayoutCommand,
}

/// Layout subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum LayoutCommand {
    /// Show the effective layout
    Show(ShowLayoutArgs),
    /// Switch the column arrangement
    Mode(SetModeArgs),
    /// Delete the stored layout so the default applies again
    Reset(ResetLayoutArgs),
}

/// Selects one stage's layout.
#[derive(Debug, Clone, Args)]
pub struct LayoutTarget {
    /// Path to template file
    #[arg(short, long, value_name = "FILE")]
    pub template: PathBuf,

    /// Stage id
    #[arg(short, long, value_name = "ID")]
    pub stage: String,

    /// Directory holding stage layouts (defaults to the configured one)
    #[arg(long, value_name = "DIR")]
    pub layouts_dir: Option<PathBuf>,
}

/// Show the effective layout
#[derive(Debug, Clone, Args)]
pub struct ShowLayoutArgs {
    /// Stage to show
    #[command(flatten)]
    pub target: LayoutTarget,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Switch the column arrangement
#[derive(Debug, Clone, Args)]
pub struct SetModeArgs {
    /// Stage to change
    #[command(flatten)]
    pub target: LayoutTarget,

    /// New mode (stacked, 50-50, 60-40, 40-60)
    #[arg(short, long)]
    pub mode: String,
}

/// Delete the stored layout
#[derive(Debug, Clone, Args)]
pub struct ResetLayoutArgs {
    /// Stage to reset
    #[command(flatten)]
    pub target: LayoutTarget,
}

#[derive(Debug, Serialize)]
struct ShowLayoutResponse<'a> {
    stage: &'a str,
    stored: bool,
    layout: &'a StageLayout,
}

impl LayoutArgs {
    /// Execute the layout command
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            LayoutCommand::Show(args) => args.execute(),
            LayoutCommand::Mode(args) => args.execute(),
            LayoutCommand::Reset(args) => args.execute(),
        }
    }
}

fn join_tools(layout: &StageLayout, column: Column) -> String {
    let ids: Vec<&str> = layout.column(column).iter().map(|t| t.id()).collect();
    if ids.is_empty() {
        "(empty)".to_string()
    } else {
        ids.join(", ")
    }
}

impl ShowLayoutArgs {
    /// Execute the show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config();
        let template = load_template(&self.target.template)?;
        let stage = find_stage(&template, &self.target.stage)?;
        let layouts = layout_repository(self.target.layouts_dir.as_ref(), &config)?;

        let layout = layouts.load(stage);
        let stored = layouts
            .exists(&stage.id)
            .map_err(|e| CliError::io(format!("{e:#}")))?;

        if self.json {
            return print_json(&ShowLayoutResponse {
                stage: &stage.id,
                stored,
                layout: &layout,
            });
        }

        println!("Layout of '{}'{}", stage.id, if stored { "" } else { " (default)" });
        println!("  Mode:    {}", layout.mode);
        println!("  Density: {}", layout.density.id());
        println!("  Scale:   {:.2}", layout.scale);
        println!("  Guides:  {}", if layout.show_guides { "on" } else { "off" });
        for column in layout.active_columns() {
            let name = match column {
                Column::Stack => "Stack",
                Column::Left => "Left",
                Column::Right => "Right",
            };
            println!("  {:<8} {}", format!("{name}:"), join_tools(&layout, *column));
        }
        Ok(())
    }
}

impl SetModeArgs {
    /// Execute the mode command
    pub fn execute(&self) -> CliResult<()> {
        let mode = self
            .mode
            .parse::<LayoutMode>()
            .map_err(CliError::validation)?;
        let config = load_config();
        let template = load_template(&self.target.template)?;
        let stage = find_stage(&template, &self.target.stage)?;
        let mut layouts = layout_repository(self.target.layouts_dir.as_ref(), &config)?;

        let mut layout = layouts.load(stage);
        if !layout.set_mode(mode) {
            println!("Layout of '{}' is already {mode}", stage.id);
            return Ok(());
        }
        layouts
            .save(&stage.id, &layout)
            .map_err(|e| CliError::io(format!("{e:#}")))?;

        println!("Layout of '{}' set to {mode}", stage.id);
        Ok(())
    }
}

impl ResetLayoutArgs {
    /// Execute the reset command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config();
        let template = load_template(&self.target.template)?;
        let stage = find_stage(&template, &self.target.stage)?;
        let mut layouts = layout_repository(self.target.layouts_dir.as_ref(), &config)?;

        layouts
            .reset(&stage.id)
            .map_err(|e| CliError::io(format!("{e:#}")))?;
        println!("Layout of '{}' reset to default", stage.id);
        Ok(())
    }
}
