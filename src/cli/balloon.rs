//! Balloon catalog commands.
//!
//! Writes go through [`BalloonManager`], the same write-through path the
//! inline manager uses, so label rules are identical to the TUI.

use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::common::{
    find_stage, load_template, parse_area, print_json, resolve_balloon, save_template, CliError,
    CliResult,
};
use crate::editor::BalloonManager;
use crate::models::{BalloonArea, BalloonColor, BalloonIcon, BalloonItem, WorkflowTemplate};

/// Manage balloon catalogs of a stage
#[derive(Debug, Clone, Args)]
pub struct BalloonArgs {
    /// Balloon subcommand
    #[command(subcommand)]
    pub command: BalloonCommand,
}

/// Balloon subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum BalloonCommand {
    /// List the balloons of a catalog
    List(ListBalloonsArgs),
    /// Add a balloon at the end of a catalog
    Add(AddBalloonArgs),
    /// Rename a balloon
    Rename(RenameBalloonArgs),
    /// Remove a balloon
    Remove(RemoveBalloonArgs),
    /// Reorder a catalog
    Reorder(ReorderBalloonsArgs),
    /// Change a balloon's icon or color
    Style(StyleBalloonArgs),
}

/// Selects one catalog.
#[derive(Debug, Clone, Args)]
pub struct CatalogTarget {
    /// Path to template file
    #[arg(short, long, value_name = "FILE")]
    pub template: PathBuf,

    /// Stage id
    #[arg(short, long, value_name = "ID")]
    pub stage: String,

    /// Catalog area (required_fields, checklist_catalog, action_catalog)
    #[arg(short, long, value_name = "AREA")]
    pub area: String,
}

impl CatalogTarget {
    fn open(&self) -> CliResult<(WorkflowTemplate, BalloonArea)> {
        let area = parse_area(&self.area)?;
        let template = load_template(&self.template)?;
        find_stage(&template, &self.stage)?;
        Ok((template, area))
    }

    fn items<'a>(&self, template: &'a WorkflowTemplate, area: BalloonArea) -> CliResult<&'a [BalloonItem]> {
        Ok(template.catalogs.catalog(&self.stage, area)?)
    }

    fn find_id(
        &self,
        template: &WorkflowTemplate,
        area: BalloonArea,
        key: &str,
    ) -> CliResult<String> {
        let items = self.items(template, area)?;
        resolve_balloon(items, key)
            .map(|item| item.id.clone())
            .ok_or_else(|| CliError::not_found(format!("Balloon '{key}' not found")))
    }
}

/// List the balloons of a catalog
#[derive(Debug, Clone, Args)]
pub struct ListBalloonsArgs {
    /// Catalog to list
    #[command(flatten)]
    pub target: CatalogTarget,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Add a balloon
#[derive(Debug, Clone, Args)]
pub struct AddBalloonArgs {
    /// Catalog to add to
    #[command(flatten)]
    pub target: CatalogTarget,

    /// Balloon label (1 to 32 characters, unique in the catalog)
    #[arg(long)]
    pub label: String,

    /// Palette color
    #[arg(long)]
    pub color: Option<String>,

    /// Icon name
    #[arg(long)]
    pub icon: Option<String>,

    /// Output the new balloon as JSON
    #[arg(long)]
    pub json: bool,
}

/// Rename a balloon
#[derive(Debug, Clone, Args)]
pub struct RenameBalloonArgs {
    /// Catalog holding the balloon
    #[command(flatten)]
    pub target: CatalogTarget,

    /// Balloon id or current label
    #[arg(short, long, value_name = "ID|LABEL")]
    pub balloon: String,

    /// New label
    #[arg(long)]
    pub label: String,
}

/// Remove a balloon
#[derive(Debug, Clone, Args)]
pub struct RemoveBalloonArgs {
    /// Catalog holding the balloon
    #[command(flatten)]
    pub target: CatalogTarget,

    /// Balloon id or label
    #[arg(short, long, value_name = "ID|LABEL")]
    pub balloon: String,
}

/// Reorder a catalog
#[derive(Debug, Clone, Args)]
pub struct ReorderBalloonsArgs {
    /// Catalog to reorder
    #[command(flatten)]
    pub target: CatalogTarget,

    /// Every balloon id or label, comma-separated, in the new order
    #[arg(long, value_delimiter = ',', required = true)]
    pub order: Vec<String>,
}

/// Change a balloon's icon or color
#[derive(Debug, Clone, Args)]
pub struct StyleBalloonArgs {
    /// Catalog holding the balloon
    #[command(flatten)]
    pub target: CatalogTarget,

    /// Balloon id or label
    #[arg(short, long, value_name = "ID|LABEL")]
    pub balloon: String,

    /// New palette color
    #[arg(long)]
    pub color: Option<String>,

    /// New icon name
    #[arg(long, conflicts_with = "no_icon")]
    pub icon: Option<String>,

    /// Remove the icon
    #[arg(long)]
    pub no_icon: bool,
}

// JSON response types
#[derive(Debug, Serialize)]
struct ListBalloonsResponse<'a> {
    stage: &'a str,
    area: BalloonArea,
    balloons: &'a [BalloonItem],
    count: usize,
}

impl BalloonArgs {
    /// Execute the balloon command
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            BalloonCommand::List(args) => args.execute(),
            BalloonCommand::Add(args) => args.execute(),
            BalloonCommand::Rename(args) => args.execute(),
            BalloonCommand::Remove(args) => args.execute(),
            BalloonCommand::Reorder(args) => args.execute(),
            BalloonCommand::Style(args) => args.execute(),
        }
    }
}

fn parse_color(name: &str) -> CliResult<BalloonColor> {
    name.parse::<BalloonColor>().map_err(CliError::validation)
}

fn parse_icon(name: &str) -> CliResult<BalloonIcon> {
    name.parse::<BalloonIcon>().map_err(CliError::validation)
}

impl ListBalloonsArgs {
    /// Execute the list command
    pub fn execute(&self) -> CliResult<()> {
        let (template, area) = self.target.open()?;
        let items = self.target.items(&template, area)?;

        if self.json {
            return print_json(&ListBalloonsResponse {
                stage: &self.target.stage,
                area,
                balloons: items,
                count: items.len(),
            });
        }

        if items.is_empty() {
            println!("No balloons in {}.", area.title());
            return Ok(());
        }
        println!("{} ({}):", area.title(), items.len());
        println!();
        for item in items {
            let icon = item.icon.map_or_else(|| "-".to_string(), |i| i.to_string());
            println!(
                "  {:<38} {:<24} {:<8} {}",
                item.id,
                item.label,
                item.color.name(),
                icon
            );
        }
        Ok(())
    }
}

impl AddBalloonArgs {
    /// Execute the add command
    pub fn execute(&self) -> CliResult<()> {
        let color = self.color.as_deref().map(parse_color).transpose()?;
        let icon = self.icon.as_deref().map(parse_icon).transpose()?;
        let (mut template, area) = self.target.open()?;

        let mut manager = BalloonManager::new(self.target.stage.as_str(), area);
        let id = manager.add(&mut template.catalogs, &self.label)?;
        if let Some(color) = color {
            template
                .catalogs
                .set_balloon_color(&self.target.stage, area, &id, color)?;
        }
        if icon.is_some() {
            template
                .catalogs
                .set_balloon_icon(&self.target.stage, area, &id, icon)?;
        }
        save_template(&template, &self.target.template)?;

        if self.json {
            let items = self.target.items(&template, area)?;
            if let Some(item) = items.iter().find(|item| item.id == id) {
                return print_json(item);
            }
        }
        println!("Added '{}' ({id})", self.label.trim());
        Ok(())
    }
}

impl RenameBalloonArgs {
    /// Execute the rename command
    pub fn execute(&self) -> CliResult<()> {
        let (mut template, area) = self.target.open()?;
        let id = self.target.find_id(&template, area, &self.balloon)?;

        let mut manager = BalloonManager::new(self.target.stage.as_str(), area);
        manager.rename(&mut template.catalogs, &id, &self.label)?;
        save_template(&template, &self.target.template)?;

        println!("Renamed '{}' to '{}'", self.balloon, self.label.trim());
        Ok(())
    }
}

impl RemoveBalloonArgs {
    /// Execute the remove command
    pub fn execute(&self) -> CliResult<()> {
        let (mut template, area) = self.target.open()?;
        let items = self.target.items(&template, area)?;
        let Some(id) = resolve_balloon(items, &self.balloon).map(|item| item.id.clone()) else {
            println!("Balloon '{}' not present; nothing removed", self.balloon);
            return Ok(());
        };

        let removed = template
            .catalogs
            .remove_balloon(&self.target.stage, area, &id)?;
        save_template(&template, &self.target.template)?;

        if let Some(item) = removed {
            println!("Removed '{}'", item.label);
        }
        Ok(())
    }
}

impl ReorderBalloonsArgs {
    /// Execute the reorder command
    pub fn execute(&self) -> CliResult<()> {
        let (mut template, area) = self.target.open()?;
        let ids = self
            .order
            .iter()
            .map(|key| self.target.find_id(&template, area, key))
            .collect::<CliResult<Vec<String>>>()?;

        template
            .catalogs
            .reorder_balloons(&self.target.stage, area, &ids)?;
        save_template(&template, &self.target.template)?;

        let labels: Vec<&str> = self
            .target
            .items(&template, area)?
            .iter()
            .map(|item| item.label.as_str())
            .collect();
        println!("New order: {}", labels.join(", "));
        Ok(())
    }
}

impl StyleBalloonArgs {
    /// Execute the style command
    pub fn execute(&self) -> CliResult<()> {
        let color = self.color.as_deref().map(parse_color).transpose()?;
        let icon = self.icon.as_deref().map(parse_icon).transpose()?;
        if color.is_none() && icon.is_none() && !self.no_icon {
            return Err(CliError::validation(
                "Nothing to change. Pass --color, --icon or --no-icon.",
            ));
        }

        let (mut template, area) = self.target.open()?;
        let id = self.target.find_id(&template, area, &self.balloon)?;
        let stage = self.target.stage.as_str();

        if let Some(color) = color {
            template.catalogs.set_balloon_color(stage, area, &id, color)?;
        }
        if icon.is_some() || self.no_icon {
            template.catalogs.set_balloon_icon(stage, area, &id, icon)?;
        }
        save_template(&template, &self.target.template)?;

        println!("Updated '{}'", self.balloon);
        Ok(())
    }
}
