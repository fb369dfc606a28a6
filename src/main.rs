//! Stagecard - terminal stage card designer for procurement workflows
//!
//! Without a subcommand the interactive editor opens on a template file.
//! Subcommands give headless access for scripts and CI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stagecard::cli::{BalloonArgs, InitArgs, LayoutArgs, StageArgs};
use stagecard::config::Config;
use stagecard::constants::{APP_BINARY_NAME, APP_NAME, LOG_FILE_NAME};
use stagecard::models::WorkflowTemplate;
use stagecard::services::{LayoutRepository, TemplateService};
use stagecard::tui;

/// Stagecard - terminal stage card designer for procurement workflows
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the workflow template (JSON)
    #[arg(value_name = "FILE")]
    template_path: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a template file from the built-in procurement workflow
    Init(InitArgs),
    /// Inspect and edit stages
    Stage(StageArgs),
    /// Manage balloon catalogs
    Balloon(BalloonArgs),
    /// Inspect or change stage card layouts
    Layout(LayoutArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        let result = match command {
            Command::Init(args) => args.execute(),
            Command::Stage(args) => args.execute(),
            Command::Balloon(args) => args.execute(),
            Command::Layout(args) => args.execute(),
        };
        if let Err(e) = result {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
        return Ok(());
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {e:#}");
            eprintln!("Using default settings.");
            Config::default()
        }
    };

    init_file_logging(cli.verbose)?;

    let template_path = cli
        .template_path
        .or_else(|| config.paths.template.clone())
        .unwrap_or_else(|| PathBuf::from("workflow.json"));

    if template_path.is_dir() {
        eprintln!("Error: {} is a directory", template_path.display());
        eprintln!();
        eprintln!("Usage:");
        eprintln!("  {APP_BINARY_NAME} my_workflow.json");
        eprintln!("  {APP_BINARY_NAME} init my_workflow.json");
        std::process::exit(1);
    }

    let template = if template_path.exists() {
        TemplateService::load(&template_path)?
    } else {
        info!(path = %template_path.display(), "template missing, starting from sample");
        WorkflowTemplate::sample()
    };

    let layouts = LayoutRepository::in_dir(config.paths.resolved_layouts_dir()?)
        .with_defaults(config.ui.default_density, config.ui.default_scale);

    info!(
        app = APP_NAME,
        version = env!("CARGO_PKG_VERSION"),
        path = %template_path.display(),
        stages = template.stages.len(),
        "starting editor"
    );

    let mut state = tui::AppState::new(template, template_path, layouts, config);
    let mut terminal = tui::setup_terminal()?;
    let result = tui::run_tui(&mut state, &mut terminal);
    tui::restore_terminal(terminal)?;
    result
}

/// Routes tracing output to a log file so it never draws over the TUI.
fn init_file_logging(verbose: bool) -> Result<()> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let log_path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = if verbose {
        "stagecard=debug"
    } else {
        "stagecard=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}
