//! Stagecard Web Server Binary
//!
//! Serves the REST API over one workflow template.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (port 3001, ./workflow.json)
//! stagecard-web
//!
//! # Specify port and template
//! stagecard-web --port 8080 --template ~/contracts/workflow.json
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stagecard::config::Config;
use stagecard::services::LayoutRepository;
use stagecard::web;

/// Stagecard Web Server - REST API for the stage card designer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Template file to serve.
    /// Defaults to `paths.template` from the config, then ./workflow.json
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Directory holding stage layouts.
    /// Defaults to the configured layouts directory:
    /// - Linux: ~/.config/Stagecard/layouts/
    /// - macOS: ~/Library/Application Support/Stagecard/layouts/
    /// - Windows: %APPDATA%\Stagecard\layouts\
    #[arg(long)]
    layouts_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().unwrap_or_default();

    let template_path = args
        .template
        .or_else(|| config.paths.template.clone())
        .unwrap_or_else(|| PathBuf::from("workflow.json"));
    let layouts_dir = match args.layouts_dir {
        Some(dir) => dir,
        None => config.paths.resolved_layouts_dir()?,
    };
    std::fs::create_dir_all(&layouts_dir).context(format!(
        "Failed to create layouts directory: {}",
        layouts_dir.display()
    ))?;

    info!("Template: {}", template_path.display());
    info!("Layouts: {}", layouts_dir.display());

    let layouts = LayoutRepository::in_dir(layouts_dir)
        .with_defaults(config.ui.default_density, config.ui.default_scale);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    web::run_server(config, template_path, layouts, addr).await
}
