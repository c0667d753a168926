use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod build;
mod commands;
mod config;
mod util;

#[derive(Parser)]
#[command(name = "sitewatch", version)]
#[command(about = "Build a static site, then rebuild the affected parts whenever sources change")]
struct Args {
    /// The command to execute
    #[command(subcommand)]
    command: SitewatchCommand,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,

    /// Overwrite an existing config file
    #[arg(short, long, default_value = "false")]
    force: bool,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file (default: sitewatch.yaml)
    #[arg(short, long)]
    config_file: Option<PathBuf>,
}

#[derive(Parser)]
struct WatchArgs {
    /// The path to the configuration file (default: sitewatch.yaml)
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Use the polling watcher (network filesystems, containers)
    #[arg(long, default_value = "false")]
    poll: bool,

    /// Start watching without running a full build first
    #[arg(long, default_value = "false")]
    skip_initial_build: bool,
}

#[derive(Subcommand)]
enum SitewatchCommand {
    /// Write a starter sitewatch.yaml
    Init(InitArgs),

    /// Run every build step once
    Build(BuildArgs),

    /// Build once, then rebuild on changes
    Watch(WatchArgs),
}

/// `--verbose` only raises our own level; watcher internals stay at info.
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose { "sitewatch=debug,info" } else { "info" }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    // RUST_LOG takes precedence over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(args.verbose)));
    fmt().with_env_filter(filter).with_target(false).init();

    match args.command {
        SitewatchCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        SitewatchCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        SitewatchCommand::Watch(args) => {
            commands::watch::run(&args).await?;
        }
    }

    Ok(())
}
