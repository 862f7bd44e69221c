//! Studio Router CLI - analyse studio save-files and export hub definitions.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use studio_router::config::Config;

#[derive(Parser)]
#[command(name = "studio-router")]
#[command(
    author,
    version,
    about = "Studio routing analysis and definition export",
    long_about = None
)]
struct Cli {
    /// Config file to use instead of the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report feedback loops in a studio
    Check(commands::check::CheckArgs),

    /// List resolved hub routes
    Routes(commands::routes::RoutesArgs),

    /// Write definition files for every route
    Export(commands::export::ExportArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load(),
    };

    match cli.command {
        Commands::Check(args) => commands::check::run(args, &config),
        Commands::Routes(args) => commands::routes::run(args, &config),
        Commands::Export(args) => commands::export::run(args, &config),
    }
}
