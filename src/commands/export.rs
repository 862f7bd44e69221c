//! Write definition files.

use std::path::PathBuf;

use clap::Args;
use studio_router::config::Config;
use studio_router::export;

/// Render and write a definition file for every hub route.
#[derive(Args)]
pub struct ExportArgs {
    /// Path to the studio save-file
    pub file: PathBuf,

    /// Output directory (defaults to the configured output_dir)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Replace existing definition files
    #[arg(long)]
    pub overwrite: bool,
}

/// Run the export command.
pub fn run(args: ExportArgs, config: &Config) -> anyhow::Result<()> {
    let studio = super::load_studio(&args.file, config)?;
    let files = studio.definitions();
    if files.is_empty() {
        println!("Nothing to export: no instruments are routed from the hub.");
        return Ok(());
    }

    let dir = args.out.unwrap_or_else(|| config.output_dir());
    let written = export::write_definitions(&files, &dir, args.overwrite || config.overwrite())?;
    println!("Wrote {} definition file(s) to {}", written.len(), dir.display());
    Ok(())
}
