//! Report feedback loops.

use clap::Args;
use studio_router::config::Config;

/// Check a studio for feedback loops.
#[derive(Args)]
pub struct CheckArgs {
    /// Path to the studio save-file
    pub file: std::path::PathBuf,
}

/// Run the check command. A loop is reported, not treated as a failure.
pub fn run(args: CheckArgs, config: &Config) -> anyhow::Result<()> {
    let studio = super::load_studio(&args.file, config)?;
    let report = studio.cycle_report();

    if !report.has_cycle {
        println!("No feedback loops.");
        return Ok(());
    }

    println!("Feedback loop detected:");
    let names: Vec<&str> = report
        .cycle_instruments
        .iter()
        .map(|id| studio.instrument(id).map_or(id.as_str(), |i| i.name.as_str()))
        .collect();
    println!("  Instruments: {}", names.join(" -> "));
    for id in &report.cycle_connections {
        println!("  Connection:  {}", id);
    }
    Ok(())
}
