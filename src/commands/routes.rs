//! List resolved hub routes.

use clap::Args;
use studio_router::config::Config;

/// List every instrument route through the hub.
#[derive(Args)]
pub struct RoutesArgs {
    /// Path to the studio save-file
    pub file: std::path::PathBuf,
}

/// Run the routes command.
pub fn run(args: RoutesArgs, config: &Config) -> anyhow::Result<()> {
    let studio = super::load_studio(&args.file, config)?;
    let routes = studio.routes();

    if routes.is_empty() {
        println!("No instruments are routed from the hub.");
        return Ok(());
    }

    for route in &routes {
        let name = studio
            .instrument(&route.instrument)
            .map_or(route.instrument.as_str(), |i| i.name.as_str());
        let kind = if route.is_analog { "analog" } else { "midi" };
        println!("{:<24} {:<6} {}", name, route.hub_port_code.to_string(), kind);
    }
    Ok(())
}
