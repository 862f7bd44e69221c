//! CLI command implementations.

pub mod check;
pub mod export;
pub mod routes;

use std::path::Path;

use anyhow::Context;
use studio_router::config::Config;
use studio_router::graph::Studio;
use studio_router::persistence;

/// Loads a save-file into a studio using the configured migration defaults.
pub fn load_studio(path: &Path, config: &Config) -> anyhow::Result<Studio> {
    let save = persistence::load_from_file(path, config.migration_defaults())
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(save.into_studio())
}
