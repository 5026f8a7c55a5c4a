use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;
use yield_risk_core::{ConfigLoader, EngineConfig};

/// Loads configuration from an explicit file, a profile, or the default location.
///
/// # Errors
/// Returns an error if the configuration cannot be read or is invalid.
pub fn load_config(path: Option<&Path>, profile: Option<&str>) -> Result<EngineConfig> {
    let config = match (path, profile) {
        (Some(path), _) => ConfigLoader::load_from(path)?,
        (None, Some(profile)) => ConfigLoader::load_with_profile(profile)
            .with_context(|| format!("Failed to load profile '{profile}'"))?,
        (None, None) => ConfigLoader::load().context("Failed to load config/Engine.toml")?,
    };
    debug!(?config, "Effective configuration before CLI overrides");
    Ok(config)
}
