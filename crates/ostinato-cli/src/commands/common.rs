//! Shared CLI helpers used across multiple commands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use ostinato_config::{ControlConfigFile, SettingsFile, control_config_path};
use ostinato_platform::ControlConfig;

/// Resolve the controller configuration.
///
/// Searches in this order:
/// 1. An explicit `--config` path (must exist)
/// 2. The user configuration file, if present
/// 3. Compiled-in defaults
pub fn load_control_config(explicit: Option<&Path>) -> anyhow::Result<ControlConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = control_config_path();
            if !path.is_file() {
                tracing::debug!(path = %path.display(), "no control file, using defaults");
                return Ok(ControlConfig::default());
            }
            path
        }
    };

    let config = ControlConfigFile::load(&path)
        .and_then(ControlConfigFile::into_control_config)
        .with_context(|| format!("invalid control file '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "loaded control file");
    Ok(config)
}

/// Settings file at `explicit`, or at the platform default location.
pub fn settings_file(explicit: Option<PathBuf>) -> SettingsFile {
    explicit.map_or_else(SettingsFile::default_location, SettingsFile::new)
}
