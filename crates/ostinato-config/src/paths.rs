//! Platform-specific paths for the settings record and controller config.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/ostinato/` (Linux), `~/Library/Application Support/ostinato/` (macOS), `%APPDATA%\ostinato\` (Windows)
//! - **Settings record**: `<user config>/settings.toml`
//! - **Controller config**: `<user config>/control.toml`
//!
//! # Example
//!
//! ```rust,no_run
//! use ostinato_config::paths;
//!
//! println!("settings: {:?}", paths::settings_path());
//! println!("control:  {:?}", paths::control_config_path());
//! ```

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "ostinato";

/// File name of the persisted settings record.
pub const SETTINGS_FILE: &str = "settings.toml";

/// File name of the controller configuration.
pub const CONTROL_FILE: &str = "control.toml";

/// Returns the user-specific configuration directory.
///
/// # Platform Paths
///
/// - Linux: `~/.config/ostinato/`
/// - macOS: `~/Library/Application Support/ostinato/`
/// - Windows: `%APPDATA%\ostinato\`
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the settings record.
pub fn settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Default location of the controller configuration.
pub fn control_config_path() -> PathBuf {
    user_config_dir().join(CONTROL_FILE)
}

/// Creates `dir` and its parents if missing.
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), crate::ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| crate::ConfigError::create_dir(dir, e))?;
    }
    Ok(())
}
