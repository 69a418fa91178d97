//! Configuration files for the ostinato looper.
//!
//! The control plane in `ostinato-platform` is storage-agnostic. This crate
//! supplies the host-side files it runs against:
//!
//! - **Settings record**: [`SettingsFile`] implements
//!   [`SettingsStorage`](ostinato_platform::SettingsStorage) over a TOML file
//!   with atomic replacement
//! - **Controller config**: [`ControlConfigFile`] overlays a partial TOML file
//!   on the panel defaults and validates the result
//! - **Paths**: Platform-specific locations of both files
//!
//! # Example
//!
//! ```rust,no_run
//! use ostinato_config::{ControlConfigFile, SettingsFile, paths};
//! use ostinato_platform::SettingsStorage;
//!
//! let config = ControlConfigFile::load(paths::control_config_path())
//!     .and_then(ControlConfigFile::into_control_config)
//!     .unwrap_or_default();
//!
//! let mut storage = SettingsFile::default_location();
//! let settings = storage.load().unwrap_or_default();
//! println!("deadband {} / stereo width {}", config.deadband, settings.stereo_width);
//! ```

mod control;
mod error;
mod record;

/// Platform-specific paths for the settings record and controller config.
pub mod paths;

pub use control::{ControlConfigFile, ToggleRoleSetting, validate};
pub use error::ConfigError;
pub use paths::{control_config_path, settings_path, user_config_dir};
pub use record::{RECORD_VERSION, SettingsFile, SettingsRecord};
