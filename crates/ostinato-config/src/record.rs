//! File-backed settings record.
//!
//! The record is a flat TOML table of seven normalized values:
//!
//! ```toml
//! version = 1
//! input_gain = 0.2
//! filter_type = 0.5
//! loop_sync = 0.0
//! filter_level = 0.5
//! rate_slew = 0.0
//! stereo_width = 1.0
//! degradation = 0.0
//! ```
//!
//! Missing fields take their compiled-in defaults. [`SettingsFile`] writes
//! to a sibling temporary file and renames it over the record, so a reader
//! never observes a half-written file.

use std::path::{Path, PathBuf};

use ostinato_platform::{Settings, SettingsStorage};
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::paths::ensure_dir;

/// Current record format version.
pub const RECORD_VERSION: u32 = 1;

/// Serialized form of [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRecord {
    /// Format version.
    pub version: u32,
    /// Input gain, as a fraction of the maximum gain.
    pub input_gain: f32,
    /// Filter type selector.
    pub filter_type: f32,
    /// Loop sync flag.
    pub loop_sync: f32,
    /// Filter level.
    pub filter_level: f32,
    /// Read-rate slew.
    pub rate_slew: f32,
    /// Stereo width.
    pub stereo_width: f32,
    /// Buffer degradation amount.
    pub degradation: f32,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Settings::DEFAULT.into()
    }
}

impl From<Settings> for SettingsRecord {
    fn from(s: Settings) -> Self {
        Self {
            version: RECORD_VERSION,
            input_gain: s.input_gain,
            filter_type: s.filter_type,
            loop_sync: s.loop_sync,
            filter_level: s.filter_level,
            rate_slew: s.rate_slew,
            stereo_width: s.stereo_width,
            degradation: s.degradation,
        }
    }
}

impl SettingsRecord {
    const FIELD_NAMES: [&'static str; Settings::FIELD_COUNT] = [
        "input_gain",
        "filter_type",
        "loop_sync",
        "filter_level",
        "rate_slew",
        "stereo_width",
        "degradation",
    ];

    /// Validates the record and converts it into [`Settings`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for an unknown version or a
    /// value outside `0.0..=1.0`.
    pub fn to_settings(&self) -> Result<Settings, ConfigError> {
        if self.version != RECORD_VERSION {
            return Err(ConfigError::invalid_field(
                "version",
                format!("unsupported record version {}", self.version),
            ));
        }
        let settings = Settings {
            input_gain: self.input_gain,
            filter_type: self.filter_type,
            loop_sync: self.loop_sync,
            filter_level: self.filter_level,
            rate_slew: self.rate_slew,
            stereo_width: self.stereo_width,
            degradation: self.degradation,
        };
        for (name, value) in Self::FIELD_NAMES.iter().zip(settings.to_array()) {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid_field(
                    *name,
                    format!("{value} is outside 0.0..=1.0"),
                ));
            }
        }
        Ok(settings)
    }

    /// Parse a record from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize the record to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Settings storage backed by a TOML file.
///
/// # Example
///
/// ```rust,no_run
/// use ostinato_config::SettingsFile;
/// use ostinato_platform::{Settings, SettingsStorage};
///
/// let mut file = SettingsFile::default_location();
/// let settings = file.load().unwrap_or(Settings::DEFAULT);
/// file.save(&settings).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    /// Storage at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the platform default location.
    pub fn default_location() -> Self {
        Self::new(crate::paths::settings_path())
    }

    /// Path of the record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the record exists on disk.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Overwrites the record with the compiled-in defaults.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.save(&Settings::DEFAULT)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SettingsStorage for SettingsFile {
    type Error = ConfigError;

    fn load(&mut self) -> Result<Settings, ConfigError> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::read_file(&self.path, e))?;
        SettingsRecord::from_toml(&content)?.to_settings()
    }

    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            ensure_dir(parent)?;
        }

        let content = SettingsRecord::from(*settings).to_toml()?;
        let temp = self.temp_path();
        std::fs::write(&temp, content).map_err(|e| ConfigError::write_file(&temp, e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| ConfigError::write_file(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), "settings record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_defaults_for_missing_fields() {
        let record = SettingsRecord::from_toml("stereo_width = 0.25").unwrap();
        let settings = record.to_settings().unwrap();
        assert_eq!(settings.stereo_width, 0.25);
        assert_eq!(settings.filter_type, Settings::DEFAULT.filter_type);
        assert_eq!(record.version, RECORD_VERSION);
    }

    #[test]
    fn test_record_rejects_out_of_range() {
        let record = SettingsRecord::from_toml("loop_sync = 1.5").unwrap();
        let err = record.to_settings().unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidField { ref field, .. } if field == "loop_sync"),
            "got: {err}"
        );
    }

    #[test]
    fn test_record_rejects_nan() {
        let record = SettingsRecord {
            degradation: f32::NAN,
            ..SettingsRecord::default()
        };
        assert!(record.to_settings().is_err());
    }

    #[test]
    fn test_record_rejects_unknown_version() {
        let record = SettingsRecord::from_toml("version = 7").unwrap();
        assert!(matches!(
            record.to_settings(),
            Err(ConfigError::InvalidField { ref field, .. }) if field == "version"
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let mut file = SettingsFile::new(temp_dir.path().join("nested").join("settings.toml"));
        assert!(!file.exists());

        let settings = Settings {
            input_gain: 0.8,
            loop_sync: 1.0,
            ..Settings::DEFAULT
        };
        file.save(&settings).unwrap();
        assert!(file.exists());
        assert!(!file.temp_path().exists());
        assert_eq!(file.load().unwrap(), settings);
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let mut file = SettingsFile::new(temp_dir.path().join("absent.toml"));
        assert!(file.load().unwrap_err().is_not_found());
    }

    #[test]
    fn test_reset_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let mut file = SettingsFile::new(temp_dir.path().join("settings.toml"));
        file.save(&Settings::from_array([0.9; 7])).unwrap();
        file.reset().unwrap();
        assert_eq!(file.load().unwrap(), Settings::DEFAULT);
    }
}
