//! Errors raised by the settings record and controller configuration files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A settings or control file could not be read
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// File that was being read.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// The settings record could not be written
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Destination of the write.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings directory could not be created
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML or a field of the wrong type
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A record could not be rendered as TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A field holds a value outside its valid range
    #[error("invalid value for '{field}': {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: String,
        /// Description of why the value is invalid.
        reason: String,
    },
}

impl ConfigError {
    /// Wraps an I/O error raised while reading `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Wraps an I/O error raised while writing `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Wraps an I/O error raised while creating `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// A validation failure on `field`.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True if the error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::ReadFile { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
