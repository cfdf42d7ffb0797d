//! Error Types
//!
//! The frame loop itself never fails. These errors cover the fallible
//! edges around it: level files, configuration files and the save store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or interpreting a level schema.
#[derive(Debug, Error)]
pub enum LevelError {
    /// Level file could not be read
    #[error("failed to read level file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Level JSON did not match the schema
    #[error("malformed level json: {0}")]
    Json(#[from] serde_json::Error),

    /// Colour string was not `#rrggbb`
    #[error("invalid colour {0:?}, expected #rrggbb")]
    InvalidColor(String),

    /// Level has no screens to display
    #[error("level {0:?} has no screens")]
    NoScreens(String),
}

/// Errors raised while loading a simulation config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config JSON was malformed
    #[error("malformed config json: {0}")]
    Json(#[from] serde_json::Error),

    /// A value was outside its valid range
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Errors raised by a save store.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Save file could not be read or written
    #[error("save store i/o error at {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Save data could not be (de)serialized
    #[error("malformed save data: {0}")]
    Json(#[from] serde_json::Error),
}
