use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a [`Host`](super::Host) capability.
///
/// The engine never propagates these to the keystroke caller: they are logged,
/// surfaced as a message and the current chord is abandoned.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("No file name")]
    NoFileName,

    #[error("Error reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No write since last change (add ! to override)")]
    Unsaved,

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Cannot close last window")]
    LastView,

    #[error("Not supported by this host: {0}")]
    Unsupported(&'static str),
}

/// Failures loading or changing [`Settings`](super::Settings).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse settings.json: {0}. Check JSON syntax.")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to write settings file: {0}")]
    Write(#[from] io::Error),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}

/// Failure of a status-line command handler.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Usage(String),
}
