use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, saving or dispatching configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create config file '{path}': {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to backup '{from}' to '{to}': {source}")]
    Backup {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Handler for [{section}].{key} failed: {source}")]
    Handler {
        section: String,
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Handler for [{section}].{key} panicked: {message}")]
    HandlerPanicked {
        section: String,
        key: String,
        message: String,
    },
}
