//! CLI-level error type: wraps the core crate's errors plus the I/O and
//! config-parsing failures that only happen at the command-line boundary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] tmplminer_core::MinerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON from {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("no device configuration files found in {0}")]
    NoDevices(PathBuf),
}

pub type Result<T> = std::result::Result<T, CliError>;
