//! Front-end errors.

use std::io;
use std::path::PathBuf;

use rpncalc::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read state file {path}: {source}")]
    StateRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to write state file {path}: {source}")]
    StateWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("invalid state file {path}: {source}")]
    StateFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}
