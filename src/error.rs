use crate::config::ConfigError;
use crate::oracle::OracleError;
use thiserror::Error;

/// Errors that abort a self-play run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to report game: {0}")]
    Report(#[from] std::io::Error),
}
