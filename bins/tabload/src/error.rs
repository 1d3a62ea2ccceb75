use std::path::PathBuf;

use tabload_api::SchemaError;
use tabload_engine::{ConfigError, LoadError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("csv options: {0}")]
    Dialect(#[from] toml::de::Error),

    #[error("schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("database {}: {source}", .path.display())]
    Open { path: PathBuf, source: rusqlite::Error },

    #[error("transaction: {0}")]
    Transaction(#[source] rusqlite::Error),

    #[error("source {}: {source}", .path.display())]
    Source { path: PathBuf, source: std::io::Error },

    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("load task: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),

    #[error("interrupted")]
    Interrupted,
}

impl CliError {
    pub fn row_errors(&self) -> Option<&tabload_engine::ParseErrorSet> {
        match self {
            CliError::Load(e) => e.row_errors(),
            _ => None,
        }
    }
}
