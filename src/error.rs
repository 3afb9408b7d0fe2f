// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScaffoldError>;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(
        "Relative path is not allowed to refer to a directory outside its parent: {path} (root {root})"
    )]
    PathSafety { root: PathBuf, path: PathBuf },

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("Invalid ignore file: {0}")]
    Ignore(#[from] ignore::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl ScaffoldError {
    pub fn file_operation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOperation {
            path: path.into(),
            source,
        }
    }
}

impl From<tokio::task::JoinError> for ScaffoldError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
