//! Error types for Vera.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VeraError {
    #[error("no matching model found")]
    NoMatch,

    #[error("{strategy} service error: {reason}")]
    ExternalService {
        strategy: &'static str,
        reason: String,
    },

    #[error("model at {path} failed: {stderr}")]
    Execution { path: String, stderr: String },

    #[error("path not present in catalog: {0}")]
    UnknownPath(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VeraError>;
