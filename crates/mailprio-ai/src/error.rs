use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("cannot fit vectorizer: {0}")]
    EmptyCorpus(&'static str),

    #[error("feature dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("training needs at least {needed} rows, got {got}")]
    NotEnoughData { needed: usize, got: usize },

    #[error("artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt artifact {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },

    #[error("model produced no output")]
    EmptyOutput,

    #[error("scoring backend failed: {0}")]
    Scoring(String),

    #[error(transparent)]
    Core(#[from] mailprio_core::CoreError),
}
