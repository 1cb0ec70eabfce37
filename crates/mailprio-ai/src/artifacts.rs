//! Persistence of the fitted vectorizer, trained network, and training report.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::AiError;
use crate::network::Sequential;
use crate::pipeline::InferenceContext;
use crate::tfidf::TfidfVectorizer;
use crate::train::{TrainedModel, TrainingReport};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const MODEL_FILE: &str = "model.json";
pub const REPORT_FILE: &str = "training_report.json";

/// Artifact file locations inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub model: PathBuf,
    pub report: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            vectorizer: dir.join(VECTORIZER_FILE),
            model: dir.join(MODEL_FILE),
            report: dir.join(REPORT_FILE),
        }
    }

    /// Write all three artifacts, creating the directory if needed.
    pub fn save(&self, trained: &TrainedModel) -> Result<(), AiError> {
        for path in [&self.vectorizer, &self.model, &self.report] {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| AiError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        write_json(&self.vectorizer, &trained.vectorizer)?;
        write_json(&self.model, &trained.network)?;
        write_json(&self.report, &trained.report)?;
        info!(
            vectorizer = %self.vectorizer.display(),
            model = %self.model.display(),
            "saved artifacts"
        );
        Ok(())
    }

    pub fn load_vectorizer(&self) -> Result<TfidfVectorizer, AiError> {
        let vectorizer: TfidfVectorizer = read_json(&self.vectorizer)?;
        vectorizer.validate().map_err(|reason| AiError::InvalidArtifact {
            path: self.vectorizer.clone(),
            reason,
        })?;
        Ok(vectorizer)
    }

    pub fn load_network(&self) -> Result<Sequential, AiError> {
        let network: Sequential = read_json(&self.model)?;
        network.validate().map_err(|reason| AiError::InvalidArtifact {
            path: self.model.clone(),
            reason,
        })?;
        Ok(network)
    }

    /// The report is informational; `None` if it was never written.
    pub fn load_report(&self) -> Result<Option<TrainingReport>, AiError> {
        if !self.report.exists() {
            return Ok(None);
        }
        read_json(&self.report).map(Some)
    }

    /// Load vectorizer and network into a ready-to-use context.
    pub fn load_context(&self) -> Result<InferenceContext, AiError> {
        let vectorizer = self.load_vectorizer()?;
        let network = self.load_network()?;
        info!(
            features = vectorizer.vocabulary_len(),
            params = network.param_count(),
            "loaded artifacts"
        );
        InferenceContext::new(vectorizer, network)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AiError> {
    let json = serde_json::to_string(value).map_err(|source| AiError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| AiError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AiError> {
    if !path.exists() {
        return Err(AiError::ArtifactNotFound(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path).map_err(|source| AiError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| AiError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}
