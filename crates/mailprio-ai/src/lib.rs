//! Inference layer: TF-IDF encoding, dense network scoring, training, and the
//! classify pipeline. ONNX Runtime scoring is available behind `onnx`.

pub mod artifacts;
pub mod encoder;
mod error;
pub mod network;
mod optimizer;
pub mod pipeline;
mod stop_words;
pub mod tfidf;
pub mod train;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;

pub use artifacts::ArtifactPaths;
pub use encoder::{FeatureVector, ScoringModel, TextEncoder};
pub use error::AiError;
pub use network::Sequential;
pub use optimizer::AdamConfig;
pub use pipeline::{InferenceContext, Outcome};
pub use tfidf::TfidfVectorizer;
pub use train::{TrainedModel, TrainingReport, train};
