//! ONNX Runtime scoring model for networks exported from another toolkit.
//!
//! The model must take one float input of shape `[batch, dim]` and produce a
//! sigmoid probability as the first element of its first output.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::AiError;
use crate::encoder::ScoringModel;

pub struct OnnxModel {
    // Runs need exclusive access to the session.
    session: Mutex<Session>,
    input_name: String,
    dim: Option<usize>,
}

impl OnnxModel {
    pub fn load(model_path: &Path) -> anyhow::Result<Self> {
        anyhow::ensure!(model_path.exists(), "{model_path:?} not found");

        let session = Session::builder()?.commit_from_file(model_path)?;
        let input = session
            .inputs()
            .first()
            .ok_or_else(|| anyhow::anyhow!("model has no inputs"))?;
        let input_name = input.name().to_string();
        let dim = infer_dim(input.dtype());

        info!(?dim, input = %input_name, model = %model_path.display(), "loaded onnx model");
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            dim,
        })
    }
}

impl ScoringModel for OnnxModel {
    fn input_dim(&self) -> Option<usize> {
        self.dim
    }

    fn score(&self, features: &[f32]) -> Result<f64, AiError> {
        let shape = [1i64, features.len() as i64];
        let tensor = Tensor::from_array((shape, features.to_vec().into_boxed_slice()))
            .map_err(|e| AiError::Scoring(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AiError::Scoring("session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| AiError::Scoring(e.to_string()))?;

        let (_, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| AiError::Scoring(e.to_string()))?;
        data.first()
            .map(|&p| f64::from(p))
            .ok_or(AiError::EmptyOutput)
    }
}

/// Last dimension of the input shape, if static.
fn infer_dim(input_type: &ort::value::ValueType) -> Option<usize> {
    match input_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
