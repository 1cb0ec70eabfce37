//! Inference pipeline: raw subject/body to a thresholded classification.

use mailprio_core::{Classification, RawInput, Threshold};
use tracing::debug;

use crate::AiError;
use crate::encoder::{ScoringModel, TextEncoder};

/// Result of a classify call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Subject and body were both blank; nothing was classified.
    NeedsInput,
    Classified(Classification),
}

impl Outcome {
    pub fn classification(&self) -> Option<&Classification> {
        match self {
            Self::NeedsInput => None,
            Self::Classified(c) => Some(c),
        }
    }
}

/// Encoder and model loaded once and shared read-only by every request.
pub struct InferenceContext {
    encoder: Box<dyn TextEncoder>,
    model: Box<dyn ScoringModel>,
}

impl std::fmt::Debug for InferenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceContext")
            .field("feature_dim", &self.encoder.dim())
            .field("model_input_dim", &self.model.input_dim())
            .finish()
    }
}

impl InferenceContext {
    /// Pair an encoder with a model, checking their dimensions agree when the
    /// model reports one.
    pub fn new(
        encoder: impl TextEncoder + 'static,
        model: impl ScoringModel + 'static,
    ) -> Result<Self, AiError> {
        if let Some(expected) = model.input_dim()
            && expected != encoder.dim()
        {
            return Err(AiError::DimensionMismatch {
                expected,
                got: encoder.dim(),
            });
        }
        Ok(Self {
            encoder: Box::new(encoder),
            model: Box::new(model),
        })
    }

    pub fn feature_dim(&self) -> usize {
        self.encoder.dim()
    }

    /// Classify one subject/body pair against `threshold`.
    ///
    /// Returns [`Outcome::NeedsInput`] when both fields are blank after
    /// trimming. Non-blank fields are combined untrimmed.
    pub fn classify(
        &self,
        subject: &str,
        body: &str,
        threshold: Threshold,
    ) -> Result<Outcome, AiError> {
        self.classify_input(&RawInput::new(subject, body), threshold)
    }

    pub fn classify_input(&self, input: &RawInput, threshold: Threshold) -> Result<Outcome, AiError> {
        if input.is_blank() {
            return Ok(Outcome::NeedsInput);
        }

        let combined = input.combined();
        let features = self.encoder.encode(&combined);
        let probability = self.model.score(&features)?;
        let classification = Classification::from_probability(probability, threshold);

        debug!(
            probability,
            threshold = threshold.percent(),
            verdict = classification.verdict.as_str(),
            "classified"
        );
        Ok(Outcome::Classified(classification))
    }
}
