//! Capability seams between the inference pipeline and its two collaborators.

use crate::AiError;

/// Dense feature vector produced by a [`TextEncoder`].
pub type FeatureVector = Vec<f32>;

/// Maps raw text to a fixed-length feature vector.
///
/// Implementations are immutable after construction: the same text always
/// yields the same vector, and unknown tokens contribute nothing.
pub trait TextEncoder: Send + Sync {
    /// Length of every vector returned by [`encode`](Self::encode).
    fn dim(&self) -> usize;

    fn encode(&self, text: &str) -> FeatureVector;
}

/// Maps a feature vector to the probability of the message being important.
pub trait ScoringModel: Send + Sync {
    /// Expected input length, if the model knows it.
    fn input_dim(&self) -> Option<usize>;

    /// Probability in `[0, 1]`.
    fn score(&self, features: &[f32]) -> Result<f64, AiError>;
}

impl<T: TextEncoder + ?Sized> TextEncoder for Box<T> {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn encode(&self, text: &str) -> FeatureVector {
        (**self).encode(text)
    }
}

impl<T: ScoringModel + ?Sized> ScoringModel for Box<T> {
    fn input_dim(&self) -> Option<usize> {
        (**self).input_dim()
    }

    fn score(&self, features: &[f32]) -> Result<f64, AiError> {
        (**self).score(features)
    }
}
